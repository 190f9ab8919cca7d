//! Wiring of configuration, stores and services.

use std::sync::Arc;

use tracing::info;

use cloudstore_auth::jwt::{JwtDecoder, JwtEncoder};
use cloudstore_core::config::AppConfig;
use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::traits::PhysicalStore;
use cloudstore_database::DatabasePool;
use cloudstore_database::migration::run_migrations;
use cloudstore_database::repositories::{AttachmentRepository, DataRepository, UserRepository};
use cloudstore_service::{AccessGuard, DataService, Identity, PathResolver, UserService};
use cloudstore_storage::{LocalPhysicalStore, QuotaGuard};

/// Everything a command or test needs, built once from configuration.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Metadata database pool.
    pub db: DatabasePool,
    /// Data tree service.
    pub data: DataService,
    /// User provisioning service.
    pub users: UserService,
    /// Tag, share and favorite rows.
    pub attachments: Arc<AttachmentRepository>,
    /// Path resolution.
    pub resolver: Arc<PathResolver>,
    /// Login token issuance.
    pub encoder: JwtEncoder,
    /// Login token verification.
    pub decoder: JwtDecoder,
}

impl AppContext {
    /// Connect, migrate, prepare directories and construct services.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        info!("Starting CloudStore v{}", env!("CARGO_PKG_VERSION"));

        let db = DatabasePool::connect(&config.database).await?;
        run_migrations(db.pool()).await?;

        tokio::fs::create_dir_all(&config.storage.root_path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreFailure,
                    format!("Failed to create storage root {}", config.storage.root_path),
                    e,
                )
            })?;
        let store: Arc<dyn PhysicalStore> =
            Arc::new(LocalPhysicalStore::new(&config.storage.tmp_dir).await?);
        info!(
            provider = store.provider_type(),
            root = %config.storage.root_path,
            "Physical store ready"
        );

        let user_repo = Arc::new(UserRepository::new(db.pool().clone()));
        let data_repo = Arc::new(DataRepository::new(db.pool().clone()));
        let attachments = Arc::new(AttachmentRepository::new(db.pool().clone()));

        let access = Arc::new(AccessGuard::new(Arc::clone(&user_repo)));
        let resolver = Arc::new(PathResolver::new(
            &config.storage.root_path,
            Arc::clone(&data_repo),
        ));

        let data = DataService::new(
            Arc::clone(&access),
            Arc::clone(&data_repo),
            Arc::clone(&resolver),
            Arc::clone(&store),
        );
        let users = UserService::new(
            access,
            user_repo,
            data_repo,
            Arc::clone(&resolver),
            store,
            QuotaGuard::new(config.storage.clone()),
        );

        Ok(Self {
            encoder: JwtEncoder::new(&config.auth),
            decoder: JwtDecoder::new(&config.auth),
            config,
            db,
            data,
            users,
            attachments,
            resolver,
        })
    }

    /// Verify a bearer token and turn it into an identity.
    pub fn identify(&self, token: &str) -> Result<Identity, AppError> {
        self.decoder.decode(token).map(Identity::from)
    }
}
