//! Repository implementations for all CloudStore entities.

pub mod attachment;
pub mod data;
pub mod user;

pub use attachment::AttachmentRepository;
pub use data::DataRepository;
pub use user::UserRepository;
