//! Request and response shapes of the data service.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use cloudstore_entity::data::DataView;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-supplied file name. Only the last `/` segment is kept.
    pub name: String,
    /// File content.
    pub content: Bytes,
}

impl UploadFile {
    /// Creates an upload.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The name the file is stored under.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

/// What to create under a parent directory.
#[derive(Debug, Clone)]
pub enum CreatePayload {
    /// Upload files, processed in order; the first failure stops the batch.
    Files(Vec<UploadFile>),
    /// Create a directory with the given name.
    Directory(String),
}

/// How much a read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Metadata only.
    #[default]
    Info,
    /// Metadata plus something to stream.
    Download,
}

/// Content handed back by a download read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadArtifact {
    /// The stored file itself.
    File(PathBuf),
    /// A freshly built archive of a directory. Temporary.
    Archive(PathBuf),
}

impl DownloadArtifact {
    /// Location of the artifact.
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Archive(path) => path,
        }
    }

    /// Whether the artifact should be deleted once served.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Archive(_))
    }
}

/// Result of a read.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// Reconciled metadata.
    pub info: DataView,
    /// Present in download mode.
    pub file: Option<DownloadArtifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_keeps_last_segment() {
        assert_eq!(UploadFile::new("a/b/c.txt", "x").file_name(), "c.txt");
        assert_eq!(UploadFile::new("c.txt", "x").file_name(), "c.txt");
        assert_eq!(UploadFile::new("dir/", "x").file_name(), "");
    }
}
