//! Messages emitted for newly observed files.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file-arrival message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMessage {
    /// Full path to the file.
    pub path: PathBuf,

    /// Modification time when the file was observed (if the platform
    /// reports one).
    pub modified: Option<DateTime<Utc>>,

    /// When the poller discovered the file.
    pub discovered_at: DateTime<Utc>,
}

impl FileMessage {
    /// Create a message for a file discovered now.
    pub fn new(path: impl Into<PathBuf>, modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            modified: modified.map(DateTime::<Utc>::from),
            discovered_at: Utc::now(),
        }
    }

    /// File name component of the path, lossily converted.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Identity used for deduplication.
    pub fn identity(&self) -> FileIdentity {
        FileIdentity {
            path: self.path.clone(),
            modified: self.modified,
        }
    }
}

/// Path plus modification marker. A file rewritten in place gets a new
/// identity and is emitted again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

impl FileIdentity {
    pub fn new(path: impl Into<PathBuf>, modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            modified: modified.map(DateTime::<Utc>::from),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_file_message_creation() {
        let message = FileMessage::new("/var/in/a.txt", None);
        assert_eq!(message.path, Path::new("/var/in/a.txt"));
        assert_eq!(message.file_name().as_deref(), Some("a.txt"));
        assert!(message.discovered_at <= Utc::now());
    }

    #[test]
    fn test_identity_includes_modification_time() {
        let earlier = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let later = earlier + Duration::from_secs(1);

        let first = FileMessage::new("/in/a.txt", Some(earlier));
        let rewritten = FileMessage::new("/in/a.txt", Some(later));

        assert_eq!(first.identity(), FileIdentity::new("/in/a.txt", Some(earlier)));
        assert_ne!(first.identity(), rewritten.identity());
    }
}
