//! Error types for the file source.

use std::path::PathBuf;

use thiserror::Error;

use crate::poller::PollerState;

/// Result type alias for file source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while polling a directory.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The directory cannot be polled at all (missing, not a directory,
    /// or unreadable). Raised by `start()`.
    #[error("directory unavailable: {}: {reason}", path.display())]
    DirectoryUnavailable { path: PathBuf, reason: String },

    /// Listing the directory failed during a tick. The polling loop logs
    /// this and retries on the next tick.
    #[error("transient scan error in {}: {source}", path.display())]
    TransientScan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Operation not allowed in the poller's current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: PollerState,
    },

    /// The consumer dropped its receiver.
    #[error("channel error: receiver dropped")]
    ChannelClosed,

    /// The polling task panicked or was aborted.
    #[error("polling task failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),

    /// Channel capacity outside `1..=MAX_CHANNEL_CAPACITY`.
    #[error("invalid channel capacity {capacity}: must be between 1 and {max}")]
    InvalidCapacity { capacity: usize, max: usize },

    /// Invalid filter pattern.
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
