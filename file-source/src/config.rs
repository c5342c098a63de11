//! Configuration for a polled directory.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};
use crate::filter::FileFilter;

/// Default delay between two ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default time a tick waits for channel capacity per message.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default bounded channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Largest capacity a bounded tokio channel accepts.
pub const MAX_CHANNEL_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Runtime settings for a [`DirectoryPoller`](crate::DirectoryPoller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Directory to poll. Only its direct entries are considered.
    pub directory: PathBuf,

    /// File-name glob (e.g. `*.csv`). `None` accepts every file.
    pub filter: Option<String>,

    /// Delay between ticks.
    #[serde(with = "millis")]
    pub poll_interval: Duration,

    /// How long a tick waits for channel capacity before deferring the
    /// remaining files to the next tick.
    #[serde(with = "millis")]
    pub send_timeout: Duration,

    /// Capacity of the bounded output channel.
    pub channel_capacity: usize,

    /// Maximum number of messages emitted per tick (None = unlimited).
    pub max_messages_per_poll: Option<usize>,

    /// Whether symlinks to regular files count as files.
    pub follow_symlinks: bool,
}

impl PollerConfig {
    /// Create a config for `directory` with default settings.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            filter: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_messages_per_poll: None,
            follow_symlinks: false,
        }
    }

    /// Set the file-name filter.
    pub fn with_filter(mut self, pattern: impl Into<String>) -> Self {
        self.filter = Some(pattern.into());
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-message send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Cap the number of messages emitted per tick.
    pub fn with_max_messages_per_poll(mut self, max: usize) -> Self {
        self.max_messages_per_poll = Some(max);
        self
    }

    /// Treat symlinked files as files.
    pub fn follow_symlinks(mut self) -> Self {
        self.follow_symlinks = true;
        self
    }

    /// Channel capacity, checked against what tokio can allocate.
    pub fn checked_channel_capacity(&self) -> Result<usize> {
        if (1..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            Ok(self.channel_capacity)
        } else {
            Err(SourceError::InvalidCapacity {
                capacity: self.channel_capacity,
                max: MAX_CHANNEL_CAPACITY,
            })
        }
    }

    /// Compile the configured filter, if any.
    pub fn file_filter(&self) -> Result<Option<FileFilter>> {
        self.filter.as_deref().map(FileFilter::new).transpose()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
