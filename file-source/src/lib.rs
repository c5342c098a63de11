//! # File Source
//!
//! Inbound file adapter: polls a directory on an interval and emits a
//! [`FileMessage`] into a bounded channel for every file it has not
//! emitted before.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        File Source                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  PollerConfig ──► DirectoryPoller ──► mpsc ──► FileMessage      │
//! │       │                │                                        │
//! │       ▼                ▼                                        │
//! │  FileFilter      DirectoryScanner ──► SeenSet                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick lists the directory's direct entries, drops files rejected
//! by the filter, drops identities already in the seen set, and emits
//! the rest ordered by file name. A file identity is its path plus its
//! modification time.

pub mod config;
pub mod error;
pub mod filter;
pub mod message;
pub mod poller;
pub mod scanner;

pub use config::PollerConfig;
pub use error::{Result, SourceError};
pub use filter::FileFilter;
pub use message::{FileIdentity, FileMessage};
pub use poller::{DirectoryPoller, PollerState, TickReport};
pub use scanner::{DirectoryScanner, SeenSet};
