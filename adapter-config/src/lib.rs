//! # Adapter Configuration
//!
//! Turns declarative adapter configuration into wired, stopped adapters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Adapter Configuration                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  AdapterConfig ──► AdapterRegistry ──► DirectoryPoller          │
//! │                          │                                      │
//! │                          ▼                                      │
//! │                    ConfigBinder ◄── PropertySchema              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```no_run
//! use conduit_adapter_config::{AdapterConfig, AdapterRegistry};
//!
//! let config = AdapterConfig::new()
//!     .with("directory", "/var/in")
//!     .with("filter", "*.csv")
//!     .with("poll-interval", "5000");
//!
//! let _poller = AdapterRegistry::global().build("file-source", &config)?;
//! # Ok::<(), conduit_adapter_config::AdapterError>(())
//! ```

pub mod binder;
pub mod config;
pub mod error;
pub mod file_source;
pub mod registry;

pub use binder::{Bindable, ConfigBinder, Property, PropertySchema};
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use file_source::{DIRECTORY_ATTRIBUTE, FILE_SOURCE_TAG, build_file_source};
pub use registry::{AdapterBuilder, AdapterRegistry, AdapterRegistryBuilder};
