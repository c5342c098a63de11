//! The `file-source` adapter type.
//!
//! ```text
//! <file-source directory="/var/in" filter="*.csv" poll-interval="5000"/>
//! ```

use std::time::Duration;

use conduit_file_source::config::MAX_CHANNEL_CAPACITY;
use conduit_file_source::{DirectoryPoller, FileFilter, PollerConfig};

use crate::binder::{Bindable, ConfigBinder, Property, PropertySchema};
use crate::config::AdapterConfig;
use crate::error::Result;

/// Registry tag for the directory poller.
pub const FILE_SOURCE_TAG: &str = "file-source";

/// Primary attribute: the directory to poll.
pub const DIRECTORY_ATTRIBUTE: &str = "directory";

static FILE_SOURCE_SCHEMA: PropertySchema<PollerConfig> = PropertySchema {
    primary: Some(DIRECTORY_ATTRIBUTE),
    properties: &[
        Property::new("filter", set_filter),
        Property::new("poll-interval", set_poll_interval),
        Property::new("send-timeout", set_send_timeout),
        Property::new("channel-capacity", set_channel_capacity),
        Property::new("max-messages-per-poll", set_max_messages_per_poll),
        Property::new("follow-symlinks", set_follow_symlinks),
    ],
};

impl Bindable for PollerConfig {
    fn schema() -> &'static PropertySchema<Self> {
        &FILE_SOURCE_SCHEMA
    }

    fn construct(primary: Option<&str>) -> std::result::Result<Self, String> {
        primary
            .map(PollerConfig::new)
            .ok_or_else(|| format!("`{DIRECTORY_ATTRIBUTE}` is required"))
    }
}

/// Build a stopped [`DirectoryPoller`] from `file-source` attributes.
pub fn build_file_source(config: &AdapterConfig) -> Result<DirectoryPoller> {
    let poller_config: PollerConfig = ConfigBinder::bind(config)?;
    Ok(DirectoryPoller::new(poller_config)?)
}

fn set_filter(config: &mut PollerConfig, value: &str) -> std::result::Result<(), String> {
    FileFilter::new(value).map_err(|e| e.to_string())?;
    config.filter = Some(value.to_string());
    Ok(())
}

fn set_poll_interval(config: &mut PollerConfig, value: &str) -> std::result::Result<(), String> {
    config.poll_interval = Duration::from_millis(parse_positive(value)?);
    Ok(())
}

fn set_send_timeout(config: &mut PollerConfig, value: &str) -> std::result::Result<(), String> {
    let millis: u64 = value
        .trim()
        .parse()
        .map_err(|e| format!("expected milliseconds: {e}"))?;
    config.send_timeout = Duration::from_millis(millis);
    Ok(())
}

fn set_channel_capacity(config: &mut PollerConfig, value: &str) -> std::result::Result<(), String> {
    let capacity = usize::try_from(parse_positive(value)?)
        .ok()
        .filter(|capacity| *capacity <= MAX_CHANNEL_CAPACITY)
        .ok_or_else(|| format!("too large, at most {MAX_CHANNEL_CAPACITY}"))?;
    config.channel_capacity = capacity;
    Ok(())
}

fn set_max_messages_per_poll(
    config: &mut PollerConfig,
    value: &str,
) -> std::result::Result<(), String> {
    config.max_messages_per_poll =
        Some(usize::try_from(parse_positive(value)?).map_err(|e| e.to_string())?);
    Ok(())
}

fn set_follow_symlinks(config: &mut PollerConfig, value: &str) -> std::result::Result<(), String> {
    config.follow_symlinks = value
        .trim()
        .parse()
        .map_err(|_| "expected `true` or `false`".to_string())?;
    Ok(())
}

fn parse_positive(value: &str) -> std::result::Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("expected a positive integer: {e}")),
    }
}
