//! Periodic directory poller.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::PollerConfig;
use crate::error::{Result, SourceError};
use crate::message::FileMessage;
use crate::scanner::DirectoryScanner;

/// Lifecycle state of a [`DirectoryPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollerState {
    /// Not polling. Can be started.
    Stopped,

    /// The polling loop is running.
    Polling,

    /// Shut down for good.
    Closed,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Polling => "polling",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Messages handed to the channel.
    pub emitted: usize,

    /// New files left for a later tick because the channel stayed full.
    pub deferred: usize,
}

/// Watches a directory on a fixed interval and emits a [`FileMessage`]
/// for every file identity it has not emitted before.
///
/// The scanner, and with it the seen set, is moved into the polling task
/// on [`start`](Self::start) and handed back when [`stop`](Self::stop)
/// joins the task, so nothing else can touch it while polling.
pub struct DirectoryPoller {
    config: PollerConfig,

    state: PollerState,

    /// Present while stopped.
    scanner: Option<DirectoryScanner>,

    /// Output channel. Dropped on shutdown so consumers see end of stream.
    output: Option<mpsc::Sender<FileMessage>>,

    /// Receiving end, until a consumer takes it.
    receiver: Option<mpsc::Receiver<FileMessage>>,

    /// Present while polling.
    worker: Option<Worker>,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<DirectoryScanner>,
}

impl DirectoryPoller {
    /// Create a stopped poller with its own bounded output channel.
    ///
    /// Fails if the configured filter is not a valid glob or the channel
    /// capacity is zero or too large. The directory itself is only checked
    /// by [`start`](Self::start).
    pub fn new(config: PollerConfig) -> Result<Self> {
        let (output, receiver) = mpsc::channel(config.checked_channel_capacity()?);
        let mut poller = Self::with_output(config, output)?;
        poller.receiver = Some(receiver);
        Ok(poller)
    }

    /// Create a stopped poller that writes into an existing channel.
    pub fn with_output(config: PollerConfig, output: mpsc::Sender<FileMessage>) -> Result<Self> {
        let scanner = DirectoryScanner::from_config(&config)?;

        Ok(Self {
            config,
            state: PollerState::Stopped,
            scanner: Some(scanner),
            output: Some(output),
            receiver: None,
            worker: None,
        })
    }

    /// Take the receiving end of the output channel. Returns `None` if it
    /// was already taken or the poller was built with [`with_output`].
    ///
    /// [`with_output`]: Self::with_output
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<FileMessage>> {
        self.receiver.take()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PollerState::Polling
    }

    /// Number of identities emitted so far. `None` while polling, since
    /// the polling task owns the seen set.
    pub fn seen_count(&self) -> Option<usize> {
        self.scanner.as_ref().map(|scanner| scanner.seen().len())
    }

    /// Start polling.
    ///
    /// Fails with [`SourceError::DirectoryUnavailable`] if the directory is
    /// missing, not a directory, or unreadable; the poller stays stopped.
    /// Starting a running poller is a no-op.
    pub async fn start(&mut self) -> Result<()> {
        match self.state {
            PollerState::Polling => return Ok(()),
            PollerState::Closed => {
                return Err(SourceError::InvalidState {
                    operation: "start",
                    state: self.state,
                });
            }
            PollerState::Stopped => {}
        }

        check_directory(&self.config.directory)?;

        let (Some(scanner), Some(output)) = (self.scanner.take(), self.output.clone()) else {
            return Err(SourceError::InvalidState {
                operation: "start",
                state: self.state,
            });
        };

        let cancel = CancellationToken::new();
        let span = info_span!("poll", directory = %self.config.directory.display());
        let handle = tokio::spawn(
            run_loop(
                scanner,
                output,
                self.config.poll_interval,
                self.config.send_timeout,
                cancel.clone(),
            )
            .instrument(span),
        );

        self.worker = Some(Worker { cancel, handle });
        self.state = PollerState::Polling;
        info!("Started polling {}", self.config.directory.display());

        Ok(())
    }

    /// Stop polling and wait for the polling task to finish.
    ///
    /// A tick already in progress runs to completion first; once this
    /// returns nothing more is emitted. Stopping a stopped poller is a
    /// no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if self.state != PollerState::Polling {
            return Ok(());
        }

        let result = self.join_worker().await;
        self.state = PollerState::Stopped;
        info!("Stopped polling {}", self.config.directory.display());
        result
    }

    /// Stop if needed and close the poller for good. Drops the output
    /// sender so the consumer's receiver ends once drained.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state == PollerState::Closed {
            return Ok(());
        }

        let result = if self.state == PollerState::Polling {
            self.join_worker().await
        } else {
            Ok(())
        };

        self.scanner = None;
        self.output = None;
        self.state = PollerState::Closed;
        info!("Closed poller for {}", self.config.directory.display());
        result
    }

    /// Run one tick on the calling task. Only allowed while stopped.
    ///
    /// Unlike the polling loop, a transient scan error is returned rather
    /// than logged.
    pub async fn poll_once(&mut self) -> Result<TickReport> {
        let (Some(scanner), Some(output)) = (self.scanner.as_mut(), self.output.as_ref()) else {
            return Err(SourceError::InvalidState {
                operation: "poll",
                state: self.state,
            });
        };

        poll_tick(scanner, output, self.config.send_timeout).await
    }

    /// Forget every emitted identity so existing files are emitted again.
    /// Only allowed while stopped.
    pub fn reset_seen(&mut self) -> Result<()> {
        match self.scanner.as_mut() {
            Some(scanner) => {
                scanner.reset();
                Ok(())
            }
            None => Err(SourceError::InvalidState {
                operation: "reset the seen set",
                state: self.state,
            }),
        }
    }

    async fn join_worker(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        worker.cancel.cancel();
        match worker.handle.await {
            Ok(scanner) => {
                self.scanner = Some(scanner);
                Ok(())
            }
            Err(e) => {
                error!(
                    "Polling task for {} failed: {e}",
                    self.config.directory.display()
                );
                // The seen set went down with the task; keep the poller usable.
                self.scanner = Some(DirectoryScanner::from_config(&self.config)?);
                Err(SourceError::WorkerFailed(e))
            }
        }
    }
}

impl Drop for DirectoryPoller {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.cancel();
        }
    }
}

impl fmt::Debug for DirectoryPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryPoller")
            .field("directory", &self.config.directory)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Fatal checks done once at start.
fn check_directory(path: &Path) -> Result<()> {
    let unavailable = |reason: String| SourceError::DirectoryUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(unavailable("not a directory".to_string()));
    }

    fs::read_dir(path).map_err(|e| unavailable(e.to_string()))?;
    Ok(())
}

async fn run_loop(
    mut scanner: DirectoryScanner,
    output: mpsc::Sender<FileMessage>,
    interval: Duration,
    send_timeout: Duration,
    cancel: CancellationToken,
) -> DirectoryScanner {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match poll_tick(&mut scanner, &output, send_timeout).await {
            Ok(report) if report.emitted > 0 || report.deferred > 0 => {
                debug!(
                    "Tick on {}: emitted {}, deferred {}",
                    scanner.directory().display(),
                    report.emitted,
                    report.deferred
                );
            }
            Ok(_) => {}
            Err(SourceError::ChannelClosed) => {
                warn!(
                    "Receiver for {} dropped; polling loop exiting",
                    scanner.directory().display()
                );
                break;
            }
            Err(e) => warn!("{e}; retrying next tick"),
        }
    }

    scanner
}

/// Scan once and hand every new file to `output` in order, waiting at
/// most `send_timeout` per message. On timeout the remaining files stay
/// unrecorded and are picked up by a later tick.
async fn poll_tick(
    scanner: &mut DirectoryScanner,
    output: &mpsc::Sender<FileMessage>,
    send_timeout: Duration,
) -> Result<TickReport> {
    let messages = scanner.scan()?;
    let total = messages.len();
    let mut report = TickReport::default();

    for message in messages {
        let identity = message.identity();
        match output.send_timeout(message, send_timeout).await {
            Ok(()) => {
                debug!("Emitted {}", identity.path().display());
                scanner.mark_seen(identity);
                report.emitted += 1;
            }
            Err(SendTimeoutError::Timeout(_)) => {
                report.deferred = total - report.emitted;
                warn!(
                    "Channel full for {:?}; deferring {} file(s) to the next tick",
                    send_timeout, report.deferred
                );
                break;
            }
            Err(SendTimeoutError::Closed(_)) => return Err(SourceError::ChannelClosed),
        }
    }

    Ok(report)
}
