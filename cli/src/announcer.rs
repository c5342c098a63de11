//! Downstream consumer that reports every received message.

use std::io::Write;

use conduit_file_source::FileMessage;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How messages are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnounceFormat {
    /// One `info` log line per message.
    #[default]
    Log,

    /// One JSON object per line on stdout.
    Json,
}

#[derive(Serialize)]
struct Announcement<'a> {
    adapter: &'a str,
    #[serde(flatten)]
    message: &'a FileMessage,
}

/// Announces the messages of one adapter.
#[derive(Debug, Clone)]
pub struct MessageAnnouncer {
    adapter: String,
    format: AnnounceFormat,
}

impl MessageAnnouncer {
    pub fn new(adapter: impl Into<String>, format: AnnounceFormat) -> Self {
        Self {
            adapter: adapter.into(),
            format,
        }
    }

    /// Report one message, writing JSON lines to `out`.
    pub fn announce<W: Write>(&self, message: &FileMessage, out: &mut W) -> anyhow::Result<()> {
        match self.format {
            AnnounceFormat::Log => {
                info!(
                    "A file has been received by {}: {}",
                    self.adapter,
                    message.path.display()
                );
            }
            AnnounceFormat::Json => {
                let announcement = Announcement {
                    adapter: &self.adapter,
                    message,
                };
                serde_json::to_writer(&mut *out, &announcement)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Drain `messages` until the sender side closes. Returns how many
    /// messages were announced.
    pub async fn run(self, mut messages: mpsc::Receiver<FileMessage>) -> usize {
        let mut count = 0;
        while let Some(message) = messages.recv().await {
            self.announce_to_stdout(&message);
            count += 1;
        }
        count
    }

    fn announce_to_stdout(&self, message: &FileMessage) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = self.announce(message, &mut stdout) {
            warn!("Failed to announce {}: {e}", message.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_announcement() {
        let announcer = MessageAnnouncer::new("csv-inbox", AnnounceFormat::Json);
        let message = FileMessage::new("/var/in/b.csv", None);

        let mut out = Vec::new();
        announcer.announce(&message, &mut out).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["adapter"], "csv-inbox");
        assert_eq!(value["path"], "/var/in/b.csv");
        assert!(value["discovered_at"].is_string());
    }

    #[test]
    fn test_log_announcement_writes_nothing() {
        let announcer = MessageAnnouncer::new("inbox", AnnounceFormat::Log);
        let mut out = Vec::new();
        announcer
            .announce(&FileMessage::new("/in/a.txt", None), &mut out)
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_counts_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(FileMessage::new("/in/a.txt", None)).await.unwrap();
        tx.send(FileMessage::new("/in/b.txt", None)).await.unwrap();
        drop(tx);

        let announcer = MessageAnnouncer::new("inbox", AnnounceFormat::Log);
        assert_eq!(announcer.run(rx).await, 2);
    }
}
