//! Directory scanning and deduplication.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::PollerConfig;
use crate::error::{Result, SourceError};
use crate::filter::FileFilter;
use crate::message::{FileIdentity, FileMessage};

/// Identities of files already emitted.
///
/// Grows until explicitly cleared; bounded only by what the directory
/// has ever contained.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    identities: HashSet<FileIdentity>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity. Returns `false` if it was already present.
    pub fn insert(&mut self, identity: FileIdentity) -> bool {
        self.identities.insert(identity)
    }

    pub fn contains(&self, identity: &FileIdentity) -> bool {
        self.identities.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn clear(&mut self) {
        self.identities.clear();
        debug!("Cleared seen set");
    }
}

/// Lists a directory and reports files not emitted before.
///
/// The scanner never marks anything seen on its own: the caller does so
/// with [`DirectoryScanner::mark_seen`] once a message has actually been
/// handed downstream.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    directory: PathBuf,
    filter: Option<FileFilter>,
    max_per_scan: Option<usize>,
    follow_symlinks: bool,
    seen: SeenSet,
}

impl DirectoryScanner {
    /// Create a scanner for `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            filter: None,
            max_per_scan: None,
            follow_symlinks: false,
            seen: SeenSet::new(),
        }
    }

    /// Create a scanner from poller settings.
    pub fn from_config(config: &PollerConfig) -> Result<Self> {
        let mut scanner = Self::new(&config.directory);
        scanner.filter = config.file_filter()?;
        scanner.max_per_scan = config.max_messages_per_poll;
        scanner.follow_symlinks = config.follow_symlinks;
        Ok(scanner)
    }

    /// Restrict scans to files whose name matches `filter`.
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Cap the number of files reported per scan.
    pub fn with_max_per_scan(mut self, max: usize) -> Self {
        self.max_per_scan = Some(max);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Record that `identity` has been emitted.
    pub fn mark_seen(&mut self, identity: FileIdentity) {
        self.seen.insert(identity);
    }

    /// Forget every emitted identity.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// List the directory and return one message per new file, ordered by
    /// file name.
    ///
    /// Filtering happens before the seen-check so that a file rejected by
    /// the filter is never recorded. Failing to read the directory itself
    /// is a [`SourceError::TransientScan`]; an entry that vanishes or
    /// cannot be stat'ed mid-listing is skipped.
    pub fn scan(&self) -> Result<Vec<FileMessage>> {
        let walker = WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        let mut messages = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(SourceError::TransientScan {
                        path: self.directory.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    debug!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(ref filter) = self.filter {
                if !filter.matches(entry.path()) {
                    continue;
                }
            }

            let modified = match entry.metadata() {
                Ok(metadata) => metadata.modified().ok(),
                Err(e) => {
                    debug!("Skipping {}: {e}", entry.path().display());
                    continue;
                }
            };

            let identity = FileIdentity::new(entry.path(), modified);
            if self.seen.contains(&identity) {
                continue;
            }

            messages.push(FileMessage::new(entry.into_path(), modified));

            if self.max_per_scan.is_some_and(|max| messages.len() >= max) {
                break;
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn names(messages: &[FileMessage]) -> Vec<String> {
        messages.iter().filter_map(FileMessage::file_name).collect()
    }

    fn emit_all(scanner: &mut DirectoryScanner) -> Vec<String> {
        let messages = scanner.scan().unwrap();
        for message in &messages {
            scanner.mark_seen(message.identity());
        }
        names(&messages)
    }

    #[test]
    fn test_scan_is_lexical_and_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.txt")).unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let mut scanner = DirectoryScanner::new(temp_dir.path());

        assert_eq!(emit_all(&mut scanner), vec!["a.txt", "b.txt"]);
        assert!(emit_all(&mut scanner).is_empty());
        assert_eq!(scanner.seen().len(), 2);
    }

    #[test]
    fn test_scan_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        File::create(temp_dir.path().join("nested").join("deep.txt")).unwrap();
        File::create(temp_dir.path().join("top.txt")).unwrap();

        let scanner = DirectoryScanner::new(temp_dir.path());
        assert_eq!(names(&scanner.scan().unwrap()), vec!["top.txt"]);
    }

    #[test]
    fn test_filtered_files_are_never_recorded() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();
        File::create(temp_dir.path().join("b.csv")).unwrap();

        let mut scanner =
            DirectoryScanner::new(temp_dir.path()).with_filter(FileFilter::new("*.csv").unwrap());
        assert_eq!(emit_all(&mut scanner), vec!["b.csv"]);
        assert_eq!(scanner.seen().len(), 1);

        // Widening the filter later picks up the file that was skipped.
        let mut widened = scanner.clone().with_filter(FileFilter::new("*").unwrap());
        assert_eq!(emit_all(&mut widened), vec!["a.txt"]);
    }

    #[test]
    fn test_unmarked_files_are_reported_again() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let scanner = DirectoryScanner::new(temp_dir.path());
        assert_eq!(scanner.scan().unwrap().len(), 1);
        assert_eq!(scanner.scan().unwrap().len(), 1);
    }

    #[test]
    fn test_max_per_scan_defers_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            File::create(temp_dir.path().join(name)).unwrap();
        }

        let mut scanner = DirectoryScanner::new(temp_dir.path()).with_max_per_scan(2);
        assert_eq!(emit_all(&mut scanner), vec!["a.txt", "b.txt"]);
        assert_eq!(emit_all(&mut scanner), vec!["c.txt"]);
    }

    #[test]
    fn test_modified_file_is_new_identity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        File::create(&path).unwrap();

        let mut scanner = DirectoryScanner::new(temp_dir.path());
        assert_eq!(emit_all(&mut scanner), vec!["a.txt"]);

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "more").unwrap();
        file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(60))
            .unwrap();
        drop(file);

        assert_eq!(emit_all(&mut scanner), vec!["a.txt"]);
    }

    #[test]
    fn test_reset_reemits() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("a.txt")).unwrap();

        let mut scanner = DirectoryScanner::new(temp_dir.path());
        emit_all(&mut scanner);
        scanner.reset();
        assert!(scanner.seen().is_empty());
        assert_eq!(emit_all(&mut scanner), vec!["a.txt"]);
    }

    #[test]
    fn test_missing_directory_is_transient_error() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(temp_dir.path().join("gone"));

        let err = scanner.scan().unwrap_err();
        assert!(matches!(err, SourceError::TransientScan { .. }));
    }
}
