//! File-name filter predicate.

use std::path::Path;

use glob::Pattern;

use crate::error::{Result, SourceError};

/// Glob matched against a file's name (not its full path), so `*.csv`
/// behaves the same whatever directory is polled.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pattern: Pattern,
}

impl FileFilter {
    /// Compile a filter from a glob such as `*.csv` or `report-??.txt`.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|source| SourceError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// The glob as written.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the file at `path` passes the filter.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.pattern.matches(&name.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_file_name_only() {
        let filter = FileFilter::new("*.csv").unwrap();

        assert!(filter.matches(Path::new("/var/in/b.csv")));
        assert!(!filter.matches(Path::new("/var/in/a.txt")));
        assert!(!filter.matches(Path::new("/data.csv/a.txt")));
        assert_eq!(filter.as_str(), "*.csv");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FileFilter::new("[").unwrap_err();
        assert!(matches!(err, SourceError::InvalidFilter { .. }));
    }
}
