//! Recursive pattern search
//!
//! Walks a validated subtree and matches entry names against a
//! case-insensitive glob. Enumeration is best-effort: entries that cannot be
//! read or stat'ed are skipped and logged at debug level, never escalated.

use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{EngineError, EngineResult};
use crate::storage::metadata::{describe_entry, is_hidden};
use crate::storage::results::SearchMatch;
use crate::storage::validation::PathValidator;

/// Compiles a shell-style pattern (`*`, `?`, `[...]`) matched case-insensitively.
pub fn compile_pattern(pattern: &str) -> EngineResult<GlobMatcher> {
    if pattern.trim().is_empty() {
        return Err(EngineError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern is empty".into(),
        });
    }

    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| EngineError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })
}

/// Collects every entry below `root` whose name matches `matcher`.
///
/// With `show_hidden` off, hidden directories are pruned (never descended)
/// and hidden entries are not reported. Descent never follows symlinks and
/// stops at `max_depth` levels below `root`. A symlink is reported only when
/// `validator` lets its target through.
pub fn search_tree(
    root: &Path,
    validator: &PathValidator,
    matcher: &GlobMatcher,
    show_hidden: bool,
    max_depth: usize,
) -> Vec<SearchMatch> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| show_hidden || !is_hidden(&entry.file_name().to_string_lossy()));

    let mut results = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !matcher.is_match(&name) {
            continue;
        }

        let path = entry.path();
        let meta = match validator.stat_entry(path) {
            Ok(meta) => meta,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        results.push(SearchMatch {
            entry: describe_entry(name, path, &meta),
            path: path.to_path_buf(),
            relative_path,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_case_insensitive() {
        let matcher = compile_pattern("*.txt").unwrap();
        assert!(matcher.is_match("a.txt"));
        assert!(matcher.is_match("c.TXT"));
        assert!(!matcher.is_match("a.txt.bak"));
    }

    #[test]
    fn test_pattern_wildcards() {
        let matcher = compile_pattern("report-?.[ct]sv").unwrap();
        assert!(matcher.is_match("report-1.csv"));
        assert!(matcher.is_match("REPORT-9.TSV"));
        assert!(!matcher.is_match("report-10.csv"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            compile_pattern(""),
            Err(EngineError::InvalidPattern { .. })
        ));
        assert!(matches!(
            compile_pattern("[unclosed"),
            Err(EngineError::InvalidPattern { .. })
        ));
    }
}
