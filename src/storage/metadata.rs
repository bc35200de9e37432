//! Entry metadata
//!
//! Builds `DirectoryEntry` records from filesystem metadata: kind, size,
//! timestamps, permission bits, hidden flag and MIME guess.

use chrono::{DateTime, Local, SecondsFormat};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::storage::mime::guess_mime_type;
use crate::storage::results::{DirectoryEntry, EntryKind};

/// Returns true for dot-prefixed names.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn entry_kind(meta: &Metadata) -> EntryKind {
    if meta.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}

/// Formats a filesystem timestamp as RFC 3339 in local time.
///
/// Platforms that cannot report the timestamp yield `None`.
pub fn format_timestamp(time: io::Result<SystemTime>) -> Option<String> {
    time.ok()
        .map(|t| DateTime::<Local>::from(t).to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Low three octal digits of the mode, e.g. `"755"`.
#[cfg(unix)]
pub fn permission_bits(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub fn permission_bits(meta: &Metadata) -> String {
    if meta.permissions().readonly() {
        "444".to_string()
    } else {
        "666".to_string()
    }
}

/// Describes the entry named `name` living at `path`.
pub fn describe_entry(name: String, path: &Path, meta: &Metadata) -> DirectoryEntry {
    let kind = entry_kind(meta);
    let is_dir = kind.is_dir();

    DirectoryEntry {
        is_hidden: is_hidden(&name),
        size: (!is_dir).then(|| meta.len()),
        modified: format_timestamp(meta.modified()),
        permissions: permission_bits(meta),
        mime_type: if is_dir {
            None
        } else {
            guess_mime_type(path).map(str::to_string)
        },
        kind,
        name,
    }
}

/// Directories first, then case-insensitive by name.
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(|a, b| {
        b.kind
            .is_dir()
            .cmp(&a.kind.is_dir())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            kind,
            size: None,
            modified: None,
            permissions: "644".to_string(),
            is_hidden: is_hidden(name),
            mime_type: None,
        }
    }

    #[test]
    fn test_directories_sort_first_case_insensitive() {
        let mut entries = vec![
            entry("B", EntryKind::Directory),
            entry("a", EntryKind::File),
            entry("C.txt", EntryKind::File),
            entry("b_dir", EntryKind::Directory),
        ];
        sort_entries(&mut entries);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "b_dir", "a", "C.txt"]);
    }

    #[test]
    fn test_hidden_names() {
        assert!(is_hidden(".env"));
        assert!(is_hidden(".."));
        assert!(!is_hidden("env."));
    }

    #[test]
    fn test_unavailable_timestamp_is_none() {
        let unsupported: io::Result<SystemTime> =
            Err(io::Error::from(io::ErrorKind::Unsupported));
        assert_eq!(format_timestamp(unsupported), None);
        assert!(format_timestamp(Ok(SystemTime::UNIX_EPOCH)).is_some());
    }
}
