//! Storage result types
//!
//! Defines the records returned by file engine operations. All of them
//! serialize with serde so the adapter can put them on the wire unchanged.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Byte size; `None` for directories.
    pub size: Option<u64>,
    pub modified: Option<String>,
    /// Low three octal digits of the mode, e.g. `"644"`.
    pub permissions: String,
    pub is_hidden: bool,
    /// Extension based guess; `None` for directories.
    pub mime_type: Option<String>,
}

/// Result of a directory listing operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub files: Vec<DirectoryEntry>,
    pub current_path: PathBuf,
    /// `None` at the root boundary or the filesystem root.
    pub parent_path: Option<PathBuf>,
}

/// A single search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(flatten)]
    pub entry: DirectoryEntry,
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

/// Result of a recursive search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchMatch>,
    pub pattern: String,
    pub search_path: PathBuf,
}

/// Result of an operation that produced or touched a single path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub path: PathBuf,
}

/// Result of a move operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResult {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Result of a delete operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// How `FileContent::content` is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    /// Lowercase hex of the raw bytes.
    #[serde(rename = "binary")]
    Binary,
}

/// Result of a file read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
    pub size: u64,
    pub encoding: ContentEncoding,
}

/// Detailed metadata for a single path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(flatten)]
    pub entry: DirectoryEntry,
    pub path: PathBuf,
    pub created: Option<String>,
    pub accessed: Option<String>,
    /// Immediate children of a directory; `None` for files or when the
    /// directory cannot be read.
    pub item_count: Option<usize>,
}
