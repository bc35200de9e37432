//! File system storage management
//!
//! Path validation and the file engine that performs every filesystem
//! operation inside the configured root boundary.

pub mod filesystem;
pub mod metadata;
pub mod mime;
pub mod operations;
pub mod results;
pub mod search;
pub mod validation;

pub use operations::{DEFAULT_MAX_READ_BYTES, DEFAULT_MAX_SEARCH_DEPTH, EngineSettings, FileEngine};
pub use results::{
    ContentEncoding, DeleteResult, DirectoryEntry, DirectoryListing, EntryKind, FileContent,
    FileInfo, MoveResult, PathResult, SearchMatch, SearchResults,
};
pub use validation::PathValidator;
