//! Storage operations
//!
//! The path-scoped file engine: list, search, create, move, delete, read and
//! info, each confined to the configured root boundary.

use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::storage::filesystem::{count_entries, move_path, remove_path, to_hex};
use crate::storage::metadata::{
    describe_entry, entry_kind, format_timestamp, is_hidden, sort_entries,
};
use crate::storage::results::{
    ContentEncoding, DeleteResult, DirectoryListing, FileContent, FileInfo, MoveResult,
    PathResult, SearchResults,
};
use crate::storage::search::{compile_pattern, search_tree};
use crate::storage::validation::PathValidator;

/// Default cap for `read`: 1 MiB.
pub const DEFAULT_MAX_READ_BYTES: u64 = 1024 * 1024;

/// Default depth cap for recursive search.
pub const DEFAULT_MAX_SEARCH_DEPTH: usize = 64;

/// Tunables for a `FileEngine`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Size cap used by `read` when the caller does not pass one.
    pub max_read_bytes: u64,
    /// Levels below the search root that `search` will descend.
    pub max_search_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            max_search_depth: DEFAULT_MAX_SEARCH_DEPTH,
        }
    }
}

/// Filesystem operations scoped to a single root directory.
///
/// The engine holds no mutable state; share it behind an `Arc` and call it
/// from any thread. Racing callers see `AlreadyExists` / `NotFound` as
/// decided by the filesystem.
#[derive(Debug, Clone)]
pub struct FileEngine {
    validator: PathValidator,
    settings: EngineSettings,
}

impl FileEngine {
    /// Creates an engine confined to `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> EngineResult<Self> {
        Ok(Self {
            validator: PathValidator::new(root)?,
            settings: EngineSettings::default(),
        })
    }

    /// Creates an engine with no root boundary.
    pub fn unrestricted() -> Self {
        Self {
            validator: PathValidator::unrestricted(),
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The canonical root boundary, if any.
    pub fn root(&self) -> Option<&Path> {
        self.validator.root()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Lists the immediate children of a directory.
    ///
    /// Dot-prefixed names are skipped unless `show_hidden`. Entries that
    /// cannot be stat'ed are silently left out rather than failing the call,
    /// and so are symlinks whose target lies outside the root.
    /// Directories come first, each group ordered case-insensitively.
    pub fn list(&self, path: impl AsRef<Path>, show_hidden: bool) -> EngineResult<DirectoryListing> {
        let dir = self.validator.validate(path)?;
        let meta = fs::metadata(&dir).map_err(|e| EngineError::from_io(e, &dir))?;

        if !meta.is_dir() {
            return Err(EngineError::NotADirectory(dir.display().to_string()));
        }

        let entries = fs::read_dir(&dir).map_err(|e| EngineError::from_io(e, &dir))?;
        let mut files = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_hidden && is_hidden(&name) {
                continue;
            }

            let entry_path = entry.path();
            match self.validator.stat_entry(&entry_path) {
                Ok(meta) => files.push(describe_entry(name, &entry_path, &meta)),
                Err(e) => debug!("Skipping {}: {}", entry_path.display(), e),
            }
        }

        sort_entries(&mut files);

        let parent_path = if self.validator.is_root(&dir) {
            None
        } else {
            dir.parent().map(Path::to_path_buf)
        };

        debug!("Listed {} ({} entries)", dir.display(), files.len());

        Ok(DirectoryListing {
            files,
            current_path: dir,
            parent_path,
        })
    }

    /// Recursively searches below `path` for names matching a glob pattern.
    ///
    /// Matching is case-insensitive. Enumeration is best-effort, like `list`.
    pub fn search(
        &self,
        path: impl AsRef<Path>,
        pattern: &str,
        show_hidden: bool,
    ) -> EngineResult<SearchResults> {
        let search_path = self.validator.validate(path)?;
        let matcher = compile_pattern(pattern)?;
        let meta =
            fs::metadata(&search_path).map_err(|e| EngineError::from_io(e, &search_path))?;

        if !meta.is_dir() {
            return Err(EngineError::NotADirectory(search_path.display().to_string()));
        }

        let results = search_tree(
            &search_path,
            &self.validator,
            &matcher,
            show_hidden,
            self.settings.max_search_depth,
        );

        info!(
            "Search for '{}' under {} matched {} entries",
            pattern,
            search_path.display(),
            results.len()
        );

        Ok(SearchResults {
            results,
            pattern: pattern.to_string(),
            search_path,
        })
    }

    /// Creates a new text file, creating missing parent directories.
    ///
    /// Never overwrites: an existing path fails with `AlreadyExists`.
    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> EngineResult<PathResult> {
        let target = self.validator.validate(path)?;
        ensure_absent(&target)?;
        create_parent(&target)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| EngineError::from_io(e, &target))?;
        file.write_all(content.as_bytes())
            .map_err(|e| EngineError::from_io(e, &target))?;

        info!("Created file {} ({} bytes)", target.display(), content.len());

        Ok(PathResult { path: target })
    }

    /// Creates a directory together with any missing parents.
    pub fn create_directory(&self, path: impl AsRef<Path>) -> EngineResult<PathResult> {
        let target = self.validator.validate(path)?;
        ensure_absent(&target)?;
        create_parent(&target)?;
        fs::create_dir(&target).map_err(|e| EngineError::from_io(e, &target))?;

        info!("Created directory {}", target.display());

        Ok(PathResult { path: target })
    }

    /// Moves a file or directory. The destination must not exist.
    ///
    /// A rename is attempted first; across filesystems the item is copied
    /// and the source removed afterwards.
    pub fn move_item(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> EngineResult<MoveResult> {
        let from = self.validator.validate_entry(source)?;
        let to = self.validator.validate_entry(destination)?;

        if self.validator.is_root(&from) {
            return Err(EngineError::AccessDenied(from.display().to_string()));
        }

        fs::symlink_metadata(&from).map_err(|e| EngineError::from_io(e, &from))?;
        ensure_absent(&to)?;

        if to.starts_with(&from) {
            return Err(EngineError::InvalidInput(format!(
                "cannot move {} into itself",
                from.display()
            )));
        }

        create_parent(&to)?;
        move_path(&from, &to).map_err(|e| EngineError::from_io(e, &from))?;

        info!("Moved {} to {}", from.display(), to.display());

        Ok(MoveResult { from, to })
    }

    /// Deletes a file, or a directory with everything below it.
    ///
    /// This is destructive and cannot be undone: there is no confirmation
    /// and no trash. A symlink is removed itself, never its target. The
    /// root boundary itself cannot be deleted.
    pub fn delete(&self, path: impl AsRef<Path>) -> EngineResult<DeleteResult> {
        let target = self.validator.validate_entry(path)?;

        if self.validator.is_root(&target) {
            return Err(EngineError::AccessDenied(target.display().to_string()));
        }

        let meta = fs::symlink_metadata(&target).map_err(|e| EngineError::from_io(e, &target))?;
        let kind = entry_kind(&meta);

        remove_path(&target).map_err(|e| EngineError::from_io(e, &target))?;

        info!("Deleted {:?} {}", kind, target.display());

        Ok(DeleteResult { path: target, kind })
    }

    /// Reads a file of at most `max_size` bytes (engine default when `None`).
    ///
    /// The size is checked before anything is read. Content that is not
    /// valid UTF-8 comes back hex encoded with `ContentEncoding::Binary`.
    pub fn read(&self, path: impl AsRef<Path>, max_size: Option<u64>) -> EngineResult<FileContent> {
        let max = max_size.unwrap_or(self.settings.max_read_bytes);
        let target = self.validator.validate(path)?;
        let meta = fs::metadata(&target).map_err(|e| EngineError::from_io(e, &target))?;

        if !meta.is_file() {
            return Err(EngineError::NotAFile(target.display().to_string()));
        }

        if meta.len() > max {
            return Err(EngineError::TooLarge {
                size: meta.len(),
                max,
            });
        }

        let file = fs::File::open(&target).map_err(|e| EngineError::from_io(e, &target))?;
        let mut bytes = Vec::with_capacity(meta.len() as usize);
        // The file may have grown since the stat; never read past the cap.
        file.take(max.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| EngineError::from_io(e, &target))?;

        let size = bytes.len() as u64;
        if size > max {
            return Err(EngineError::TooLarge { size, max });
        }

        let (content, encoding) = match String::from_utf8(bytes) {
            Ok(text) => (text, ContentEncoding::Utf8),
            Err(e) => (to_hex(e.as_bytes()), ContentEncoding::Binary),
        };

        debug!("Read {} ({} bytes, {:?})", target.display(), size, encoding);

        Ok(FileContent {
            content,
            size,
            encoding,
        })
    }

    /// Returns detailed metadata for a file or directory.
    ///
    /// For directories the immediate children are counted; an unreadable
    /// directory reports `item_count: None` instead of failing.
    pub fn info(&self, path: impl AsRef<Path>) -> EngineResult<FileInfo> {
        let target = self.validator.validate(path)?;
        let meta = fs::metadata(&target).map_err(|e| EngineError::from_io(e, &target))?;

        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.display().to_string());
        let entry = describe_entry(name, &target, &meta);

        let item_count = if meta.is_dir() {
            match count_entries(&target) {
                Ok(count) => Some(count),
                Err(e) => {
                    debug!("Cannot count entries of {}: {}", target.display(), e);
                    None
                }
            }
        } else {
            None
        };

        Ok(FileInfo {
            entry,
            created: format_timestamp(meta.created()),
            accessed: format_timestamp(meta.accessed()),
            item_count,
            path: target,
        })
    }
}

fn ensure_absent(path: &Path) -> EngineResult<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Err(EngineError::AlreadyExists(path.display().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EngineError::from_io(e, path)),
    }
}

fn create_parent(path: &Path) -> EngineResult<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| EngineError::from_io(e, parent)),
        None => Ok(()),
    }
}
