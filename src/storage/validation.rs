//! Path validation
//!
//! Resolves request paths to canonical absolute form and enforces the root
//! boundary. Containment is checked on the canonical result, component by
//! component, never on the raw string.

use log::warn;
use soft_canonicalize::soft_canonicalize;
use std::env;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{EngineError, EngineResult};

/// Canonicalizes paths and keeps them inside an optional root boundary.
#[derive(Debug, Clone)]
pub struct PathValidator {
    root: Option<PathBuf>,
}

impl PathValidator {
    /// Creates a validator bounded by `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> EngineResult<Self> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|e| EngineError::from_io(e, root))?;

        if !canonical.is_dir() {
            return Err(EngineError::NotADirectory(root.display().to_string()));
        }

        Ok(Self {
            root: Some(canonical),
        })
    }

    /// Creates a validator that canonicalizes but does not restrict.
    pub fn unrestricted() -> Self {
        Self { root: None }
    }

    /// The canonical root boundary, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Returns true if `path` is the root boundary itself.
    pub fn is_root(&self, path: &Path) -> bool {
        self.root.as_deref() == Some(path)
    }

    /// Resolves `path` fully, following every symlink on the way, including
    /// the final component.
    pub fn validate(&self, path: impl AsRef<Path>) -> EngineResult<PathBuf> {
        let requested = path.as_ref();
        let absolute = self.absolutize(requested)?;
        let resolved = self.resolve(requested, &absolute)?;
        self.check_boundary(requested, resolved)
    }

    /// Resolves the parent of `path` but keeps its final component as-is, so
    /// a symlink there names the link itself rather than its target.
    ///
    /// Used by operations that act on directory entries (delete, move).
    pub fn validate_entry(&self, path: impl AsRef<Path>) -> EngineResult<PathBuf> {
        let requested = path.as_ref();
        let absolute = self.absolutize(requested)?;

        match (absolute.parent(), absolute.file_name()) {
            (Some(parent), Some(name)) => {
                let parent = self.resolve(requested, parent)?;
                self.check_boundary(requested, parent.join(name))
            }
            _ => self.validate(requested),
        }
    }

    /// Returns true if `path` (already canonical) lies inside the boundary.
    pub fn contains(&self, path: &Path) -> bool {
        match &self.root {
            Some(root) => path.starts_with(root),
            None => true,
        }
    }

    /// Stats an entry found while enumerating a validated directory.
    ///
    /// Symlinks are followed only when their target stays inside the
    /// boundary; a link leading out fails with `PermissionDenied` so callers
    /// skip it like any other entry they cannot stat.
    pub fn stat_entry(&self, path: &Path) -> io::Result<Metadata> {
        let link = fs::symlink_metadata(path)?;
        if !link.file_type().is_symlink() {
            return Ok(link);
        }

        let target = fs::canonicalize(path)?;
        if !self.contains(&target) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("symlink target {} is outside the root", target.display()),
            ));
        }
        fs::metadata(&target)
    }

    /// Canonicalizes `absolute`, which may not exist yet. Dangling symlinks
    /// are followed to where a write would land.
    ///
    /// When resolution fails, a path that is lexically outside the boundary
    /// still reports `AccessDenied` so nothing about it leaks.
    fn resolve(&self, requested: &Path, absolute: &Path) -> EngineResult<PathBuf> {
        match soft_canonicalize(absolute) {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                self.check_boundary(requested, normalize_lexically(absolute))?;
                Err(EngineError::from_io(e, requested))
            }
        }
    }

    fn absolutize(&self, path: &Path) -> EngineResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(EngineError::InvalidInput("empty path".into()));
        }

        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        match &self.root {
            Some(root) => Ok(root.join(path)),
            None => env::current_dir()
                .map(|cwd| cwd.join(path))
                .map_err(|e| EngineError::from_io(e, path)),
        }
    }

    fn check_boundary(&self, requested: &Path, resolved: PathBuf) -> EngineResult<PathBuf> {
        match &self.root {
            Some(_) if !self.contains(&resolved) => {
                warn!(
                    "Path traversal attempt blocked: {} resolved to {}",
                    requested.display(),
                    resolved.display()
                );
                Err(EngineError::AccessDenied(requested.display().to_string()))
            }
            _ => Ok(resolved),
        }
    }
}

/// Drops `.` and folds `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
