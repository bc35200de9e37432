//! File system operations
//!
//! Low-level helpers used by the file engine once paths are validated.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Removes a file, symlink, or a whole directory tree.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Renames `from` to `to`, falling back to copy-then-delete across devices.
pub fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => move_by_copy(from, to),
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to` and removes `from`. A failed copy removes whatever
/// part of `to` was already written and leaves `from` untouched.
fn move_by_copy(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::from(io::ErrorKind::AlreadyExists));
    }

    if let Err(e) = copy_recursively(from, to) {
        if fs::symlink_metadata(to).is_ok() {
            let _ = remove_path(to);
        }
        return Err(e);
    }
    remove_path(from)
}

fn copy_recursively(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(from)?;

    if meta.file_type().is_symlink() {
        return copy_symlink(from, to);
    }

    if meta.is_dir() {
        fs::create_dir(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &to.join(entry.file_name()))?;
        }
        fs::set_permissions(to, meta.permissions())
    } else if meta.is_file() {
        fs::copy(from, to).map(|_| ())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot copy special file {}", from.display()),
        ))
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

/// Counts the immediate children of a directory.
pub fn count_entries(path: &Path) -> io::Result<usize> {
    Ok(fs::read_dir(path)?.count())
}

/// Lowercase hex encoding of `bytes`.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}
