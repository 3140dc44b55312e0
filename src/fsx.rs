//! Thin filesystem primitives.
//!
//! Existence and kind queries, `mkdir -p`, moves and renames are plain pass-throughs to
//! `std::fs`; the only thing added here is translation of failures into [`FileKitError`]
//! with the offending path attached. The rest of the crate imports `crate::fsx` instead of
//! repeating these checks at every call-site.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use scopeguard::ScopeGuard;
use tracing::{debug, warn};

use crate::error::{io_at, FileKitError, Result};

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

pub fn is_dir(path: &Path) -> bool {
    path.is_dir()
}

/// Size of the file in bytes (symbolic links are followed).
pub fn file_size(path: &Path) -> Result<u64> {
    let md = fs::metadata(path).map_err(io_at(path))?;
    if !md.is_file() {
        return Err(FileKitError::NotAFile(path.to_path_buf()));
    }
    Ok(md.len())
}

/// Makes `path` absolute against the current directory without touching the filesystem.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(io_at(Path::new(".")))?;
    Ok(cwd.join(path))
}

/// Fails with `NotFound` or `NotADirectory` unless `path` is a directory.
pub fn require_directory(path: &Path) -> Result<()> {
    let md = fs::metadata(path).map_err(io_at(path))?;
    if !md.is_dir() {
        return Err(FileKitError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Creates every missing directory above `path`.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_at(parent))
        }
        _ => Ok(()),
    }
}

/// Creates an empty file, creating parent directories first.
/// Returns `false` if something already existed at `path`.
pub fn new_file(path: &Path) -> Result<bool> {
    ensure_parent_dir(path)?;
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(FileKitError::io(e, path)),
    }
}

/// `mkdir -p`. Succeeds when the directory already exists.
pub fn new_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(io_at(path))
}

/// Moves a file or directory with a single `rename`, creating the destination's parents.
///
/// The source is checked before anything is created, so a missing source leaves no trace.
/// Renames across filesystems fail with `Io` rather than falling back to copy + delete.
pub fn move_path(source: &Path, destination: &Path) -> Result<()> {
    fs::symlink_metadata(source).map_err(io_at(source))?;
    ensure_parent_dir(destination)?;
    fs::rename(source, destination).map_err(io_at(destination))?;
    debug!(from = %source.display(), to = %destination.display(), "moved");
    Ok(())
}

/// Path of `name` next to `target` in the same parent directory.
pub fn sibling(target: &Path, name: &str) -> Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(FileKitError::InvalidName(name.to_string())),
    }
    let parent = target.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(name))
}

/// True when both paths exist and resolve to the same file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copies permission bits from `from` onto `path`.
pub fn copy_permissions(from: &fs::Metadata, path: &Path) -> Result<()> {
    fs::set_permissions(path, from.permissions()).map_err(io_at(path))
}

/// Returns a guard that deletes `path` when dropped. Defuse it with
/// [`ScopeGuard::into_inner`] once the output is complete.
pub fn discard_on_failure(path: &Path) -> ScopeGuard<PathBuf, impl FnOnce(PathBuf)> {
    scopeguard::guard(path.to_path_buf(), |path| match fs::remove_file(&path) {
        Ok(()) => warn!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial output"),
    })
}
