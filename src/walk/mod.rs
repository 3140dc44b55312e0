//! # Directory Traversal
//!
//! Recursive and one-level listings of a directory, plus the path relativization used to
//! name archive entries.
//!
//! The recursive walk is depth-first and pre-order: children are visited in the order the
//! directory listing yields them (not sorted) and a subdirectory is descended into as soon
//! as it is met. Only regular files end up in the result. Symbolic links are followed;
//! a link cycle aborts the walk with [`FileKitError::Walk`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::common::FileKind;
use crate::error::{io_at, FileKitError, Result};
use crate::fsx;

/// Which children a one-level listing keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Files,
    Directories,
    All,
}

/// Every regular file beneath `root`, as absolute paths.
///
/// Fails with `NotADirectory` when `root` is not a directory, so an empty directory and a
/// wrong node kind are never confused.
pub fn list_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    fsx::require_directory(root)?;
    let root = fsx::absolute(root)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).min_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_vanished(&e) => {
                // Dangling link, or removed while we were walking.
                debug!(path = ?e.path(), "skipping unreadable entry");
                continue;
            }
            Err(e) => return Err(walk_error(&root, e)),
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Direct children of `dir` matching `listing`, as absolute paths in listing order.
pub fn list_dir(dir: &Path, listing: Listing) -> Result<Vec<PathBuf>> {
    fsx::require_directory(dir)?;
    let dir = fsx::absolute(dir)?;

    let mut out = Vec::new();
    for entry in fs::read_dir(&dir).map_err(io_at(&dir))? {
        let path = entry.map_err(io_at(&dir))?.path();
        let keep = match listing {
            Listing::All => true,
            Listing::Files => FileKind::of(&path) == Some(FileKind::File),
            Listing::Directories => FileKind::of(&path) == Some(FileKind::Directory),
        };
        if keep {
            out.push(path);
        }
    }
    Ok(out)
}

pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_dir(dir, Listing::Files)
}

pub fn list_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    list_dir(dir, Listing::Directories)
}

pub fn list_file_and_directories(dir: &Path) -> Result<Vec<PathBuf>> {
    list_dir(dir, Listing::All)
}

/// Computes root-relative names for files beneath a fixed root.
///
/// The root is canonicalized once; each file is canonicalized per call so that symlinked
/// or `..`-laden paths still resolve to the right entry name.
#[derive(Debug, Clone)]
pub struct Relativizer {
    root: PathBuf,
}

impl Relativizer {
    pub fn new(root: &Path) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(io_at(root))?;
        Ok(Self { root })
    }

    /// Relative path of `file` with `/` separators. `file` must lie strictly beneath the root.
    pub fn relativize(&self, file: &Path) -> Result<String> {
        let canonical = fs::canonicalize(file).map_err(io_at(file))?;
        let not_under_root = || FileKitError::NotUnderRoot {
            root: self.root.clone(),
            path: canonical.clone(),
        };
        let relative = canonical.strip_prefix(&self.root).map_err(|_| not_under_root())?;
        slash_joined(relative).ok_or_else(not_under_root)
    }
}

/// Name of a walked `path` relative to the `root` it was walked from, without resolving
/// links. A link inside the root keeps the name of the link even when its target lies
/// elsewhere, so every file [`list_files_recursive`] returns has a name.
pub(crate) fn walked_name(root: &Path, path: &Path) -> Result<String> {
    let not_under_root = || FileKitError::NotUnderRoot {
        root: root.to_path_buf(),
        path: path.to_path_buf(),
    };
    let relative = path.strip_prefix(root).map_err(|_| not_under_root())?;
    slash_joined(relative).ok_or_else(not_under_root)
}

/// `None` for an empty path.
fn slash_joined(relative: &Path) -> Option<String> {
    let mut name = String::new();
    for component in relative.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    (!name.is_empty()).then_some(name)
}

/// One-shot form of [`Relativizer::relativize`].
pub fn relativize(root: &Path, file: &Path) -> Result<String> {
    Relativizer::new(root)?.relativize(file)
}

fn is_vanished(err: &walkdir::Error) -> bool {
    err.loop_ancestor().is_none()
        && err.io_error().map(|e| e.kind() == io::ErrorKind::NotFound).unwrap_or(false)
}

pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> FileKitError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    FileKitError::Walk { path, source: err }
}
