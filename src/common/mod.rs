//! Common utilities and types module.
// Shared structs, constants and small path helpers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{FileKitError, Result};

/// Capacity of the transfer buffer every copy operation allocates for itself.
pub const TRANSFER_BUFFER_SIZE: usize = 64 * 1024;

/// Kind of a filesystem node, queried at call time and never cached.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
    /// Sockets, devices, dangling links and anything else.
    Other,
}

impl FileKind {
    /// Classifies `path`, following symbolic links. Returns `None` if nothing is there.
    pub fn of(path: &Path) -> Option<FileKind> {
        match fs::metadata(path) {
            Ok(md) if md.is_file() => Some(FileKind::File),
            Ok(md) if md.is_dir() => Some(FileKind::Directory),
            Ok(_) => Some(FileKind::Other),
            // A dangling link still exists as a directory entry.
            Err(_) if fs::symlink_metadata(path).is_ok() => Some(FileKind::Other),
            Err(_) => None,
        }
    }
}

/// An ephemeral query result describing one path on disk.
#[derive(Serialize, Debug, Clone)]
pub struct FileNode {
    pub path: PathBuf,
    pub kind: FileKind,
    /// Size in bytes; zero for anything that is not a regular file.
    pub size: u64,
}

impl FileNode {
    /// Describes `path`, following symbolic links. A dangling link is reported as
    /// [`FileKind::Other`] rather than as an error.
    pub fn query(path: &Path) -> Result<FileNode> {
        let md = match fs::metadata(path) {
            Ok(md) => md,
            Err(e) => match fs::symlink_metadata(path) {
                Ok(link) if link.file_type().is_symlink() => {
                    return Ok(FileNode { path: path.to_path_buf(), kind: FileKind::Other, size: 0 })
                }
                _ => return Err(FileKitError::io(e, path)),
            },
        };
        let kind = if md.is_file() {
            FileKind::File
        } else if md.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        let size = if md.is_file() { md.len() } else { 0 };
        Ok(FileNode { path: path.to_path_buf(), kind, size })
    }
}

/// Appends `suffix` to the final component of `path` (`/tmp/a` + `.zip` -> `/tmp/a.zip`).
/// Trailing separators and `.` components are dropped first so the result is a sibling of
/// `path`, never a child of it.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let normalized: PathBuf = path.components().collect();
    let mut name = normalized.into_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
