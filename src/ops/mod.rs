//! # Copy, Delete and Clear
//!
//! Subtree-level operations. They are synchronous here; [`crate::FileKit`] runs them in the
//! background.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::copier::copy_stream;
use crate::error::{io_at, FileKitError, Result};
use crate::fsx;
use crate::walk::walk_error;

/// Copies one file, creating the destination's parent directories.
///
/// Without `replace`, an existing destination fails with `AlreadyExists`. Copying a file
/// onto itself is a no-op. Permission bits are carried over. Returns the bytes copied.
pub fn copy_file(source: &Path, destination: &Path, replace: bool) -> Result<u64> {
    let mut input = File::open(source).map_err(io_at(source))?;
    let metadata = input.metadata().map_err(io_at(source))?;
    if !metadata.is_file() {
        return Err(FileKitError::NotAFile(source.to_path_buf()));
    }
    if fsx::same_file(source, destination) {
        if !replace {
            return Err(FileKitError::AlreadyExists(destination.to_path_buf()));
        }
        return Ok(metadata.len());
    }
    fsx::ensure_parent_dir(destination)?;

    let mut open = OpenOptions::new();
    open.write(true);
    if replace {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    let output = open.open(destination).map_err(io_at(destination))?;
    let mut sink = BufWriter::new(output);
    let copied = copy_stream(&mut input, &mut sink).map_err(io_at(destination))?;
    sink.flush().map_err(io_at(destination))?;
    drop(sink);

    fsx::copy_permissions(&metadata, destination)?;
    debug!(from = %source.display(), to = %destination.display(), bytes = copied, "copied file");
    Ok(copied)
}

/// Mirrors the subtree at `source` into `destination`, empty directories included.
/// Returns the number of files copied.
///
/// Symbolic links are not descended into: a link to a file is copied as a file, a link to
/// a directory becomes an empty directory.
pub fn copy_directory(source: &Path, destination: &Path, replace: bool) -> Result<u64> {
    fsx::require_directory(source)?;
    reject_nested_destination(source, destination)?;
    fsx::ensure_parent_dir(destination)?;

    let mut copied = 0u64;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let relative = entry.path().strip_prefix(source).map_err(|_| FileKitError::NotUnderRoot {
            root: source.to_path_buf(),
            path: entry.path().to_path_buf(),
        })?;
        let target = if relative.as_os_str().is_empty() {
            destination.to_path_buf()
        } else {
            destination.join(relative)
        };

        let is_dir = entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir());
        if is_dir {
            mirror_directory(&target, replace)?;
        } else {
            copy_file(entry.path(), &target, replace)?;
            copied += 1;
        }
    }
    info!(from = %source.display(), to = %destination.display(), files = copied, "copied directory");
    Ok(copied)
}

fn mirror_directory(target: &Path, replace: bool) -> Result<()> {
    match fs::create_dir(target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && replace && target.is_dir() => Ok(()),
        Err(e) => Err(FileKitError::io(e, target)),
    }
}

/// Walking a tree while writing into it would never terminate.
fn reject_nested_destination(source: &Path, destination: &Path) -> Result<()> {
    let source_canonical = fs::canonicalize(source).map_err(io_at(source))?;
    let destination_canonical = resolve_maybe_missing(destination)?;
    if destination_canonical.starts_with(&source_canonical) {
        return Err(FileKitError::NestedDestination {
            source_dir: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonical form of a path whose trailing components may not exist yet: the deepest
/// existing ancestor is canonicalized and the missing names are appended back.
fn resolve_maybe_missing(path: &Path) -> Result<PathBuf> {
    let absolute = fsx::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(mut resolved) = fs::canonicalize(existing) {
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute.clone()),
        }
    }
}

/// Removes a file, or a directory with everything beneath it. A symbolic link is removed
/// itself; its target is left alone.
pub fn delete(target: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(target).map_err(io_at(target))?;
    if metadata.is_dir() {
        fs::remove_dir_all(target).map_err(io_at(target))?;
    } else {
        fs::remove_file(target).map_err(io_at(target))?;
    }
    info!(path = %target.display(), "deleted");
    Ok(())
}

/// Removes every child of `target`, leaving `target` itself in place.
///
/// With `only_files`, subdirectories are kept and cleared recursively so that only the
/// directory skeleton remains.
pub fn clear_directory(target: &Path, only_files: bool) -> Result<()> {
    fsx::require_directory(target)?;
    for entry in fs::read_dir(target).map_err(io_at(target))? {
        let entry = entry.map_err(io_at(target))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_at(&path))?;
        if file_type.is_dir() {
            if only_files {
                clear_directory(&path, true)?;
            } else {
                fs::remove_dir_all(&path).map_err(io_at(&path))?;
            }
        } else {
            fs::remove_file(&path).map_err(io_at(&path))?;
        }
    }
    debug!(path = %target.display(), only_files, "cleared directory");
    Ok(())
}
