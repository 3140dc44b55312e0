//! # Zip Archives
//!
//! Builds `<root>.zip` from every regular file beneath a directory. Entry names are the
//! files' paths relative to the root (`/`-separated) and entry contents are streamed
//! through [`copy_stream`], one entry at a time.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt; // mode()
use std::path::{Path, PathBuf};

use scopeguard::ScopeGuard;
use serde::Serialize;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::common::with_suffix;
use crate::copier::copy_stream;
use crate::error::{io_at, Result};
use crate::fsx;
use crate::walk;

/// Entries at or above this size need the zip64 extension.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// What a finished archive contains.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ZipSummary {
    pub archive: PathBuf,
    pub entries: usize,
    /// Total uncompressed bytes written.
    pub bytes: u64,
}

/// A writer that appends named entries to a zip stream.
///
/// Starting an entry closes the previous one, so entries never overlap.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: usize,
    bytes: u64,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { zip: ZipWriter::new(inner), entries: 0, bytes: 0 }
    }

    /// Adds the file at `source` under `name`, keeping its permission bits on Unix.
    pub fn append_file(&mut self, name: &str, source: &Path) -> Result<u64> {
        let mut input = File::open(source).map_err(io_at(source))?;
        let metadata = input.metadata().map_err(io_at(source))?;

        let mut options = entry_options().large_file(metadata.len() >= ZIP64_THRESHOLD);
        #[cfg(unix)]
        {
            options = options.unix_permissions(metadata.permissions().mode());
        }

        self.zip.start_file(name, options)?;
        let copied = copy_stream(&mut input, &mut self.zip).map_err(io_at(source))?;
        self.entries += 1;
        self.bytes += copied;
        debug!(entry = name, bytes = copied, "added zip entry");
        Ok(copied)
    }

    /// Adds an entry whose content comes from an arbitrary reader.
    pub fn append_reader<R: Read + ?Sized>(&mut self, name: &str, reader: &mut R) -> Result<u64> {
        self.zip.start_file(name, entry_options())?;
        let copied = copy_stream(reader, &mut self.zip)?;
        self.entries += 1;
        self.bytes += copied;
        Ok(copied)
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Writes the central directory and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

fn entry_options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Path of the archive `zip_directory(root)` produces.
pub fn archive_path_for(root: &Path) -> Result<PathBuf> {
    Ok(with_suffix(&fsx::absolute(root)?, ".zip"))
}

/// Zips every regular file beneath `root` into `root + ".zip"`, overwriting any existing
/// archive.
///
/// The root is validated before the destination is touched. Any failure aborts the whole
/// operation and removes the partially written archive.
pub fn zip_directory(root: &Path) -> Result<ZipSummary> {
    let files = walk::list_files_recursive(root)?;
    // The walk yields paths under the absolute root, links not resolved.
    let walked_root = fsx::absolute(root)?;
    let destination = archive_path_for(root)?;
    fsx::ensure_parent_dir(&destination)?;

    let output = File::create(&destination).map_err(io_at(&destination))?;
    // Declared before the writer so the file is closed before the guard removes it.
    let cleanup = fsx::discard_on_failure(&destination);
    let mut writer = ArchiveWriter::new(BufWriter::new(output));

    for file in &files {
        let name = walk::walked_name(&walked_root, file)?;
        writer.append_file(&name, file)?;
    }

    let (entries, bytes) = (writer.entries(), writer.bytes());
    let mut sink = writer.finish()?;
    sink.flush().map_err(io_at(&destination))?;
    drop(sink);
    ScopeGuard::into_inner(cleanup);

    let archived = fs::metadata(&destination).map(|m| m.len()).unwrap_or(0);
    info!(
        root = %root.display(),
        archive = %destination.display(),
        entries,
        bytes,
        archived,
        "zip archive written"
    );
    Ok(ZipSummary { archive: destination, entries, bytes })
}
