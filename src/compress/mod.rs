//! # Gzip Compression
//!
//! Single-file gzip and gunzip. Both directions wrap the file streams in a `flate2` filter
//! and move the bytes with [`copy_stream`]. Outputs are overwritten unconditionally and
//! removed again if the operation fails halfway.
//!
//! There is deliberately no level control: compression always uses the default level.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use scopeguard::ScopeGuard;
use tracing::info;

use crate::common::with_suffix;
use crate::copier::copy_stream;
use crate::error::{io_at, FileKitError, Result};
use crate::fsx;

/// Path of the file `gzip_file(source)` produces.
pub fn gzip_path_for(source: &Path) -> PathBuf {
    with_suffix(source, ".gz")
}

/// Output path `gunzip_file` uses when none is given: the source minus its last extension
/// (`notes.txt.gz` -> `notes.txt`).
pub fn default_gunzip_destination(source: &Path) -> Result<PathBuf> {
    if source.extension().is_none() {
        return Err(FileKitError::NoDefaultDestination(source.to_path_buf()));
    }
    Ok(source.with_extension(""))
}

/// Compresses `source` into `source + ".gz"` and returns the output path.
pub fn gzip_file(source: &Path) -> Result<PathBuf> {
    let mut input = File::open(source).map_err(io_at(source))?;
    if !input.metadata().map_err(io_at(source))?.is_file() {
        return Err(FileKitError::NotAFile(source.to_path_buf()));
    }
    let destination = gzip_path_for(source);

    let output = File::create(&destination).map_err(io_at(&destination))?;
    let cleanup = fsx::discard_on_failure(&destination);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    let read = copy_stream(&mut input, &mut encoder).map_err(io_at(&destination))?;
    let mut sink = encoder.finish().map_err(io_at(&destination))?;
    sink.flush().map_err(io_at(&destination))?;
    drop(sink);
    ScopeGuard::into_inner(cleanup);

    info!(source = %source.display(), output = %destination.display(), bytes = read, "gzipped");
    Ok(destination)
}

/// Decompresses `source` into `destination` (or [`default_gunzip_destination`]) and
/// returns the output path. Concatenated gzip members are decoded back to back.
pub fn gunzip_file(source: &Path, destination: Option<&Path>) -> Result<PathBuf> {
    let destination = match destination {
        Some(path) => path.to_path_buf(),
        None => default_gunzip_destination(source)?,
    };
    let input = File::open(source).map_err(io_at(source))?;
    // Creating the output would truncate the input before a byte of it is read.
    if fsx::same_file(source, &destination) {
        return Err(FileKitError::DestinationIsSource(destination));
    }
    fsx::ensure_parent_dir(&destination)?;

    let output = File::create(&destination).map_err(io_at(&destination))?;
    let cleanup = fsx::discard_on_failure(&destination);
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let mut sink = BufWriter::new(output);
    // Corrupt input surfaces here as InvalidInput / UnexpectedEof from the decoder.
    let written = copy_stream(&mut decoder, &mut sink).map_err(io_at(source))?;
    sink.flush().map_err(io_at(&destination))?;
    drop(sink);
    ScopeGuard::into_inner(cleanup);

    info!(source = %source.display(), output = %destination.display(), bytes = written, "gunzipped");
    Ok(destination)
}
