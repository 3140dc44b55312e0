//! The operation surface.
//!
//! [`FileKit`] binds the crate's operations to a tokio runtime. Queries, listings, moves
//! and directory creation answer synchronously; copies, deletes, archives, compression and
//! fetches are started in the background and return a [`TaskHandle`] immediately.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::runtime::Handle;

use crate::archive::{self, ZipSummary};
use crate::compress;
use crate::config::FetchOptions;
use crate::error::{io_at, FileKitError, Result};
use crate::fsx;
use crate::net;
use crate::ops;
use crate::walk;
use crate::workers::{self, TaskHandle};

#[derive(Debug, Clone)]
pub struct FileKit {
    runtime: Handle,
}

impl FileKit {
    /// Runs background operations on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Binds to the runtime of the calling context.
    pub fn from_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| FileKitError::NoRuntime)
    }

    // --- Queries -------------------------------------------------------------------

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        fsx::exists(path.as_ref())
    }

    pub fn is_file(&self, path: impl AsRef<Path>) -> bool {
        fsx::is_file(path.as_ref())
    }

    pub fn is_directory(&self, path: impl AsRef<Path>) -> bool {
        fsx::is_dir(path.as_ref())
    }

    pub fn file_size(&self, path: impl AsRef<Path>) -> Result<u64> {
        fsx::file_size(path.as_ref())
    }

    // --- Creation, moves and renames ------------------------------------------------

    /// Returns `true` if the file was created, `false` if it already existed.
    pub fn new_file(&self, path: impl AsRef<Path>) -> Result<bool> {
        fsx::new_file(path.as_ref())
    }

    pub fn new_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        fsx::new_directory(path.as_ref())
    }

    pub fn move_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        fsx::move_path(source.as_ref(), destination.as_ref())
    }

    pub fn move_directory(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        fsx::move_path(source.as_ref(), destination.as_ref())
    }

    /// Renames `target` to `name` inside the same directory. Returns the new path.
    pub fn rename_file(&self, target: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
        let target = target.as_ref();
        let destination = fsx::sibling(target, name)?;
        fsx::move_path(target, &destination)?;
        Ok(destination)
    }

    pub fn rename_directory(&self, target: impl AsRef<Path>, name: &str) -> Result<PathBuf> {
        self.rename_file(target, name)
    }

    // --- Listings -------------------------------------------------------------------

    pub fn list_files_recursive(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        walk::list_files_recursive(dir.as_ref())
    }

    pub fn list_files(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        walk::list_files(dir.as_ref())
    }

    pub fn list_directories(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        walk::list_directories(dir.as_ref())
    }

    pub fn list_file_and_directories(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        walk::list_file_and_directories(dir.as_ref())
    }

    pub fn relativize(&self, root: impl AsRef<Path>, file: impl AsRef<Path>) -> Result<String> {
        walk::relativize(root.as_ref(), file.as_ref())
    }

    // --- Background operations ------------------------------------------------------

    /// Resolves to the number of bytes copied.
    pub fn copy_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>, replace: bool) -> TaskHandle<u64> {
        let (source, destination) = (owned(source), owned(destination));
        workers::spawn_blocking(&self.runtime, "copy_file", move || {
            ops::copy_file(&source, &destination, replace)
        })
    }

    /// Resolves to the number of files copied.
    pub fn copy_directory(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>, replace: bool) -> TaskHandle<u64> {
        let (source, destination) = (owned(source), owned(destination));
        workers::spawn_blocking(&self.runtime, "copy_directory", move || {
            ops::copy_directory(&source, &destination, replace)
        })
    }

    pub fn delete(&self, target: impl AsRef<Path>) -> TaskHandle<()> {
        let target = owned(target);
        workers::spawn_blocking(&self.runtime, "delete", move || ops::delete(&target))
    }

    pub fn clear_directory(&self, target: impl AsRef<Path>, only_files: bool) -> TaskHandle<()> {
        let target = owned(target);
        workers::spawn_blocking(&self.runtime, "clear_directory", move || {
            ops::clear_directory(&target, only_files)
        })
    }

    /// Zips `root` into `root + ".zip"`.
    pub fn zip(&self, root: impl AsRef<Path>) -> TaskHandle<ZipSummary> {
        let root = owned(root);
        workers::spawn_blocking(&self.runtime, "zip", move || archive::zip_directory(&root))
    }

    /// Gzips `file` into `file + ".gz"`; resolves to the output path.
    pub fn gzip(&self, file: impl AsRef<Path>) -> TaskHandle<PathBuf> {
        let file = owned(file);
        workers::spawn_blocking(&self.runtime, "gzip", move || compress::gzip_file(&file))
    }

    /// Gunzips `file`; resolves to the decompressed content once it is fully written.
    pub fn gunzip(&self, file: impl AsRef<Path>, destination: Option<&Path>) -> TaskHandle<Vec<u8>> {
        let file = owned(file);
        let destination = destination.map(Path::to_path_buf);
        workers::spawn_blocking(&self.runtime, "gunzip", move || {
            let output = compress::gunzip_file(&file, destination.as_deref())?;
            read_back(&output)
        })
    }

    /// Downloads a gzip resource and writes it decompressed; resolves to the written content.
    pub fn fetch_gunzip(&self, url: &str, destination: impl AsRef<Path>, options: FetchOptions) -> TaskHandle<Vec<u8>> {
        let (url, destination) = (url.to_string(), owned(destination));
        workers::spawn(&self.runtime, "fetch_gunzip", async move {
            net::fetch_gunzip(&url, &destination, &options).await?;
            read_back_async(destination).await
        })
    }

    /// Downloads a resource as-is; resolves to the written content.
    pub fn fetch_to_file(&self, url: &str, destination: impl AsRef<Path>, options: FetchOptions) -> TaskHandle<Vec<u8>> {
        let (url, destination) = (url.to_string(), owned(destination));
        workers::spawn(&self.runtime, "fetch_to_file", async move {
            net::fetch_to_file(&url, &destination, &options).await?;
            read_back_async(destination).await
        })
    }
}

fn owned(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().to_path_buf()
}

fn read_back(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(io_at(path))
}

async fn read_back_async(path: PathBuf) -> Result<Vec<u8>> {
    tokio::fs::read(&path).await.map_err(io_at(&path))
}
