//! # filekit Core Library
//!
//! A filesystem utility layer: move, copy, delete, create and list files and directories,
//! zip directory trees, gzip single files and fetch remote (optionally gzipped) resources.
//!
//! It is designed to be used by the `filekit` command-line application, but its public API
//! can also be used directly through [`FileKit`].
//!
//! ## Key Modules
//!
//! - [`walk`]: Recursive and one-level directory listings, and path relativization.
//! - [`archive`]: Writes `<dir>.zip` archives from a directory tree.
//! - [`compress`]: Gzip and gunzip of single files.
//! - [`net`]: HTTP(S) downloads bounded by connect and read timeouts.
//! - [`ops`]: Subtree copy, recursive delete and directory clearing.
//! - [`workers`]: Background execution and the [`TaskHandle`] returned to callers.
//!
//! ## Examples
//!
//! ```no_run
//! # async fn demo() -> Result<(), filekit::FileKitError> {
//! let kit = filekit::FileKit::from_current()?;
//! let summary = kit.zip("/tmp/a").await?;
//! println!("{} entries in {}", summary.entries, summary.archive.display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cli;
pub mod common;
pub mod compress;
pub mod config;
pub mod copier;
pub mod error;
pub mod fsx;
pub mod kit;
pub mod net;
pub mod ops;
pub mod walk;
pub mod workers;

pub use archive::ZipSummary;
pub use config::FetchOptions;
pub use error::{FileKitError, Result};
pub use kit::FileKit;
pub use workers::TaskHandle;
