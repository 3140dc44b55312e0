use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = FileKitError> = std::result::Result<T, E>;

/// The primary error type for all operations in the `filekit` crate.
#[derive(Debug, Error)]
pub enum FileKitError {
    /// An I/O error occurred while reading or writing a file.
    /// Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io { source: io::Error, path: PathBuf },

    /// The target path does not exist.
    #[error("No such file or directory: '{}'", .0.display())]
    NotFound(PathBuf),

    /// A directory-only operation was given something that is not a directory.
    #[error("Not a directory: '{}'", .0.display())]
    NotADirectory(PathBuf),

    /// A file-only operation was given something that is not a regular file.
    #[error("Not a regular file: '{}'", .0.display())]
    NotAFile(PathBuf),

    /// The destination already exists and replacing it was not requested.
    #[error("Destination already exists: '{}'", .0.display())]
    AlreadyExists(PathBuf),

    /// A path could not be expressed relative to a root because it does not lie beneath it.
    #[error("Path '{}' is not located under '{}'", .path.display(), .root.display())]
    NotUnderRoot { root: PathBuf, path: PathBuf },

    /// A directory copy would write into its own source tree.
    #[error("Cannot copy '{}' into its own subtree '{}'", .source_dir.display(), .destination.display())]
    NestedDestination { source_dir: PathBuf, destination: PathBuf },

    /// An operation would write its output over its own input.
    #[error("Destination '{}' is the source file itself", .0.display())]
    DestinationIsSource(PathBuf),

    /// `gunzip` was called without a destination on a file that has no extension to strip.
    #[error("Cannot derive an output name for '{}': it has no extension", .0.display())]
    NoDefaultDestination(PathBuf),

    /// A rename target was not a plain file name.
    #[error("Invalid file name '{0}': expected a single path component")]
    InvalidName(String),

    /// Directory traversal failed, including symbolic link cycles.
    #[error("Failed to walk '{}': {source}", .path.display())]
    Walk { path: PathBuf, source: walkdir::Error },

    /// An error from the underlying `zip` writer.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Establishing the connection took longer than the connect timeout.
    #[error("Connecting to {url} timed out after {timeout:?}")]
    ConnectTimeout { url: String, timeout: Duration },

    /// Waiting for response data took longer than the read timeout.
    #[error("Reading from {url} timed out after {timeout:?}")]
    ReadTimeout { url: String, timeout: Duration },

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Any other transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configuration value could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tokio runtime was available to run background operations on.
    #[error("No tokio runtime is available on this thread")]
    NoRuntime,

    /// The background task was aborted before it produced a result.
    #[error("Background task was aborted")]
    TaskAborted,

    /// The background task panicked.
    #[error("Background task panicked: {0}")]
    TaskPanicked(String),
}

impl FileKitError {
    /// Wraps an I/O error with the path it happened on. `NotFound` and `AlreadyExists`
    /// are promoted to their dedicated variants.
    pub fn io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => FileKitError::NotFound(path),
            io::ErrorKind::AlreadyExists => FileKitError::AlreadyExists(path),
            _ => FileKitError::Io { source, path },
        }
    }

    /// True for the "target absent" family of failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FileKitError::NotFound(_))
    }

    /// True if either timeout of a network fetch was exceeded.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FileKitError::ConnectTimeout { .. } | FileKitError::ReadTimeout { .. })
    }
}

/// `map_err` adapter attaching `path` to an I/O error.
pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> FileKitError + '_ {
    move |source| FileKitError::io(source, path)
}

// Generic IO error conversion that doesn't require a path
impl From<io::Error> for FileKitError {
    fn from(err: io::Error) -> Self {
        FileKitError::Io { source: err, path: PathBuf::new() }
    }
}

impl From<tokio::task::JoinError> for FileKitError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            return FileKitError::TaskAborted;
        }
        let payload = err.into_panic();
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic payload".to_string()
        };
        FileKitError::TaskPanicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_promotes_not_found_and_already_exists() {
        let err = FileKitError::io(io::Error::from(io::ErrorKind::NotFound), "/nope");
        assert!(matches!(err, FileKitError::NotFound(ref p) if p == Path::new("/nope")));
        assert!(err.is_not_found());

        let err = FileKitError::io(io::Error::from(io::ErrorKind::AlreadyExists), "/here");
        assert!(matches!(err, FileKitError::AlreadyExists(_)));

        let err = FileKitError::io(io::Error::from(io::ErrorKind::PermissionDenied), "/locked");
        assert!(matches!(err, FileKitError::Io { .. }));
        assert!(err.to_string().contains("/locked"));
    }
}
