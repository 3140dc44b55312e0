use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::FetchOptions;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Zip a directory recursively into `<dir>.zip`.
    #[command(alias = "z")]
    Zip {
        /// The directory to archive.
        #[arg(required = true)]
        source: PathBuf,
    },

    /// Compress a file into `<file>.gz`.
    Gzip {
        /// The file to compress.
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Decompress a gzip file.
    Gunzip {
        /// The gzip file to decompress.
        #[arg(required = true)]
        file: PathBuf,

        /// Where to write the output. Defaults to the input minus its last extension.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download a URL into a file.
    Fetch {
        /// The URL to download.
        #[arg(required = true)]
        url: String,

        /// The file to write.
        #[arg(short, long)]
        output: PathBuf,

        /// The resource is gzip-compressed; write it decompressed.
        #[arg(long)]
        gunzip: bool,

        /// Connect timeout in milliseconds (0 = none). Falls back to FILEKIT_CONNECT_TIMEOUT_MS.
        #[arg(long)]
        connect_timeout_ms: Option<u64>,

        /// Per-read timeout in milliseconds (0 = none). Falls back to FILEKIT_READ_TIMEOUT_MS.
        #[arg(long)]
        read_timeout_ms: Option<u64>,
    },

    /// Copy a file or a directory tree.
    #[command(alias = "cp")]
    Copy {
        source: PathBuf,
        destination: PathBuf,

        /// Overwrite existing files.
        #[arg(long)]
        replace: bool,
    },

    /// Move a file or directory.
    #[command(alias = "mv")]
    Move { source: PathBuf, destination: PathBuf },

    /// Rename a file or directory in place.
    Rename {
        target: PathBuf,
        /// The new name (a single path component).
        name: String,
    },

    /// Delete a file or a directory tree.
    #[command(alias = "rm")]
    Delete { target: PathBuf },

    /// Remove everything inside a directory.
    Clear {
        target: PathBuf,

        /// Keep subdirectories, remove only files.
        #[arg(long)]
        only_files: bool,
    },

    /// List the contents of a directory.
    #[command(alias = "ls")]
    List {
        target: PathBuf,

        /// Include files in subdirectories.
        #[arg(short, long, conflicts_with_all = ["dirs", "all"])]
        recursive: bool,

        /// List subdirectories instead of files.
        #[arg(long, conflicts_with = "all")]
        dirs: bool,

        /// List files and subdirectories.
        #[arg(long)]
        all: bool,

        /// Print JSON records instead of plain paths.
        #[arg(long)]
        json: bool,
    },

    /// Create a directory and any missing parents.
    Mkdir { target: PathBuf },

    /// Create an empty file and any missing parent directories.
    Touch { target: PathBuf },

    /// Print the size of a file in bytes.
    Size { target: PathBuf },
}

/// Resolves fetch timeouts from the command-line options or the environment.
///
/// Priority:
/// 1. `--connect-timeout-ms` / `--read-timeout-ms`.
/// 2. `FILEKIT_CONNECT_TIMEOUT_MS` / `FILEKIT_READ_TIMEOUT_MS`.
/// 3. Built-in defaults.
pub fn fetch_options_from_opt_or_env(connect_ms: Option<u64>, read_ms: Option<u64>) -> Result<FetchOptions> {
    FetchOptions::resolve(connect_ms, read_ms)
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> std::result::Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
