//! Main entry point for the filekit CLI app

use filekit::cli::{self, Commands};
use filekit::common::FileNode;
use filekit::walk::{self, Listing};
use filekit::FileKit;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;
    init_logging();
    let runtime = tokio::runtime::Runtime::new()?;
    let kit = FileKit::new(runtime.handle().clone());
    runtime.block_on(execute(&kit, command))
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn execute(kit: &FileKit, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Zip { source } => {
            let summary = kit.zip(&source).await?;
            println!(
                "Archived {} files ({} bytes) → {}",
                summary.entries,
                summary.bytes,
                summary.archive.display()
            );
        }
        Commands::Gzip { file } => {
            let output = kit.gzip(&file).await?;
            println!("{}", output.display());
        }
        Commands::Gunzip { file, output } => {
            let content = kit.gunzip(&file, output.as_deref()).await?;
            println!("Wrote {} bytes", content.len());
        }
        Commands::Fetch { url, output, gunzip, connect_timeout_ms, read_timeout_ms } => {
            let options = cli::fetch_options_from_opt_or_env(connect_timeout_ms, read_timeout_ms)?;
            let content = if gunzip {
                kit.fetch_gunzip(&url, &output, options).await?
            } else {
                kit.fetch_to_file(&url, &output, options).await?
            };
            println!("Wrote {} bytes to {}", content.len(), output.display());
        }
        Commands::Copy { source, destination, replace } => {
            if kit.is_directory(&source) {
                let files = kit.copy_directory(&source, &destination, replace).await?;
                println!("Copied {} files", files);
            } else {
                let bytes = kit.copy_file(&source, &destination, replace).await?;
                println!("Copied {} bytes", bytes);
            }
        }
        Commands::Move { source, destination } => {
            kit.move_file(&source, &destination)?;
        }
        Commands::Rename { target, name } => {
            let renamed = kit.rename_file(&target, &name)?;
            println!("{}", renamed.display());
        }
        Commands::Delete { target } => {
            kit.delete(&target).await?;
        }
        Commands::Clear { target, only_files } => {
            kit.clear_directory(&target, only_files).await?;
        }
        Commands::List { target, recursive, dirs, all, json } => {
            let paths: Vec<PathBuf> = if recursive {
                kit.list_files_recursive(&target)?
            } else if all {
                walk::list_dir(&target, Listing::All)?
            } else if dirs {
                walk::list_dir(&target, Listing::Directories)?
            } else {
                walk::list_dir(&target, Listing::Files)?
            };
            if json {
                let nodes = paths
                    .iter()
                    .map(|p| FileNode::query(p))
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                for path in paths {
                    println!("{}", path.display());
                }
            }
        }
        Commands::Mkdir { target } => {
            kit.new_directory(&target)?;
        }
        Commands::Touch { target } => {
            if !kit.new_file(&target)? {
                println!("{} already exists", target.display());
            }
        }
        Commands::Size { target } => {
            println!("{}", kit.file_size(&target)?);
        }
    }

    Ok(())
}
