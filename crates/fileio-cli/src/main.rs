//! fileio CLI — command-line client for the file.io service.
//!
//! Set FILEIO_BASE_URL to target another endpoint. Registry state is
//! carried between invocations through a state file (--state, default
//! exported.json); mutating commands write it back.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fileio_client::{FileIo, UploadRequest};
use fileio_cli::init_tracing;
use fileio_core::{persist, ExportFormat, RecordFilter};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fileio", about = "file.io command-line client")]
struct Cli {
    /// Registry state file carried between invocations
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file or a text blob
    Upload {
        /// Path to the file to upload
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Literal text to upload instead of a file
        #[arg(long)]
        text: Option<String>,
        /// Filename for text payloads (names the download destination)
        #[arg(long, requires = "text")]
        filename: Option<String>,
        /// Label for grouping/filtering uploads
        #[arg(long)]
        tag: Option<String>,
        /// Retention duration (e.g. 1w, 14 days); service default when omitted
        #[arg(long)]
        expiry: Option<String>,
    },
    /// Download matching uploads to their recorded local paths
    Download {
        /// Remote key to match
        #[arg(long)]
        key: Option<String>,
        /// Tag to match
        #[arg(long)]
        tag: Option<String>,
    },
    /// List tracked uploads, optionally filtered by key and/or tag
    Show {
        /// Remote key to match
        #[arg(long)]
        key: Option<String>,
        /// Tag to match
        #[arg(long)]
        tag: Option<String>,
    },
    /// Export the registry to a file
    Export {
        /// Output path; the format's well-known filename when omitted
        path: Option<PathBuf>,
        /// Output format: json or cbor
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Load records from a file into the registry
    Load {
        /// File previously written by export
        path: PathBuf,
        /// Format fallback when the extension is not a format token
        #[arg(long)]
        format: Option<ExportFormat>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Write the registry back to the state file, in the same format a later
/// invocation will infer when loading it.
fn save_state(fileio: &FileIo, state: &Path) -> anyhow::Result<()> {
    let format = persist::resolve_load_format(state, None);
    persist::export_registry(fileio.registry(), state, format).context("Save registry state")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut fileio = FileIo::from_env().context("Create file.io client")?;

    let state = cli
        .state
        .unwrap_or_else(|| PathBuf::from(ExportFormat::Json.default_filename()));
    if state.exists() {
        fileio
            .load(&state, None)
            .with_context(|| format!("Load registry state from {}", state.display()))?;
    }

    match cli.command {
        Commands::Upload {
            file,
            text,
            filename,
            tag,
            expiry,
        } => {
            let request = UploadRequest {
                file,
                text,
                filename,
                tag,
                expiry,
            };
            let record = fileio.upload(&request).context("Upload failed")?;
            print_json(&record)?;
            save_state(&fileio, &state)?;
        }
        Commands::Download { key, tag } => {
            let report = fileio.download(&RecordFilter { key, tag });
            for record in &report.downloaded {
                println!("downloaded {} -> {}", record.key, record.path.display());
            }
            for key in &report.skipped_expired {
                println!("skipped {key} (expired)");
            }
            for failure in &report.failures {
                eprintln!("failed {}: {}", failure.key, failure.error);
            }
            save_state(&fileio, &state)?;
            if !report.is_success() {
                anyhow::bail!("{} download(s) failed", report.failures.len());
            }
        }
        Commands::Show { key, tag } => {
            let records = fileio.show_uploads(&RecordFilter { key, tag });
            print_json(&records)?;
        }
        Commands::Export { path, format } => {
            let written = fileio
                .export(path.as_deref(), format)
                .context("Export registry")?;
            println!("{}", written.display());
        }
        Commands::Load { path, format } => {
            let count = fileio
                .load(&path, format)
                .with_context(|| format!("Load registry from {}", path.display()))?;
            println!("loaded {count} record(s)");
            save_state(&fileio, &state)?;
        }
    }

    Ok(())
}
