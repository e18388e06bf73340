//! DropZone CLI: drive uploads against the configured record store.
//!
//! Backend and limits come from the environment (see `Config::from_env`).
//! With the default in-memory store, records live only as long as the process.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dropzone_cli::{collect_candidates, print_file_details, print_file_table, progress_bar};
use dropzone_core::format::format_file_size;
use dropzone_core::{AppError, Config, ErrorMetadata, FileId};
use dropzone_infra::{init_telemetry, shutdown_telemetry, ErrorResponse, LogFormat};
use dropzone_services::{create_store, UploadEvent, UploadService};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser)]
#[command(name = "dropzone", about = "Upload files and browse the file gallery")]
struct Cli {
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and upload files, following their progress until done
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List uploaded files, newest first
    List {
        /// Include records that are still uploading or failed
        #[arg(long)]
        all: bool,
    },
    /// Show a single file record
    Get {
        /// Record id
        id: FileId,
    },
    /// Delete a file record
    Delete {
        /// Record id
        id: FileId,
    },
    /// Count and total size of uploaded files
    Stats,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_telemetry(LogFormat::from_json_flag(config.json_logs()), None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let store = create_store(&config)
        .await
        .context("Failed to create record store")?;
    let service = UploadService::from_config(store, &config);

    let json = cli.json;
    let result = run(cli.command, &service, json).await;
    service.shutdown().await;
    shutdown_telemetry().await;

    match result {
        Ok(()) => Ok(()),
        Err(CommandError::App(err)) => {
            let report = ErrorResponse::from_app_error(&err, !config.is_production());
            if json {
                eprintln!("{}", report.to_json());
            } else {
                eprintln!("Error: {}", report);
            }
            std::process::exit(1);
        }
        Err(CommandError::Other(err)) => Err(err),
    }
}

enum CommandError {
    App(AppError),
    Other(anyhow::Error),
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        CommandError::App(err)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::Other(err)
    }
}

async fn run(command: Commands, service: &UploadService, json: bool) -> Result<(), CommandError> {
    match command {
        Commands::Upload { paths } => upload(service, paths, json).await?,
        Commands::List { all } => {
            let entries = if all {
                service.store().list().await.map_err(AppError::from)?
            } else {
                service.refresh_gallery().await?
            };
            if json {
                print_json(&entries)?;
            } else {
                print_file_table(&entries);
            }
        }
        Commands::Get { id } => {
            let entry = service.get(id).await?;
            if json {
                print_json(&entry)?;
            } else {
                print_file_details(&entry);
            }
        }
        Commands::Delete { id } => {
            service.delete(id).await?;
            if json {
                print_json(&serde_json::json!({ "success": true, "id": id }))?;
            } else {
                println!("Deleted file {}", id);
            }
        }
        Commands::Stats => {
            service.refresh_gallery().await?;
            let stats = service.gallery_stats().await;
            if json {
                print_json(&stats)?;
            } else {
                println!("{}", stats);
            }
        }
    }
    Ok(())
}

async fn upload(
    service: &UploadService,
    paths: Vec<PathBuf>,
    json: bool,
) -> Result<(), CommandError> {
    let (candidates, unreadable) = collect_candidates(&paths, service.validator());
    for (path, error) in &unreadable {
        tracing::warn!(path = %path.display(), error = %error, "Skipping unreadable file");
        eprintln!("✗ {}: {:#}", path.display(), error);
    }

    let mut events = service.subscribe();
    let report = service.intake(candidates).await;

    for rejection in report.rejected.iter().cloned() {
        eprintln!("✗ {}", AppError::from(rejection).client_message());
    }
    for failure in &report.failed {
        eprintln!("✗ {}: {}", failure.name, failure.error);
    }

    let names: HashMap<FileId, String> = report
        .accepted
        .iter()
        .map(|e| (e.id, e.name.clone()))
        .collect();
    let mut pending: HashSet<FileId> = names.keys().copied().collect();
    let mut completed = Vec::new();

    let follow = async {
        while !pending.is_empty() {
            match events.recv().await {
                Ok(UploadEvent::Progress { id, percent }) => {
                    if !json {
                        let name = names.get(&id).map(String::as_str).unwrap_or("?");
                        println!("{} {}", progress_bar(percent), name);
                    }
                }
                Ok(UploadEvent::Completed(entry)) => {
                    if pending.remove(&entry.id) && !json {
                        println!(
                            "✓ {} ({}) uploaded as #{}",
                            entry.name,
                            format_file_size(entry.size),
                            entry.id
                        );
                    }
                    completed.push(entry);
                }
                Ok(UploadEvent::Failed { id, reason }) => {
                    if pending.remove(&id) {
                        let name = names.get(&id).map(String::as_str).unwrap_or("?");
                        eprintln!("✗ {}: {}", name, reason);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Progress output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    tokio::select! {
        _ = follow => {}
        _ = tokio::signal::ctrl_c() => {
            let stopped = service.shutdown().await;
            eprintln!("Interrupted, cancelled {} upload(s)", stopped);
        }
    }

    let summary = service.queue_summary().await;
    if json {
        print_json(&completed)?;
    } else if summary.total() > 0 {
        println!("{}", summary);
    }
    Ok(())
}
