use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facematch_core::FaceReportExtractor;
use facematch_service::{Config, MatchOutcome, Services};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "facematch", about = "Face identification gallery CLI")]
struct Cli {
    /// Gallery file (overrides FACEMATCH_GALLERY_PATH)
    #[arg(long, global = true)]
    gallery: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a new identity from a face report
    Enroll {
        /// Unique name for this identity
        name: String,
        /// Face report JSON written by the extractor ({"faces": [[...]]})
        report: PathBuf,
    },
    /// Identify the face in a face report
    Identify {
        /// Face report JSON written by the extractor
        report: PathBuf,
    },
    /// List enrolled identities
    List,
    /// Delete an enrolled identity
    Delete {
        /// Name of the identity to delete
        name: String,
    },
    /// Show gallery status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.gallery {
        config.gallery_path = path;
    }
    tracing::debug!(?config, "configuration loaded");

    let services = Services::open(&config, Arc::new(FaceReportExtractor))
        .with_context(|| format!("opening gallery {}", config.gallery_path.display()))?;

    let output = match cli.command {
        Commands::Enroll { name, report } => {
            let bytes = read_report(&report)?;
            let record = services
                .enrollment
                .enroll(&name, &bytes)
                .with_context(|| format!("enrolling {name:?}"))?;
            json!({
                "enrolled": record.name,
                "dimension": record.descriptor.dim(),
                "enrolled_at": record.enrolled_at,
            })
        }
        Commands::Identify { report } => {
            let bytes = read_report(&report)?;
            let outcome = services.identification.identify(&bytes).context("identifying")?;
            // An empty gallery reports an infinite distance; JSON has no infinity.
            let distance = Some(outcome.distance()).filter(|d| d.is_finite());
            match outcome {
                MatchOutcome::Identified { name, .. } => {
                    json!({ "identified": true, "name": name, "distance": distance })
                }
                MatchOutcome::Unidentified { .. } => {
                    json!({ "identified": false, "name": null, "distance": distance })
                }
            }
        }
        Commands::List => json!({ "identities": services.administration.list() }),
        Commands::Delete { name } => {
            services
                .administration
                .delete(&name)
                .with_context(|| format!("deleting {name:?}"))?;
            json!({ "deleted": name })
        }
        Commands::Status => serde_json::to_value(services.administration.status())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_report(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading face report {}", path.display()))
}
