//! Portfolio CLI - Bridge interface for the site build
//!
//! Commands: content, validate, build
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on validation failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use portfolio_core::{ContentError, ContentManifest, ContentStore, ENGINE_VERSION};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "Portfolio CLI - Content Validation Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the content manifest
    #[arg(short, long, default_value = "content/site.json")]
    content: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List the validated records
    Content,

    /// Validate the manifest and print the full report
    Validate {
        /// Inline manifest JSON instead of the content file
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Validate and emit the normalized, fingerprinted content artifact
    Build,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Content => {
            let store = match ContentStore::load(&cli.content) {
                Ok(store) => store,
                Err(e) => return report_error(&e),
            };

            let records: Vec<_> = store
                .projects()
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id,
                        "title": p.title,
                        "tags": p.tags,
                        "featured": p.featured,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&records).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Validate { payload } => {
            let manifest = match payload {
                Some(json) => match ContentManifest::from_json(&json) {
                    Ok(m) => m,
                    Err(e) => {
                        println!(r#"{{"valid": false, "error": "Invalid payload: {}"}}"#, e);
                        return ExitCode::FAILURE;
                    }
                },
                None => match load_manifest(&cli.content) {
                    Ok(m) => m,
                    Err(e) => return report_error(&e),
                },
            };

            let report = ContentStore::validate(&manifest);
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
            if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Build => match ContentStore::load(&cli.content) {
            Ok(store) => {
                let output = serde_json::json!({
                    "success": true,
                    "engineVersion": ENGINE_VERSION,
                    "content": store,
                });
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
                ExitCode::SUCCESS
            }
            Err(e) => {
                let output = serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string(&output).unwrap());
                exit_code(&e)
            }
        },
    }
}

fn load_manifest(path: &PathBuf) -> Result<ContentManifest, ContentError> {
    let json = std::fs::read_to_string(path)?;
    Ok(ContentManifest::from_json(&json)?)
}

fn report_error(error: &ContentError) -> ExitCode {
    eprintln!(r#"{{"error": "{}"}}"#, error);
    exit_code(error)
}

fn exit_code(error: &ContentError) -> ExitCode {
    match error {
        ContentError::ValidationFailed(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
