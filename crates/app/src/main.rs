//! canvas-builder - build canvas scenes from request scripts

mod config;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use canvas_scene::CanvasService;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use script::ScriptRunner;

#[derive(Parser)]
#[command(name = "canvas-builder")]
#[command(about = "Build 2D canvas scenes from request scripts and export them as PDF")]
struct Cli {
    /// Configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script of requests
    Run {
        /// JSON array of requests
        script: PathBuf,

        /// Directory for exported documents and snapshots
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Exit successfully even if some requests failed
        #[arg(long)]
        allow_errors: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run {
            script,
            out_dir,
            allow_errors,
        } => {
            let source = tokio::fs::read_to_string(&script)
                .await
                .with_context(|| format!("failed to read {}", script.display()))?;

            tracing::info!("Running {}", script.display());
            let service = CanvasService::from_config(config)?;
            let summary = ScriptRunner::new(&service, out_dir)
                .run(&source, |response| println!("{}", response))
                .await?;

            tracing::info!(
                "Finished {} request(s), {} failed, {} file(s) written",
                summary.requests,
                summary.errors,
                summary.written.len()
            );
            script::check(&summary, allow_errors)?;
        }
    }

    Ok(())
}
