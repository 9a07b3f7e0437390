//! Funicular CLI - Export a GitHub classic project board to CSV
//!
//! Authenticates as a GitHub App installation and writes one row per issue
//! found on the board, grouped by project column.

mod export;

use std::path::PathBuf;

use clap::Parser;
use funicular_core::{Config, Overrides};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Export GitHub issues to CSV
#[derive(Parser, Debug)]
#[command(name = "funicular")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The id for the GitHub App used for authentication
    #[arg(long)]
    app_id: Option<u64>,

    /// The id for the installation of the GitHub App used for authentication
    #[arg(long)]
    installation_id: Option<u64>,

    /// The file with the GitHub App's private key
    #[arg(long)]
    private_key_file: Option<PathBuf>,

    /// The path to the output file. It will be overwritten. Defaults to stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// The number of the project inside your GitHub org
    #[arg(long)]
    project: Option<u64>,

    /// The name of the organization housing the GitHub project
    #[arg(long)]
    organization: Option<String>,

    /// Config file (defaults to ~/.config/funicular/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            app_id: self.app_id,
            installation_id: self.installation_id,
            private_key_file: self.private_key_file.clone(),
            output_file: self.output_file.clone(),
            organization: self.organization.clone(),
            project: self.project,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout may be carrying the CSV
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    tracing::debug!(arguments = ?cli, "args.parsed");

    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())?;
    let settings = config.settings()?;

    let summary = export::run(&settings).await?;
    tracing::info!(
        columns = summary.columns,
        rows = summary.rows,
        "Export complete"
    );

    Ok(())
}
