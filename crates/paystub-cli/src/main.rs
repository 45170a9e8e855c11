use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use paystub_client::{Credentials, Session};
use paystub_core::config::PortalConfig;
use paystub_core::navigate::Navigator;
use paystub_core::sink::DirStore;

#[derive(Parser)]
#[command(name = "paystub", version, about = "Download pay statements from the iPay portal")]
struct Cli {
    /// Portal username
    username: String,

    /// Portal password (prompted if not provided)
    #[arg(short, long, env = "PAYSTUB_PASSWORD")]
    password: Option<String>,

    /// Directory where statement PDFs are written
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("paystub=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // fail fast before prompting or touching the network
    let store = DirStore::new(&cli.out_dir).map_err(|e| anyhow::anyhow!(e))?;

    let password = match cli.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let config = PortalConfig::default();
    let session = Session::connect(
        &config,
        Credentials {
            username: cli.username,
            password,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    let navigator = Navigator::new(session, store, config);
    let report = navigator.run().await.map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        downloaded = report.downloaded,
        skipped = report.skipped,
        "run complete"
    );

    Ok(())
}
