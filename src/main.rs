use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use depresso_assist::{init_logging, load_config, render_transcript, App, UploadOutcome};

/// Analyse photos and videos, then show the companion chat
#[derive(Parser, Debug)]
#[command(name = "depresso-assist")]
#[command(version)]
struct Cli {
    /// Config file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upload files in chunks; analysis then finishes on the backend
    #[arg(long)]
    chunked: bool,

    /// Images and videos to analyse
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    tracing::info!(
        "Starting depressoAssist v{} (built {})",
        depresso_assist::VERSION,
        depresso_assist::BUILD_DATE
    );

    let config = Arc::new(load_config(cli.config.as_deref())?);
    let mut app = App::connect(config, cli.chunked);

    let queued = app.queue_paths(&cli.files).await?;
    if queued < cli.files.len() {
        tracing::warn!("{} file(s) skipped: not an image or video", cli.files.len() - queued);
    }

    match app.analyze().await {
        UploadOutcome::Idle => tracing::info!("Nothing to analyse"),
        UploadOutcome::Failed(message) => eprintln!("{}", message),
        UploadOutcome::Published(event) => tracing::info!("Published {}", event.description()),
    }

    println!("{}", render_transcript(&app.chat().messages()));
    Ok(())
}
