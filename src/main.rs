use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use std::process::ExitCode;

use notehub::{cli, cli::args::Args, config};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Log setup
    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load config: {e}");
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?cfg, "Loaded NoteHub client config");

    match cli::run(args, cfg).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
