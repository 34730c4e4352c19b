//! procmon-pilot: A terminal UI for browsing live process trees of monitored hosts

use clap::Parser;
use color_eyre::Result;
use procmon_pilot_tui::{App, Settings};
use procmon_rs::ServerEntry;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// procmon-pilot: Terminal UI for a process monitor server
#[derive(Parser, Debug)]
#[command(name = "procmon-pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server entry to use (from the config file)
    #[arg(short, long)]
    server: Option<String>,

    /// Server base URL, overriding the config file
    #[arg(short, long)]
    url: Option<String>,

    /// Path to the config file (default: ~/.procmon/config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between automatic refreshes
    #[arg(short, long, default_value = "30")]
    refresh_interval: u64,

    /// Start with auto-refresh turned off
    #[arg(long)]
    no_auto_refresh: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: /tmp/procmon-pilot.log)
    #[arg(long, default_value = "/tmp/procmon-pilot.log")]
    log_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;

    // Log to a file; stdout belongs to the TUI
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let log_file = File::create(&cli.log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    tracing::info!("Starting procmon-pilot");

    let server = ServerEntry::resolve(
        cli.url.as_deref(),
        cli.server.as_deref(),
        cli.config.as_deref(),
    )?;
    tracing::info!("Using server {}", server.base_url());

    let settings = Settings {
        server,
        refresh_interval: Duration::from_secs(cli.refresh_interval),
        auto_refresh: !cli.no_auto_refresh,
    };

    let mut app = App::new(settings)?;
    app.run().await?;

    tracing::info!("Goodbye!");
    Ok(())
}
