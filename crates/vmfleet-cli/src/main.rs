//! vmfleet CLI
//!
//! Start, stop, query and list the VMs of a fleet through the management API

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Credentials may live in a .env file; load it before clap reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load_default(cli.global.config.as_deref())?;

    init_tracing(cli.global.verbose, &config.log.level);

    let summary = commands::run(cli, config).await?;
    eprintln!("{summary}");

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v` and the configured level
fn init_tracing(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
