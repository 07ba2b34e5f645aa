//! Example application showing the two service shapes girder scaffolds:
//! an HTTP service (`serve`) and a queue worker (`read`).

mod read;
mod routes;
mod serve;

use clap::{Parser, Subcommand};
use girder_core::Settings;
use girder_observability::init_logger;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "girder-demo", version, about = "Example service built on girder")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "girder.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the example HTTP service
    Serve,
    /// Run the example queue worker
    Read,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_found = cli.config.exists();
    let settings = if config_found {
        Settings::load(&cli.config)?
    } else {
        Settings::default()
    };
    init_logger(&settings.app, &settings.logging)?;
    if config_found {
        info!(path = %cli.config.display(), "Loaded config file");
    } else {
        info!("No config file found, using defaults");
    }

    match cli.command {
        Command::Serve => serve::run(settings).await,
        Command::Read => read::run(settings).await,
    }
}
