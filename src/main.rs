use anyhow::Result;
use clap::{Parser, Subcommand};
use gamesoc_core::{config::Config, error, migration, server, telemetry};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gamesoc-core", version, about = "GameSoc back office service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database if needed and apply migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let prometheus_handle = telemetry::init(&config.telemetry);
    error::set_expose_internal_details(config.is_development());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting GameSoc Core");
            server::run(config, prometheus_handle).await
        }
        Command::Migrate => migration::run_migrations(&config).await,
    }
}
