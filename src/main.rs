//! vnotes - Personal voice-memo recorder
//!
//! Entry point for the vnotes CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vnotes::cli::{Cli, Commands};
use vnotes::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Completions { shell } => {
            vnotes::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Record { name } => {
                    vnotes::cli::commands::record(&settings, name).await?;
                }
                Commands::List { limit, search } => {
                    vnotes::cli::commands::list(&settings, limit, search).await?;
                }
                Commands::Play { id, from, speed } => {
                    vnotes::cli::commands::play(&settings, &id, from, speed).await?;
                }
                Commands::Rename { id, name } => {
                    vnotes::cli::commands::rename(&settings, &id, &name).await?;
                }
                Commands::Delete { id } => {
                    vnotes::cli::commands::delete(&settings, &id).await?;
                }
                Commands::Export { open } => {
                    vnotes::cli::commands::export(&settings, open).await?;
                }
                Commands::Import { path } => {
                    vnotes::cli::commands::import(&settings, &path).await?;
                }
                Commands::Settings(settings_cmd) => {
                    vnotes::cli::commands::settings_command(&settings, settings_cmd).await?;
                }
                Commands::Config(config_cmd) => {
                    vnotes::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
