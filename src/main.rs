//! Lenstutor - Camera-first AI teaching assistant
//!
//! Main entry point for the Lenstutor CLI.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lenstutor::cli::{Cli, Commands};
use lenstutor::commands;
use lenstutor::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Mirror a CLI session-file override into the environment so
    // SessionStore::new() honors it regardless of construction site.
    if let Some(session_file) = &cli.session_file {
        std::env::set_var("LENSTUTOR_SESSION_FILE", session_file);
        tracing::info!("Using session file override from CLI: {}", session_file);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Solve { mode, image, speak } => {
            tracing::info!("Starting solve command: mode={}", mode);
            commands::solve::run_solve(config, mode, image, speak).await?;
            Ok(())
        }
        Commands::Ask { query, speak } => {
            tracing::info!("Starting ask command");
            commands::ask::run_ask(config, query, speak).await?;
            Ok(())
        }
        Commands::Chat { speak } => {
            tracing::info!("Starting interactive session");
            commands::chat::run_chat(config, speak).await?;
            Ok(())
        }
        Commands::History { clear } => {
            commands::history::run_history(&config, clear)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lenstutor=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
