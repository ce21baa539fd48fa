use clap::Parser;
use tracing::warn;

use neuralcord_core::NeuralcordConfig;

mod cli;
mod commands;
mod input;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // load config: --config > NEURALCORD_CONFIG env > ~/.neuralcord/neuralcord.toml
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| std::env::var("NEURALCORD_CONFIG").ok());
    let config_result = NeuralcordConfig::load(config_path.as_deref());

    let default_filter = config_result
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| neuralcord_core::LoggingConfig::default().filter);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = config_result.unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        NeuralcordConfig::default()
    });

    match cli.command {
        Commands::Evaluate(args) => commands::evaluate(&config, args).await,
        Commands::Models => commands::models(&config).await,
        Commands::SetModel(args) => commands::set_model(&config, args).await,
        Commands::Chat(args) => commands::chat(&config, args).await,
    }
}
