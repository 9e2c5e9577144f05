pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::resolver::RateResolver;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    /// Run the HTTP API
    Serve,
    /// Resolve the rate once and print it
    Rate,
}

/// Wires the configured store and provider chain into a resolver.
pub fn build_resolver(config: &AppConfig) -> Result<RateResolver> {
    let policy = config.cache.policy()?;
    let store = store::open_store(&config.cache)?;
    let providers = providers::from_config(&config.providers)?;
    debug!(providers = providers.len(), "Built provider chain");

    Ok(RateResolver::new(store, providers).with_policy(policy))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("bluerate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let resolver = build_resolver(&config)?;

    match command {
        AppCommand::Serve => server::serve(&config.server.bind, resolver).await,
        AppCommand::Rate => {
            let resolution = resolver.resolve().await;
            println!("{}", cli::rate::format_resolution(&resolution));
            Ok(())
        }
    }
}
