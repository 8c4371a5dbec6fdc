//! HTTP server for the compensation rules engine.

use std::env;
use std::error::Error;

use comp_engine::api::{AppState, create_router};
use comp_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the configuration directory.
const CONFIG_DIR_VAR: &str = "COMP_ENGINE_CONFIG";
const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_dir = env::var(CONFIG_DIR_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;

    // RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.settings().log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let bind_address = config.settings().bind_address.clone();
    info!(
        config_dir = %config_dir,
        name = %config.settings().name,
        version = %config.settings().version,
        rule_sets = config.rule_set_names().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Compensation engine listening");
    axum::serve(listener, app).await?;
    Ok(())
}
