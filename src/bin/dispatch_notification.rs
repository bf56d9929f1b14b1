//! Dispatch the sample notification once and print the store's response.

use anyhow::{Context, Result};
use store_client::config::{ClientConfig, ConfigError};
use store_client::notification::sample_notification;
use store_client::{GrpcStore, StoreTransport};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => return Err(e).context("Invalid configuration"),
    };

    let store = GrpcStore::connect(&config).context("Failed to set up the store client")?;
    let action = sample_notification("Hello", "Rust store client connected.");

    match store.dispatch_action(action).await {
        Ok(response) => {
            println!("✅ {:?}", response);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ DispatchAction to {} failed: {}", config.target(), e);
            Err(e.into())
        }
    }
}
