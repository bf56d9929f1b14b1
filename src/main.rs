use anyhow::{Context, Result};
use log::{error, info, warn};
use std::sync::Arc;
use store_client::audio_sink::{self, AudioHandler};
use store_client::config::{ClientConfig, ConfigError};
use store_client::display::{self, RenderHandler};
use store_client::input::{self, InputDispatcher};
use store_client::notification::sample_notification;
use store_client::{EventCategory, GrpcStore, StoreTransport, StreamConsumer};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        // --help, --version and usage errors
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => return Err(e).context("Invalid configuration"),
    };
    info!("🚀 Starting store client for {}", config.target());

    let store: Arc<dyn StoreTransport> =
        Arc::new(GrpcStore::connect(&config).context("Failed to set up the store client")?);

    match store
        .dispatch_action(sample_notification("Hello", "Rust store client connected."))
        .await
    {
        Ok(response) => info!("✅ Notification dispatched: {:?}", response),
        Err(e) => error!("❌ Failed to dispatch notification: {}", e),
    }

    let mut consumers = Vec::new();

    if let Some(sink) = display::sink_from_config(&config) {
        let handler = RenderHandler::new(config.display_width, config.display_height, sink);
        let consumer =
            StreamConsumer::new(store.clone()).with_reconnect_delay(config.reconnect_delay());
        consumers.push(consumer.start(config.render_category(), handler));
    }

    match audio_sink::sink_from_config(&config) {
        Ok(Some(sink)) => {
            let consumer =
                StreamConsumer::new(store.clone()).with_reconnect_delay(config.reconnect_delay());
            consumers.push(consumer.start(EventCategory::Audio, AudioHandler::new(sink)));
        }
        Ok(None) => info!("🔇 Audio disabled"),
        Err(e) => warn!("⚠️  Audio unavailable, skipping audio events: {}", e),
    }

    if config.no_input {
        println!("Press Ctrl+C to exit");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    } else {
        // Raw mode turns Ctrl+C into a key press, handled by the reader
        input::run_terminal_input(InputDispatcher::new(store.clone()))
            .await
            .context("Keyboard input failed")?;
    }

    info!("Shutting down...");
    for consumer in consumers {
        consumer.abort();
    }
    println!("\n👋 Goodbye!");
    Ok(())
}
