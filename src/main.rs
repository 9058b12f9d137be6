//! influencer-hub - interactive console

use anyhow::Result;
use std::path::Path;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use influencer_hub::{
    app::App,
    config::{AiConfig, Config},
    console::Console,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "influencer_hub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting influencer-hub...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let app = App::start(config, AiConfig::credential_from_env()).await?;
    tracing::info!("Ready; language {}", app.store().language());

    let mut console = Console::new(app);
    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    tracing::info!("Bye");
    Ok(())
}
