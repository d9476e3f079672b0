use std::sync::Arc;

use clap::Parser;
use geoscout_core::gemini::{GeminiClient, GeminiConfig};
use geoscout_core::ScoutConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use geoscout_server::http;
use geoscout_server::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "geoscout.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = match ScoutConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let gemini = GeminiConfig {
        timeout_seconds: config.gemini.timeout_seconds,
        ..GeminiConfig::new(
            None,
            config.gemini.search_model.clone(),
            config.gemini.aux_model.clone(),
        )
    };

    let client = match GeminiClient::new(gemini) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create Gemini client: {}", e);
            eprintln!("Hint: set GEMINI_API_KEY in the environment or a .env file.");
            std::process::exit(1);
        }
    };

    let session = Arc::new(Session::new(config, client)?);

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(session, tx.subscribe()).await?;

    Ok(())
}
