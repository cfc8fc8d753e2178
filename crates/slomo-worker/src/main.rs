//! Slow-mo pipeline worker binary.
//!
//! Consumes one storage-event JSON document (path argument, or stdin when
//! no argument is given), runs the pipeline once, and exits non-zero on
//! failure.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use slomo_inference::EndpointClient;
use slomo_models::StorageEvent;
use slomo_storage::S3Client;
use slomo_worker::{Pipeline, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("slomo=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting slomo-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let event = match read_event().await {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to read storage event: {}", e);
            std::process::exit(1);
        }
    };

    let store = match S3Client::from_env().await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create storage client: {}", e);
            std::process::exit(1);
        }
    };

    let endpoint = match EndpointClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create endpoint client: {}", e);
            std::process::exit(1);
        }
    };

    // A shutdown signal cancels the orchestrator's wait between polls
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        cancel_tx.send(true).ok();
    });

    let pipeline =
        Pipeline::new(config, Arc::new(store), Arc::new(endpoint)).with_cancel(cancel_rx);

    match pipeline.run(&event).await {
        Ok(result) => info!(result = %result, "Pipeline complete"),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read the triggering storage event from the first argument's path, or
/// from stdin when no argument is given.
async fn read_event() -> anyhow::Result<StorageEvent> {
    use tokio::io::AsyncReadExt;

    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read(path).await?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };

    Ok(serde_json::from_slice(&raw)?)
}
