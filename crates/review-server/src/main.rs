//! Entry point for the review-server binary.

use std::sync::Arc;

use review_engine::ReviewAnalyzer;
use review_gateway::{GatewayConfig, gemini_gateway};
use review_server::{AppState, CorpusProvider, ServerConfig, build_app};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development reads a .env file when present
    dotenv::dotenv().ok();

    // Load configuration
    let config = ServerConfig::from_env()?;
    let gateway_config = GatewayConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    tracing::info!("Starting review-server");
    tracing::info!(
        port = config.port,
        log_level = %config.log_level,
        model = %gateway_config.model,
        dataset = %config.dataset_path.display(),
        boundary = %config.percentile_boundary,
        "Configuration loaded"
    );

    // Build the analysis pipeline
    let gateway = gemini_gateway(gateway_config)?;
    let analyzer = ReviewAnalyzer::new(gateway, config.analyzer_config());

    // Start loading the corpus in the background; requests wait on the same load
    let corpus = CorpusProvider::from_path(&config.dataset_path);
    let state = AppState::new(analyzer, corpus, config.clone());
    let warmup = Arc::clone(state.corpus());
    tokio::spawn(async move {
        if warmup.get().await.is_err() {
            tracing::warn!("Serving in degraded mode: corpus comparison disabled");
        }
    });

    // Build router with middleware
    let app = build_app(state)?;

    // Create listener
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
