//! review-server: HTTP API server for the review analyzer
//!
//! This crate provides:
//! - REST API endpoints (analyze, corpus statistics, health)
//! - One-time corpus loading with a degraded mode when the dataset is missing
//! - JSON error responses mapped from the analysis error taxonomy
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//!
//! Handlers are generic over the language-service gateway so tests can run
//! the full stack against a scripted gateway.
//!
//! Owned by: agent-server

pub mod config;
pub mod corpus;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use http::HeaderValue;
use review_core::AnalysisGateway;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use corpus::{CorpusProvider, CorpusStatus};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use review_core;
pub use review_engine;
pub use review_gateway;

/// Router with the full middleware stack.
///
/// # Errors
///
/// [`ConfigError::InvalidValue`] when a configured CORS origin is not a
/// valid header value.
pub fn build_app<G: AnalysisGateway + 'static>(state: AppState<G>) -> Result<Router, ConfigError> {
    let cors = build_cors_layer(&state.config().cors_allowed_origins)?;

    Ok(routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Build CORS layer from configuration.
pub fn build_cors_layer(allowed_origins: &str) -> Result<CorsLayer, ConfigError> {
    if allowed_origins.trim() == "*" {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    // Parse comma-separated origins
    let origins = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("'{origin}': {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_wildcard_and_lists() {
        assert!(build_cors_layer("*").is_ok());
        assert!(build_cors_layer("http://localhost:8501, https://reviews.example").is_ok());
    }

    #[test]
    fn cors_rejects_invalid_origin() {
        let err = build_cors_layer("http://ok.example,bad\norigin").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
