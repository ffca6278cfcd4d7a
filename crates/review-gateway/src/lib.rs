//! review-gateway: outbound language-service access
//!
//! This crate provides:
//! - [`GeminiClient`], an analysis gateway over the Gemini REST API
//! - [`RetryingGateway`], exponential backoff for transient failures
//! - [`GatewayConfig`] loaded from the environment, with a redacted [`ApiKey`]
//!
//! Owned by: agent-gateway

pub mod config;
pub mod gemini;
pub mod retry;

pub use config::{ApiKey, ConfigError, GatewayConfig};
pub use gemini::GeminiClient;
pub use retry::{RetryPolicy, RetryingGateway};

use review_core::GatewayError;

/// Gemini client wrapped in the retry policy from its configuration.
pub type GeminiGateway = RetryingGateway<GeminiClient>;

/// Builds the production gateway from `config`.
pub fn gemini_gateway(config: GatewayConfig) -> Result<GeminiGateway, GatewayError> {
    let policy = RetryPolicy::with_max_retries(config.max_retries);
    let client = GeminiClient::new(config)?;
    Ok(RetryingGateway::new(client, policy))
}
