//! Command implementations for the review CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod analyze;
pub mod corpus;
pub mod health;

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Default client-side timeout in seconds. Exceeds the server's worst case
/// with every retry and fallback model exhausted.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}, {code}): {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },
}

/// Build the HTTP client with a whole-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Send a request and decode either the body or the server's error envelope.
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);
    Err(CliError::Server {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Extract `error.code` and `error.message`, falling back to the raw body.
fn parse_error_body(body: &str) -> (String, String) {
    let json = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = json.as_ref().and_then(|v| v.get("error"));
    let field = |name: &str| {
        error
            .and_then(|e| e.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    (
        field("code").unwrap_or_else(|| "UNKNOWN".to_string()),
        field("message").unwrap_or_else(|| body.to_string()),
    )
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Horizontal bar for a value in [-1, 1] (or [0, 1]), colored by sign.
pub fn bar(value: f64, width: usize) -> String {
    let filled = (value.abs().min(1.0) * width as f64).round() as usize;
    let bar = "#".repeat(filled);
    if value < 0.0 {
        bar.red().to_string()
    } else if value > 0.0 {
        bar.green().to_string()
    } else {
        bar
    }
}

/// Format a share as a percentage.
pub fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}
