//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use review_core::{DEFAULT_MAX_CHARS, PercentileBoundary};
use review_engine::AnalyzerConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Reference corpus CSV.
    pub dataset_path: PathBuf,
    /// Longer reviews are truncated before analysis.
    pub max_review_chars: usize,
    pub percentile_boundary: PercentileBoundary,
    /// Repeat the upstream call once when it returns no usable JSON.
    pub retry_malformed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            dataset_path: PathBuf::from("Amazon_Reviews.csv"),
            max_review_chars: DEFAULT_MAX_CHARS,
            percentile_boundary: PercentileBoundary::Inclusive,
            retry_malformed: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `DATASET_PATH`: Corpus CSV (default: "Amazon_Reviews.csv")
    /// - `MAX_REVIEW_CHARS`: Review length cap (default: 5000)
    /// - `PERCENTILE_BOUNDARY`: "inclusive" or "exclusive" (default: inclusive)
    /// - `RETRY_MALFORMED`: Retry unparseable responses once (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(port) => port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("'{port}' is not a port number"),
            })?,
            None => defaults.port,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_allowed_origins);

        let dataset_path = lookup("DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.dataset_path);

        let max_review_chars = match lookup("MAX_REVIEW_CHARS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(chars) if chars > 0 => chars,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "MAX_REVIEW_CHARS".to_string(),
                        reason: format!("'{value}' is not a positive integer"),
                    });
                }
            },
            None => defaults.max_review_chars,
        };

        let percentile_boundary = match lookup("PERCENTILE_BOUNDARY") {
            Some(value) => value
                .parse::<PercentileBoundary>()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: "PERCENTILE_BOUNDARY".to_string(),
                    reason,
                })?,
            None => defaults.percentile_boundary,
        };

        let retry_malformed = match lookup("RETRY_MALFORMED") {
            Some(value) => parse_bool("RETRY_MALFORMED", &value)?,
            None => defaults.retry_malformed,
        };

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            dataset_path,
            max_review_chars,
            percentile_boundary,
            retry_malformed,
        })
    }

    /// Pipeline settings derived from this configuration.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            max_review_chars: self.max_review_chars,
            percentile_boundary: self.percentile_boundary,
            retry_malformed: self.retry_malformed,
        }
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    /// Gateway settings were rejected.
    #[error(transparent)]
    Gateway(#[from] review_gateway::ConfigError),
}
