//! Gateway configuration from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FALLBACK_MODELS: &str = "gemini-2.0-flash,gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Upper bound on `GEMINI_MAX_RETRIES`.
pub const MAX_RETRIES: u32 = 2;

/// Language service credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the request header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: ApiKey,
    /// Model tried first.
    pub model: String,
    /// Models tried in order when the previous one does not exist.
    pub fallback_models: Vec<String>,
    pub base_url: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
}

impl GatewayConfig {
    /// Configuration with defaults for everything but the key.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            fallback_models: split_models(DEFAULT_FALLBACK_MODELS),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `GEMINI_API_KEY`: API key for the Gemini API
    ///
    /// Optional:
    /// - `GEMINI_MODEL`: Primary model (default: "gemini-2.5-flash")
    /// - `GEMINI_FALLBACK_MODELS`: Comma-separated fallback chain
    /// - `GEMINI_BASE_URL`: API root (default: the public v1beta endpoint)
    /// - `GEMINI_TIMEOUT_SECS`: Per-call timeout (default: 15)
    /// - `GEMINI_MAX_RETRIES`: Transient-failure retries (default: 2, at most 2)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let mut config = Self::new(ApiKey::new(api_key.trim()));

        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(models) = lookup("GEMINI_FALLBACK_MODELS") {
            config.fallback_models = split_models(&models);
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = parse_var("GEMINI_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "GEMINI_TIMEOUT_SECS".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = lookup("GEMINI_MAX_RETRIES") {
            let retries: u32 = parse_var("GEMINI_MAX_RETRIES", &retries)?;
            if retries > MAX_RETRIES {
                return Err(ConfigError::InvalidValue {
                    name: "GEMINI_MAX_RETRIES".to_string(),
                    reason: format!("must be at most {MAX_RETRIES}"),
                });
            }
            config.max_retries = retries;
        }

        Ok(config)
    }

    /// Primary model followed by the fallback chain, without duplicates.
    pub fn model_chain(&self) -> Vec<&str> {
        let mut chain: Vec<&str> = vec![self.model.as_str()];
        for model in &self.fallback_models {
            if !chain.contains(&model.as_str()) {
                chain.push(model);
            }
        }
        chain
    }
}

fn split_models(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(String::from)
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
