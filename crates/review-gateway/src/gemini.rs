//! Gemini `generateContent` client.
//!
//! One call per attempt: the prompt goes out as a single user turn with JSON
//! output requested, and the candidate text comes back verbatim for the
//! parser. When a model does not exist (404) the next model in the fallback
//! chain is tried within the same attempt.

use review_core::{AnalysisGateway, AnalysisRequest, GatewayError, RawResponse};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use tracing::{debug, warn};

use crate::config::GatewayConfig;

/// Longest upstream error detail kept in a [`GatewayError`].
const MAX_DETAIL_CHARS: usize = 200;

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GatewayConfig,
}

/// Outcome of one model call that did not produce a response.
#[derive(Debug, PartialEq, Eq)]
enum CallError {
    /// The model name is unknown upstream; try the next one.
    ModelNotFound(String),
    Failed(GatewayError),
}

impl GeminiClient {
    /// Builds a client with the configured per-call timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn generate(&self, request: &AnalysisRequest) -> Result<RawResponse, GatewayError> {
        let body = request_body(request);
        let mut last_missing = None;

        for model in self.config.model_chain() {
            match self.call_model(model, &body).await {
                Ok(text) => return Ok(RawResponse::new(text, model)),
                Err(CallError::ModelNotFound(detail)) => {
                    warn!(model, "model not available, trying next in chain");
                    last_missing = Some(detail);
                }
                Err(CallError::Failed(err)) => return Err(err),
            }
        }

        Err(GatewayError::Unavailable(format!(
            "no configured model is available: {}",
            last_missing.unwrap_or_default()
        )))
    }

    async fn call_model(&self, model: &str, body: &Value) -> Result<String, CallError> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, model);
        debug!(model, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| CallError::Failed(transport_error(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CallError::Failed(transport_error(e)))?;

        if status.is_success() {
            debug!(model, bytes = text.len(), "received generateContent response");
            return Ok(candidate_text(&text));
        }

        Err(classify_status(status, &text))
    }
}

impl AnalysisGateway for GeminiClient {
    fn send(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, GatewayError>> + Send {
        self.generate(request)
    }
}

// ============================================================================
// Wire format
// ============================================================================

fn request_body(request: &AnalysisRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt() }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseJsonSchema": request.response_schema(),
            "temperature": 0.0
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Text of the first candidate, or the whole body when it is not a
/// recognizable envelope.
fn candidate_text(body: &str) -> String {
    let text = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|envelope| envelope.candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    text.unwrap_or_else(|| body.to_string())
}

fn classify_status(status: StatusCode, body: &str) -> CallError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body.trim(), MAX_DETAIL_CHARS));
    match status {
        StatusCode::NOT_FOUND => CallError::ModelNotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => CallError::Failed(GatewayError::RateLimited(detail)),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CallError::Failed(GatewayError::Timeout(detail))
        }
        _ => CallError::Failed(GatewayError::Unavailable(detail)),
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Unavailable(err.to_string())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::{DEFAULT_MAX_CHARS, ReviewText, SCHEMA_VERSION};

    fn request() -> AnalysisRequest {
        let text = ReviewText::new("Great fit", DEFAULT_MAX_CHARS).unwrap();
        AnalysisRequest::new(text, SCHEMA_VERSION, "PROMPT".to_string(), json!({"type": "object"}))
    }

    #[test]
    fn body_carries_prompt_and_json_mode() {
        let body = request_body(&request());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "PROMPT");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseJsonSchema"]["type"], "object");
    }

    #[test]
    fn candidate_parts_are_joined() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(candidate_text(body), r#"{"a":1}"#);
    }

    #[test]
    fn unknown_envelope_is_passed_through() {
        assert_eq!(candidate_text("plain words"), "plain words");
        let blocked = r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(candidate_text(blocked), blocked);
    }

    #[test]
    fn statuses_map_to_gateway_errors() {
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "quota"),
            CallError::Failed(GatewayError::RateLimited(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::GATEWAY_TIMEOUT, ""),
            CallError::Failed(GatewayError::Timeout(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "bad key"),
            CallError::Failed(GatewayError::Unavailable(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "no such model"),
            CallError::ModelNotFound(_)
        ));
    }

    #[test]
    fn long_details_are_truncated() {
        let body = "x".repeat(1000);
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            CallError::Failed(GatewayError::Unavailable(detail)) => {
                assert!(detail.len() < 220);
                assert!(detail.ends_with("..."));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
