//! Integration tests for the Gemini client against a local fake API.
//!
//! Each test starts an axum server on an ephemeral port that mimics the
//! `generateContent` endpoint, then points the client's base URL at it.
//!
//! Owned by: agent-test-gateway

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Json;
use review_core::{AnalysisGateway, DEFAULT_MAX_CHARS, GatewayError, ReviewText, Sentiment};
use review_engine::{build_request, parse_response};
use review_gateway::{ApiKey, GatewayConfig, GeminiClient};
use serde_json::{Value, json};

// =============================================================================
// Test Helpers
// =============================================================================

const ANALYSIS: &str = r#"{"overallSentiment":"Positive","confidence":0.9,"aspects":{"Delivery":{"sentiment":"Negative","confidence":0.8,"evidencePhrases":["late"]}}}"#;

/// What the fake API saw for one call.
#[derive(Debug, Clone)]
struct Seen {
    call: String,
    api_key: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Fake endpoint answering each model call with `reply(call)`.
fn fake_api<F>(log: Log, reply: F) -> Router
where
    F: Fn(&str) -> (StatusCode, Value) + Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/v1beta/models/{call}",
        post(
            move |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let log = log.clone();
                let reply = reply.clone();
                async move {
                    log.lock().unwrap().push(Seen {
                        call: call.clone(),
                        api_key: headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from),
                        body,
                    });
                    let (status, body) = reply(&call);
                    (status, Json(body))
                }
            },
        ),
    )
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1beta")
}

fn client(base_url: String) -> GeminiClient {
    let mut config = GatewayConfig::new(ApiKey::new("test-key"));
    config.base_url = base_url;
    config.model = "gemini-2.5-flash".to_string();
    config.fallback_models = vec!["gemini-1.5-flash".to_string()];
    config.timeout = Duration::from_secs(5);
    GeminiClient::new(config).unwrap()
}

fn request() -> review_core::AnalysisRequest {
    build_request(ReviewText::new("Arrived late but I love it", DEFAULT_MAX_CHARS).unwrap())
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn returns_candidate_text_and_sends_key_in_header() {
    let log = Log::default();
    let base = serve(fake_api(log.clone(), |_| (StatusCode::OK, envelope(ANALYSIS)))).await;

    let raw = client(base).send(&request()).await.unwrap();

    assert_eq!(raw.model(), "gemini-2.5-flash");
    let result = parse_response(&raw).unwrap();
    assert_eq!(result.overall_sentiment, Sentiment::Positive);

    let seen = log.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].call, "gemini-2.5-flash:generateContent");
    assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
    let prompt = seen[0].body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Arrived late but I love it"));
    assert!(!seen[0].call.contains("test-key"));
}

#[tokio::test]
async fn falls_back_when_model_is_missing() {
    let log = Log::default();
    let base = serve(fake_api(log.clone(), |call| {
        if call.starts_with("gemini-2.5-flash") {
            (StatusCode::NOT_FOUND, json!({"error": {"message": "model not found"}}))
        } else {
            (StatusCode::OK, envelope(ANALYSIS))
        }
    }))
    .await;

    let raw = client(base).send(&request()).await.unwrap();

    assert_eq!(raw.model(), "gemini-1.5-flash");
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn exhausted_chain_is_unavailable() {
    let base = serve(fake_api(Log::default(), |_| {
        (StatusCode::NOT_FOUND, json!({"error": "gone"}))
    }))
    .await;

    let err = client(base).send(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable(_)));
}

#[tokio::test]
async fn rate_limit_and_server_errors_are_classified() {
    let base = serve(fake_api(Log::default(), |_| {
        (StatusCode::TOO_MANY_REQUESTS, json!({"error": "quota"}))
    }))
    .await;
    let err = client(base).send(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::RateLimited(_)));

    let base = serve(fake_api(Log::default(), |_| {
        (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"}))
    }))
    .await;
    let err = client(base).send(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable(_)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let app = Router::new().route(
        "/v1beta/models/{call}",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(envelope(ANALYSIS))
        }),
    );
    let base = serve(app).await;

    let mut config = GatewayConfig::new(ApiKey::new("test-key"));
    config.base_url = base;
    config.timeout = Duration::from_millis(200);
    let client = GeminiClient::new(config).unwrap();

    let err = client.send(&request()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)));
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/v1beta"))
        .send(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable(_)));
}
