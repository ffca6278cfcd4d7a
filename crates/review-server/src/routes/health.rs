//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use review_core::AnalysisGateway;
use serde::Serialize;

use crate::corpus::CorpusStatus;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when comparison is disabled.
    pub status: String,
    /// Corpus load state.
    pub corpus: CorpusStatus,
    /// Server version.
    pub version: String,
}

fn health_report(corpus: CorpusStatus) -> HealthResponse {
    let status = match corpus {
        CorpusStatus::Unavailable { .. } => "degraded",
        CorpusStatus::NotLoaded | CorpusStatus::Ready { .. } => "ok",
    };
    HealthResponse {
        status: status.to_string(),
        corpus,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// GET /health - Health check endpoint.
async fn health_check<G>(State(state): State<AppState<G>>) -> Json<HealthResponse> {
    Json(health_report(state.corpus().status()))
}

/// Build health check routes.
pub fn routes<G: AnalysisGateway + 'static>() -> Router<AppState<G>> {
    Router::new().route("/health", get(health_check::<G>))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report() {
        let report = health_report(CorpusStatus::Ready { reviews: 10 });
        assert_eq!(report.status, "ok");

        let report = health_report(CorpusStatus::Unavailable {
            reason: "missing".into(),
        });
        assert_eq!(report.status, "degraded");
    }
}
