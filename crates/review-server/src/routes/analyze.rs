//! Single-review analysis endpoint.
//!
//! - POST /analyze - Analyze one review and compare it against the corpus
//!
//! When the corpus is unavailable the analysis still succeeds with
//! `comparison: null`.
//!
//! Owned by: agent-analyze

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use review_core::AnalysisGateway;
use review_engine::ReviewAnalysis;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /analyze.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw review text.
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /analyze - Analyze one review.
async fn analyze_review<G: AnalysisGateway + 'static>(
    State(state): State<AppState<G>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewAnalysis>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let corpus = state.corpus().get().await.ok();
    let analysis = state
        .analyzer()
        .analyze_review(&request.text, corpus.as_deref())
        .await?;

    Ok(Json(analysis))
}

/// Build analysis routes.
pub fn routes<G: AnalysisGateway + 'static>() -> Router<AppState<G>> {
    Router::new().route("/analyze", post(analyze_review::<G>))
}
