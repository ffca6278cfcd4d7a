//! Corpus statistics endpoint.
//!
//! - GET /corpus?top=N - Sentiment distribution, aspect baselines and the
//!   most frequent words (the word cloud source)
//!
//! Responds 503 in degraded mode.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use review_core::AnalysisGateway;
use review_engine::CorpusSummary;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Default number of top words returned.
pub const DEFAULT_TOP_WORDS: usize = 20;

/// Upper bound on `top`.
pub const MAX_TOP_WORDS: usize = 500;

/// Query parameters for GET /corpus.
#[derive(Debug, Default, Deserialize)]
pub struct CorpusQuery {
    /// Number of top words to include.
    pub top: Option<usize>,
}

/// GET /corpus - Corpus statistics summary.
async fn corpus_summary<G: AnalysisGateway + 'static>(
    State(state): State<AppState<G>>,
    query: Result<Query<CorpusQuery>, QueryRejection>,
) -> ApiResult<Json<CorpusSummary>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let top = query.top.unwrap_or(DEFAULT_TOP_WORDS);
    if top > MAX_TOP_WORDS {
        return Err(ApiError::BadRequest(format!(
            "top must be at most {MAX_TOP_WORDS}"
        )));
    }

    let stats = state.corpus().get().await?;
    Ok(Json(stats.summary(top)))
}

/// Build corpus routes.
pub fn routes<G: AnalysisGateway + 'static>() -> Router<AppState<G>> {
    Router::new().route("/corpus", get(corpus_summary::<G>))
}
