//! Route definitions for the HTTP API.

pub mod analyze;
pub mod corpus;
pub mod health;

use axum::Router;
use review_core::AnalysisGateway;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router<G: AnalysisGateway + 'static>(state: AppState<G>) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(analyze::routes())
        .merge(corpus::routes())
        .with_state(state)
}
