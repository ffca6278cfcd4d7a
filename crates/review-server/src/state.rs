//! Application state shared across handlers.

use std::sync::Arc;

use review_engine::ReviewAnalyzer;

use crate::config::ServerConfig;
use crate::corpus::CorpusProvider;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using
/// `State<AppState<G>>`, where `G` is the language-service gateway.
pub struct AppState<G> {
    /// Single-review analysis pipeline.
    analyzer: Arc<ReviewAnalyzer<G>>,
    /// Reference corpus statistics.
    corpus: Arc<CorpusProvider>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl<G> AppState<G> {
    /// Create new application state.
    pub fn new(analyzer: ReviewAnalyzer<G>, corpus: CorpusProvider, config: ServerConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            corpus: Arc::new(corpus),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the analyzer.
    pub fn analyzer(&self) -> &ReviewAnalyzer<G> {
        &self.analyzer
    }

    /// Get a reference to the corpus provider.
    pub fn corpus(&self) -> &Arc<CorpusProvider> {
        &self.corpus
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

// Manual impl: `G` itself need not be `Clone`.
impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            analyzer: Arc::clone(&self.analyzer),
            corpus: Arc::clone(&self.corpus),
            config: Arc::clone(&self.config),
        }
    }
}

impl<G> std::fmt::Debug for AppState<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("corpus", &self.corpus.status())
            .finish_non_exhaustive()
    }
}
