//! Process-wide corpus statistics.
//!
//! The dataset is loaded at most once, on a blocking thread, the first time
//! anything asks for it. Concurrent first callers wait on the same
//! initialization. A failed load is remembered too: the server then stays in
//! degraded mode and analyses run without comparison.

use std::path::PathBuf;
use std::sync::Arc;

use review_core::ReviewError;
use review_engine::{CorpusStatistics, load_csv};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

#[derive(Debug, Clone)]
enum CorpusState {
    Ready(Arc<CorpusStatistics>),
    Unavailable(String),
}

/// Load state reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CorpusStatus {
    NotLoaded,
    Ready { reviews: u64 },
    Unavailable { reason: String },
}

/// Lazily loaded, immutable corpus statistics.
#[derive(Debug)]
pub struct CorpusProvider {
    path: Option<PathBuf>,
    cell: OnceCell<CorpusState>,
}

impl CorpusProvider {
    /// Provider that loads the CSV at `path` on first use.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cell: OnceCell::new(),
        }
    }

    /// Provider over statistics that are already computed.
    pub fn preloaded(stats: CorpusStatistics) -> Self {
        Self {
            path: None,
            cell: OnceCell::new_with(Some(CorpusState::Ready(Arc::new(stats)))),
        }
    }

    /// Provider that is permanently in degraded mode.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            path: None,
            cell: OnceCell::new_with(Some(CorpusState::Unavailable(reason.into()))),
        }
    }

    /// Statistics, loading them first if needed.
    ///
    /// # Errors
    ///
    /// [`ReviewError::DatasetUnavailable`] when loading failed, now or on an
    /// earlier call.
    pub async fn get(&self) -> Result<Arc<CorpusStatistics>, ReviewError> {
        match self.cell.get_or_init(|| self.load()).await {
            CorpusState::Ready(stats) => Ok(Arc::clone(stats)),
            CorpusState::Unavailable(reason) => Err(ReviewError::DatasetUnavailable(reason.clone())),
        }
    }

    /// Current state without triggering a load.
    pub fn status(&self) -> CorpusStatus {
        match self.cell.get() {
            None => CorpusStatus::NotLoaded,
            Some(CorpusState::Ready(stats)) => CorpusStatus::Ready {
                reviews: stats.total_reviews,
            },
            Some(CorpusState::Unavailable(reason)) => CorpusStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    async fn load(&self) -> CorpusState {
        let Some(path) = self.path.clone() else {
            return CorpusState::Unavailable("no dataset configured".to_string());
        };
        info!(path = %path.display(), "loading corpus");

        let loaded = tokio::task::spawn_blocking(move || {
            load_csv(&path).and_then(|rows| CorpusStatistics::from_rows(rows))
        })
        .await;

        match loaded {
            Ok(Ok(stats)) => {
                info!(reviews = stats.total_reviews, "corpus ready");
                CorpusState::Ready(Arc::new(stats))
            }
            Ok(Err(err)) => {
                warn!(error = %err, "corpus unavailable, comparison disabled");
                CorpusState::Unavailable(err.to_string())
            }
            Err(err) => {
                warn!(error = %err, "corpus load task failed, comparison disabled");
                CorpusState::Unavailable(err.to_string())
            }
        }
    }
}
