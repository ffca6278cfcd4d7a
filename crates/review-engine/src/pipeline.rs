//! End-to-end analysis of a single review.

use chrono::{DateTime, Utc};
use review_core::{
    AnalysisGateway, AnalysisRequest, AnalysisResult, ChartData, ComparisonReport, PercentileBoundary,
    ReviewError, ReviewResult, ReviewText, DEFAULT_MAX_CHARS,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::chart::build_chart_data;
use crate::corpus::CorpusStatistics;
use crate::parser::parse_response;
use crate::prompt::build_request;
use crate::reconcile::reconcile;

/// Tunables for [`ReviewAnalyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub max_review_chars: usize,
    pub percentile_boundary: PercentileBoundary,
    /// Repeat the gateway call once when the response has no usable JSON.
    pub retry_malformed: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_review_chars: DEFAULT_MAX_CHARS,
            percentile_boundary: PercentileBoundary::default(),
            retry_malformed: true,
        }
    }
}

/// Everything produced for one review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAnalysis {
    pub review: ReviewText,
    pub result: AnalysisResult,
    /// `None` when no corpus statistics are available.
    pub comparison: Option<ComparisonReport>,
    pub chart: ChartData,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
}

/// Runs preprocess → request → gateway → parse → aggregate → reconcile →
/// chart for each review.
///
/// Holds no mutable state; one analyzer serves any number of concurrent
/// calls.
pub struct ReviewAnalyzer<G> {
    gateway: G,
    config: AnalyzerConfig,
}

impl<G: AnalysisGateway> ReviewAnalyzer<G> {
    pub fn new(gateway: G, config: AnalyzerConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Analyzes one raw review.
    ///
    /// Input validation happens before any network call. When `corpus` is
    /// `None` the analysis still succeeds, with no comparison and an empty
    /// distribution series.
    pub async fn analyze_review(
        &self,
        raw: &str,
        corpus: Option<&CorpusStatistics>,
    ) -> ReviewResult<ReviewAnalysis> {
        let review = ReviewText::new(raw, self.config.max_review_chars)?;
        let request = build_request(review);

        let (result, model) = self.fetch_result(&request).await?;
        let result = aggregate(result);

        let comparison =
            corpus.map(|stats| reconcile(&result, stats, self.config.percentile_boundary));
        let chart = build_chart_data(&result, comparison.as_ref());

        info!(
            sentiment = %result.overall_sentiment,
            aspects = result.aspects.len(),
            repaired = result.was_repaired,
            compared = comparison.is_some(),
            "review analyzed"
        );

        Ok(ReviewAnalysis {
            review: request.text().clone(),
            result,
            comparison,
            chart,
            model,
            analyzed_at: Utc::now(),
        })
    }

    async fn fetch_result(
        &self,
        request: &AnalysisRequest,
    ) -> ReviewResult<(AnalysisResult, String)> {
        let attempts = if self.config.retry_malformed { 2 } else { 1 };
        let mut attempt = 1;

        loop {
            let raw = self.gateway.send(request).await?;
            match parse_response(&raw) {
                Ok(result) => return Ok((result, raw.model().to_string())),
                Err(err @ ReviewError::MalformedResponse { .. }) if attempt < attempts => {
                    warn!(attempt, error = %err, "malformed response, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
