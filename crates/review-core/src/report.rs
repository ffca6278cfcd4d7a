//! Comparison and chart types derived from a single analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::{Aspect, Sentiment};

/// How ties at the queried sentiment's rank count toward its percentile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileBoundary {
    /// Share of the corpus ranked at or below the result.
    #[default]
    Inclusive,
    /// Share of the corpus ranked strictly below the result.
    Exclusive,
}

impl fmt::Display for PercentileBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inclusive => f.write_str("inclusive"),
            Self::Exclusive => f.write_str("exclusive"),
        }
    }
}

impl FromStr for PercentileBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" => Ok(Self::Exclusive),
            other => Err(format!("expected 'inclusive' or 'exclusive', got '{other}'")),
        }
    }
}

/// Share of the corpus carrying one sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentShare {
    pub sentiment: Sentiment,
    pub proportion: f64,
}

/// How one review stands relative to the reference corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Fraction of the corpus at (or strictly below, per `boundary`) the
    /// review's sentiment rank.
    pub sentiment_percentile: f64,
    pub boundary: PercentileBoundary,
    /// Review aspect score minus corpus baseline, per aspect.
    pub aspect_deltas: BTreeMap<Aspect, f64>,
    pub matches_corpus_majority: bool,
    pub corpus_majority: Sentiment,
    /// Fraction of the corpus sharing the review's sentiment.
    pub same_sentiment_share: f64,
    pub same_sentiment_count: u64,
    pub corpus_size: u64,
    /// Corpus proportions in rank order.
    pub corpus_distribution: Vec<SentimentShare>,
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBucket {
    pub label: String,
    pub value: f64,
}

impl ChartBucket {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Chart-ready series. Rendering is left to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Key phrase to signed weight; the sign carries sentiment polarity.
    pub word_weights: BTreeMap<String, f64>,
    /// Corpus sentiment distribution, Negative to Positive.
    pub distribution_buckets: Vec<ChartBucket>,
    /// Signed aspect scores in aspect order.
    pub aspect_buckets: Vec<ChartBucket>,
    /// Emotion intensities in emotion order.
    pub emotion_buckets: Vec<ChartBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_parses_case_insensitively() {
        assert_eq!("Exclusive".parse::<PercentileBoundary>(), Ok(PercentileBoundary::Exclusive));
        assert_eq!("inclusive".parse::<PercentileBoundary>(), Ok(PercentileBoundary::Inclusive));
        assert!("median".parse::<PercentileBoundary>().is_err());
        assert_eq!(PercentileBoundary::default(), PercentileBoundary::Inclusive);
    }
}
