//! Corpus statistics over the reference review dataset.
//!
//! Statistics are computed in one pass and never mutated afterwards, so a
//! single instance can be shared across concurrent analyses behind an `Arc`.

use review_core::{Aspect, ReviewError, Sentiment};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::info;

use crate::lexicon::detect_aspects;
use crate::tokenize::tokenize;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("dataset has no '{0}' column")]
    MissingColumn(String),

    #[error("dataset contains no usable rows")]
    Empty,
}

impl From<DatasetError> for ReviewError {
    fn from(err: DatasetError) -> Self {
        ReviewError::DatasetUnavailable(err.to_string())
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One labelled review from the reference dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub text: String,
    pub sentiment: Sentiment,
    /// Star rating, 1 to 5, when the source carries one.
    pub rating: Option<u8>,
    /// Signed per-aspect scores. Aspects not mentioned are absent.
    pub aspect_scores: Vec<(Aspect, f64)>,
}

impl DatasetRow {
    /// A row with no rating and no aspect scores.
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
            rating: None,
            aspect_scores: Vec::new(),
        }
    }

    /// A row whose aspects are tagged by keyword, each scored with the row's
    /// polarity.
    pub fn labeled(text: impl Into<String>, sentiment: Sentiment, rating: Option<u8>) -> Self {
        let text = text.into();
        let aspect_scores = detect_aspects(&text)
            .into_iter()
            .map(|aspect| (aspect, sentiment.polarity()))
            .collect();
        Self {
            text,
            sentiment,
            rating,
            aspect_scores,
        }
    }

    pub fn with_aspect(mut self, aspect: Aspect, score: f64) -> Self {
        self.aspect_scores.push((aspect, score));
        self
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Mean signed score of one aspect over the rows that mention it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectBaseline {
    pub mean_score: f64,
    pub samples: u64,
}

/// Aggregate view of the reference corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStatistics {
    pub total_reviews: u64,
    /// Holds every sentiment, including zero counts. Sums to `total_reviews`.
    pub sentiment_counts: BTreeMap<Sentiment, u64>,
    /// Holds every sentiment. Sums to 1.
    pub sentiment_distribution: BTreeMap<Sentiment, f64>,
    /// Only aspects with at least one sample.
    pub aspect_baselines: BTreeMap<Aspect, AspectBaseline>,
    pub word_frequencies: HashMap<String, u64>,
    pub average_rating: Option<f64>,
}

#[derive(Default)]
struct AspectAccumulator {
    sum: f64,
    samples: u64,
}

impl CorpusStatistics {
    /// Computes statistics in a single pass.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Empty`] when `rows` yields nothing.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<DatasetRow>,
    {
        let mut total: u64 = 0;
        let mut sentiment_counts: BTreeMap<Sentiment, u64> =
            Sentiment::ALL.iter().map(|s| (*s, 0)).collect();
        let mut aspects: BTreeMap<Aspect, AspectAccumulator> = BTreeMap::new();
        let mut word_frequencies: HashMap<String, u64> = HashMap::new();
        let mut rating_sum: u64 = 0;
        let mut rated: u64 = 0;

        for row in rows {
            let row = row.borrow();
            total += 1;
            *sentiment_counts.entry(row.sentiment).or_default() += 1;

            for (aspect, score) in &row.aspect_scores {
                let acc = aspects.entry(*aspect).or_default();
                acc.sum += score;
                acc.samples += 1;
            }

            for word in tokenize(&row.text) {
                *word_frequencies.entry(word).or_default() += 1;
            }

            if let Some(rating) = row.rating {
                rating_sum += u64::from(rating);
                rated += 1;
            }
        }

        if total == 0 {
            return Err(DatasetError::Empty);
        }

        let sentiment_distribution = sentiment_counts
            .iter()
            .map(|(sentiment, count)| (*sentiment, *count as f64 / total as f64))
            .collect();

        let aspect_baselines = aspects
            .into_iter()
            .map(|(aspect, acc)| {
                let baseline = AspectBaseline {
                    mean_score: acc.sum / acc.samples as f64,
                    samples: acc.samples,
                };
                (aspect, baseline)
            })
            .collect();

        let average_rating = (rated > 0).then(|| rating_sum as f64 / rated as f64);

        info!(
            reviews = total,
            vocabulary = word_frequencies.len(),
            "corpus statistics computed"
        );

        Ok(Self {
            total_reviews: total,
            sentiment_counts,
            sentiment_distribution,
            aspect_baselines,
            word_frequencies,
            average_rating,
        })
    }

    /// Share of the corpus labelled `sentiment`.
    pub fn proportion(&self, sentiment: Sentiment) -> f64 {
        self.sentiment_distribution
            .get(&sentiment)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn count(&self, sentiment: Sentiment) -> u64 {
        self.sentiment_counts.get(&sentiment).copied().unwrap_or(0)
    }

    /// Most frequent label. Ties go to the lower rank.
    pub fn majority(&self) -> Sentiment {
        Sentiment::ALL
            .into_iter()
            .fold(Sentiment::Negative, |best, candidate| {
                if self.count(candidate) > self.count(best) {
                    candidate
                } else {
                    best
                }
            })
    }

    /// Share of the corpus ranked at or below `sentiment`.
    pub fn share_at_or_below(&self, sentiment: Sentiment) -> f64 {
        Sentiment::ALL
            .into_iter()
            .filter(|s| *s <= sentiment)
            .map(|s| self.proportion(s))
            .sum()
    }

    /// Share of the corpus ranked strictly below `sentiment`.
    pub fn share_below(&self, sentiment: Sentiment) -> f64 {
        Sentiment::ALL
            .into_iter()
            .filter(|s| *s < sentiment)
            .map(|s| self.proportion(s))
            .sum()
    }

    /// Mean aspect score, or `None` if no row mentioned the aspect.
    pub fn baseline(&self, aspect: Aspect) -> Option<f64> {
        self.aspect_baselines
            .get(&aspect)
            .map(|baseline| baseline.mean_score)
    }

    /// Most frequent words, ties broken alphabetically.
    pub fn top_words(&self, n: usize) -> Vec<WordCount> {
        let mut words: Vec<_> = self.word_frequencies.iter().collect();
        words.sort_by(|(wa, ca), (wb, cb)| cb.cmp(ca).then_with(|| wa.cmp(wb)));
        words
            .into_iter()
            .take(n)
            .map(|(word, count)| WordCount {
                word: word.clone(),
                count: *count,
            })
            .collect()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.word_frequencies.len()
    }

    /// Serializable overview with the `top_n` most frequent words.
    pub fn summary(&self, top_n: usize) -> CorpusSummary {
        CorpusSummary {
            total_reviews: self.total_reviews,
            sentiment_counts: self.sentiment_counts.clone(),
            sentiment_distribution: self.sentiment_distribution.clone(),
            majority: self.majority(),
            aspect_baselines: self.aspect_baselines.clone(),
            average_rating: self.average_rating,
            vocabulary_size: self.vocabulary_size(),
            top_words: self.top_words(top_n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Corpus overview returned by the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub total_reviews: u64,
    pub sentiment_counts: BTreeMap<Sentiment, u64>,
    pub sentiment_distribution: BTreeMap<Sentiment, f64>,
    pub majority: Sentiment,
    pub aspect_baselines: BTreeMap<Aspect, AspectBaseline>,
    pub average_rating: Option<f64>,
    pub vocabulary_size: usize,
    pub top_words: Vec<WordCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<DatasetRow> {
        vec![
            DatasetRow::new("Package arrived late, terrible delivery", Sentiment::Negative)
                .with_aspect(Aspect::Delivery, -1.0),
            DatasetRow::new("Late again and the support was rude", Sentiment::Negative)
                .with_aspect(Aspect::Delivery, -0.5)
                .with_aspect(Aspect::CustomerService, -1.0),
            DatasetRow::new("It was fine", Sentiment::Neutral),
            DatasetRow::new("Great price and fast delivery", Sentiment::Positive)
                .with_aspect(Aspect::Price, 1.0)
                .with_aspect(Aspect::Delivery, 1.0),
        ]
    }

    #[test]
    fn counts_sum_to_total() {
        let stats = CorpusStatistics::from_rows(sample_rows()).unwrap();
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.sentiment_counts.values().sum::<u64>(), 4);
        let total: f64 = stats.sentiment_distribution.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_an_error() {
        let rows: Vec<DatasetRow> = Vec::new();
        assert!(matches!(
            CorpusStatistics::from_rows(rows),
            Err(DatasetError::Empty)
        ));
    }

    #[test]
    fn absent_aspects_do_not_dilute_baselines() {
        let stats = CorpusStatistics::from_rows(&sample_rows()).unwrap();
        let delivery = stats.aspect_baselines[&Aspect::Delivery];
        assert_eq!(delivery.samples, 3);
        assert!((delivery.mean_score - (-0.5 / 3.0)).abs() < 1e-12);
        assert_eq!(stats.baseline(Aspect::CustomerService), Some(-1.0));
        assert_eq!(stats.baseline(Aspect::ProductQuality), None);
    }

    #[test]
    fn missing_labels_still_present_with_zero() {
        let rows = vec![DatasetRow::new("love it", Sentiment::Positive)];
        let stats = CorpusStatistics::from_rows(rows).unwrap();
        assert_eq!(stats.count(Sentiment::Negative), 0);
        assert_eq!(stats.proportion(Sentiment::Neutral), 0.0);
        assert_eq!(stats.sentiment_distribution.len(), 3);
    }

    #[test]
    fn majority_ties_go_to_lower_rank() {
        let rows = vec![
            DatasetRow::new("a", Sentiment::Positive),
            DatasetRow::new("b", Sentiment::Neutral),
        ];
        let stats = CorpusStatistics::from_rows(rows).unwrap();
        assert_eq!(stats.majority(), Sentiment::Neutral);

        let stats = CorpusStatistics::from_rows(sample_rows()).unwrap();
        assert_eq!(stats.majority(), Sentiment::Negative);
    }

    #[test]
    fn shares_follow_rank_order() {
        let stats = CorpusStatistics::from_rows(sample_rows()).unwrap();
        assert!((stats.share_below(Sentiment::Positive) - 0.75).abs() < 1e-12);
        assert!((stats.share_at_or_below(Sentiment::Neutral) - 0.75).abs() < 1e-12);
        assert_eq!(stats.share_below(Sentiment::Negative), 0.0);
    }

    #[test]
    fn top_words_exclude_stop_words() {
        let stats = CorpusStatistics::from_rows(sample_rows()).unwrap();
        let top = stats.top_words(2);
        assert_eq!(top[0], WordCount { word: "delivery".into(), count: 2 });
        assert_eq!(top[1], WordCount { word: "late".into(), count: 2 });
        assert!(!stats.word_frequencies.contains_key("the"));
    }

    #[test]
    fn average_rating_ignores_unrated_rows() {
        let rows = vec![
            DatasetRow::labeled("Arrived broken", Sentiment::Negative, Some(1)),
            DatasetRow::labeled("Works great", Sentiment::Positive, Some(5)),
            DatasetRow::new("No stars here", Sentiment::Neutral),
        ];
        let stats = CorpusStatistics::from_rows(rows).unwrap();
        assert_eq!(stats.average_rating, Some(3.0));
    }

    #[test]
    fn labeled_rows_score_aspects_with_row_polarity() {
        let row = DatasetRow::labeled("Refund never came", Sentiment::Negative, Some(1));
        assert_eq!(row.aspect_scores, vec![(Aspect::CustomerService, -1.0)]);
    }
}
