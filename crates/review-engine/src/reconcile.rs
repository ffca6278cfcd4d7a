//! Comparison of one analysis against the corpus.

use review_core::{
    AnalysisResult, Aspect, ComparisonReport, PercentileBoundary, Sentiment, SentimentShare,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::corpus::CorpusStatistics;

/// Places `result` within the corpus.
///
/// Aspects present on only one side are compared against a neutral 0.
pub fn reconcile(
    result: &AnalysisResult,
    stats: &CorpusStatistics,
    boundary: PercentileBoundary,
) -> ComparisonReport {
    let sentiment = result.overall_sentiment;

    let sentiment_percentile = match boundary {
        PercentileBoundary::Inclusive => stats.share_at_or_below(sentiment),
        PercentileBoundary::Exclusive => stats.share_below(sentiment),
    };

    let aspects: BTreeSet<Aspect> = result
        .aspects
        .aspects()
        .into_iter()
        .chain(stats.aspect_baselines.keys().copied())
        .collect();
    let aspect_deltas: BTreeMap<Aspect, f64> = aspects
        .into_iter()
        .map(|aspect| {
            let baseline = stats.baseline(aspect).unwrap_or(0.0);
            (aspect, result.aspect_score(aspect) - baseline)
        })
        .collect();

    let corpus_majority = stats.majority();

    ComparisonReport {
        sentiment_percentile,
        boundary,
        aspect_deltas,
        matches_corpus_majority: sentiment == corpus_majority,
        corpus_majority,
        same_sentiment_share: stats.proportion(sentiment),
        same_sentiment_count: stats.count(sentiment),
        corpus_size: stats.total_reviews,
        corpus_distribution: Sentiment::ALL
            .into_iter()
            .map(|sentiment| SentimentShare {
                sentiment,
                proportion: stats.proportion(sentiment),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DatasetRow;
    use review_core::AspectAssessment;

    fn corpus() -> CorpusStatistics {
        CorpusStatistics::from_rows(vec![
            DatasetRow::new("late", Sentiment::Negative).with_aspect(Aspect::Delivery, -1.0),
            DatasetRow::new("late", Sentiment::Negative).with_aspect(Aspect::Delivery, 0.0),
            DatasetRow::new("cheap", Sentiment::Positive).with_aspect(Aspect::Price, 1.0),
            DatasetRow::new("okay", Sentiment::Neutral),
        ])
        .unwrap()
    }

    #[test]
    fn deltas_cover_union_of_aspects() {
        let mut result = AnalysisResult::new(Sentiment::Negative, 0.9);
        result.aspects.insert(
            Aspect::Delivery,
            AspectAssessment::new(Sentiment::Negative, 0.8),
        );
        result.aspects.insert(
            Aspect::CustomerService,
            AspectAssessment::new(Sentiment::Positive, 0.4),
        );

        let report = reconcile(&result, &corpus(), PercentileBoundary::Inclusive);

        assert_eq!(report.aspect_deltas.len(), 3);
        assert!((report.aspect_deltas[&Aspect::Delivery] - (-0.8 + 0.5)).abs() < 1e-12);
        assert!((report.aspect_deltas[&Aspect::CustomerService] - 0.4).abs() < 1e-12);
        assert!((report.aspect_deltas[&Aspect::Price] - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn majority_match_and_same_sentiment_slice() {
        let result = AnalysisResult::new(Sentiment::Negative, 0.9);
        let report = reconcile(&result, &corpus(), PercentileBoundary::Inclusive);

        assert!(report.matches_corpus_majority);
        assert_eq!(report.corpus_majority, Sentiment::Negative);
        assert_eq!(report.same_sentiment_count, 2);
        assert_eq!(report.same_sentiment_share, 0.5);
        assert_eq!(report.corpus_size, 4);
    }

    #[test]
    fn boundary_changes_percentile() {
        let result = AnalysisResult::new(Sentiment::Neutral, 0.5);
        let stats = corpus();

        let inclusive = reconcile(&result, &stats, PercentileBoundary::Inclusive);
        let exclusive = reconcile(&result, &stats, PercentileBoundary::Exclusive);

        assert!((inclusive.sentiment_percentile - 0.75).abs() < 1e-12);
        assert!((exclusive.sentiment_percentile - 0.5).abs() < 1e-12);
        assert!(!inclusive.matches_corpus_majority);
    }

    #[test]
    fn distribution_in_rank_order() {
        let report = reconcile(
            &AnalysisResult::new(Sentiment::Positive, 1.0),
            &corpus(),
            PercentileBoundary::default(),
        );
        let order: Vec<_> = report
            .corpus_distribution
            .iter()
            .map(|share| share.sentiment)
            .collect();
        assert_eq!(order, Sentiment::ALL.to_vec());
    }
}
