//! Chart data for the presentation layer.
//!
//! Pure and deterministic: every output collection is either a `BTreeMap` or
//! built in a fixed enum order.

use review_core::{
    AnalysisResult, Aspect, ChartBucket, ChartData, ComparisonReport, Emotion, Sentiment,
};
use std::collections::BTreeMap;

use crate::tokenize::words;

/// Builds chart series for one analysis and its optional comparison.
pub fn build_chart_data(result: &AnalysisResult, report: Option<&ComparisonReport>) -> ChartData {
    ChartData {
        word_weights: word_weights(result),
        distribution_buckets: report.map(distribution_buckets).unwrap_or_default(),
        aspect_buckets: Aspect::ALL
            .into_iter()
            .filter(|aspect| result.aspects.contains(*aspect))
            .map(|aspect| ChartBucket::new(aspect.display_name(), result.aspect_score(aspect)))
            .collect(),
        emotion_buckets: Emotion::ALL
            .into_iter()
            .filter_map(|emotion| {
                result
                    .emotions
                    .get(&emotion)
                    .map(|intensity| ChartBucket::new(emotion.as_str(), *intensity))
            })
            .collect(),
    }
}

/// Key phrase weights: `1 / rank`, negated for phrases tied to negative
/// sentiment. A phrase repeated (ignoring case) keeps its first, best rank.
fn word_weights(result: &AnalysisResult) -> BTreeMap<String, f64> {
    let mut weights = BTreeMap::new();
    let mut seen: Vec<String> = Vec::new();

    for (index, phrase) in result.key_phrases.iter().enumerate() {
        let folded = phrase.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);

        let rank = (index + 1) as f64;
        let sign = match associated_sentiment(result, phrase) {
            Sentiment::Negative => -1.0,
            Sentiment::Neutral | Sentiment::Positive => 1.0,
        };
        weights.insert(phrase.clone(), sign / rank);
    }

    weights
}

/// Sentiment of the first aspect whose evidence mentions `phrase` as whole
/// words (either inside the other), falling back to the overall sentiment.
fn associated_sentiment(result: &AnalysisResult, phrase: &str) -> Sentiment {
    let phrase = words(phrase);
    result
        .aspects
        .iter()
        .find(|(_, assessment)| {
            assessment.evidence_phrases.iter().any(|evidence| {
                let evidence = words(evidence);
                contains_run(&evidence, &phrase) || contains_run(&phrase, &evidence)
            })
        })
        .map(|(_, assessment)| assessment.sentiment)
        .unwrap_or(result.overall_sentiment)
}

/// Whether `needle` occurs as a contiguous run of tokens in `haystack`.
fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

fn distribution_buckets(report: &ComparisonReport) -> Vec<ChartBucket> {
    Sentiment::ALL
        .into_iter()
        .map(|sentiment| {
            let proportion = report
                .corpus_distribution
                .iter()
                .find(|share| share.sentiment == sentiment)
                .map(|share| share.proportion)
                .unwrap_or(0.0);
            ChartBucket::new(sentiment.as_str(), proportion)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::{AspectAssessment, PercentileBoundary, SentimentShare};

    fn mixed_result() -> AnalysisResult {
        let mut result = AnalysisResult::new(Sentiment::Positive, 0.8);
        result.aspects.insert(
            Aspect::Delivery,
            AspectAssessment::new(Sentiment::Negative, 0.9).with_evidence(["arrived two weeks late"]),
        );
        result.aspects.insert(
            Aspect::ProductQuality,
            AspectAssessment::new(Sentiment::Positive, 0.7).with_evidence(["works perfectly"]),
        );
        result.key_phrases = vec![
            "Works perfectly".into(),
            "two weeks late".into(),
            "great value".into(),
            "works perfectly".into(),
        ];
        result.emotions.insert(Emotion::Frustration, 0.4);
        result.emotions.insert(Emotion::Joy, 0.6);
        result
    }

    fn report() -> ComparisonReport {
        ComparisonReport {
            sentiment_percentile: 1.0,
            boundary: PercentileBoundary::Inclusive,
            aspect_deltas: BTreeMap::new(),
            matches_corpus_majority: false,
            corpus_majority: Sentiment::Negative,
            same_sentiment_share: 0.3,
            same_sentiment_count: 3,
            corpus_size: 10,
            corpus_distribution: vec![
                SentimentShare { sentiment: Sentiment::Positive, proportion: 0.3 },
                SentimentShare { sentiment: Sentiment::Negative, proportion: 0.6 },
                SentimentShare { sentiment: Sentiment::Neutral, proportion: 0.1 },
            ],
        }
    }

    #[test]
    fn weights_use_inverse_rank_and_polarity_sign() {
        let chart = build_chart_data(&mixed_result(), None);

        assert_eq!(chart.word_weights.len(), 3);
        assert_eq!(chart.word_weights["Works perfectly"], 1.0);
        assert_eq!(chart.word_weights["two weeks late"], -0.5);
        assert!((chart.word_weights["great value"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn evidence_matches_whole_words_only() {
        let mut result = AnalysisResult::new(Sentiment::Positive, 0.9);
        result.aspects.insert(
            Aspect::Delivery,
            AspectAssessment::new(Sentiment::Negative, 0.8).with_evidence(["late"]),
        );
        result.key_phrases = vec!["delicious chocolate".into(), "fast".into(), "Late!".into()];

        let chart = build_chart_data(&result, None);

        assert_eq!(chart.word_weights["delicious chocolate"], 1.0);
        assert_eq!(chart.word_weights["fast"], 0.5);
        assert!((chart.word_weights["Late!"] + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn token_runs_must_be_contiguous() {
        let haystack = words("arrived two weeks late");
        assert!(contains_run(&haystack, &words("two weeks")));
        assert!(!contains_run(&haystack, &words("arrived late")));
        assert!(!contains_run(&haystack, &[]));
    }

    #[test]
    fn distribution_is_empty_without_report() {
        let chart = build_chart_data(&mixed_result(), None);
        assert!(chart.distribution_buckets.is_empty());
    }

    #[test]
    fn distribution_follows_rank_order() {
        let chart = build_chart_data(&mixed_result(), Some(&report()));
        assert_eq!(
            chart.distribution_buckets,
            vec![
                ChartBucket::new("Negative", 0.6),
                ChartBucket::new("Neutral", 0.1),
                ChartBucket::new("Positive", 0.3),
            ]
        );
    }

    #[test]
    fn aspect_and_emotion_buckets_in_enum_order() {
        let chart = build_chart_data(&mixed_result(), None);
        let aspects: Vec<_> = chart.aspect_buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(aspects, vec![Aspect::Delivery.display_name(), Aspect::ProductQuality.display_name()]);
        assert!((chart.aspect_buckets[0].value + 0.9).abs() < 1e-12);

        let emotions: Vec<_> = chart.emotion_buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(emotions, vec!["Joy", "Frustration"]);
    }

    #[test]
    fn identical_inputs_identical_output() {
        let result = mixed_result();
        let report = report();
        assert_eq!(
            build_chart_data(&result, Some(&report)),
            build_chart_data(&result, Some(&report))
        );
    }
}
