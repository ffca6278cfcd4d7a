//! Aspect and emotion aggregation.
//!
//! Fills the derived fields of a parsed [`AnalysisResult`]. Key phrase order
//! is left untouched since it already reflects upstream relevance.

use review_core::{AnalysisResult, AspectAssessment};
use std::cmp::Ordering;

/// Returns `result` with `overall_confidence`, `ranked_aspects` and
/// `dominant_emotions` filled.
pub fn aggregate(mut result: AnalysisResult) -> AnalysisResult {
    result.overall_confidence = Some(overall_confidence(&result));
    result.ranked_aspects = {
        let mut ranked: Vec<_> = result.aspects.iter().collect();
        // Stable: equal strength and confidence keep upstream order.
        ranked.sort_by(|(_, a), (_, b)| compare_strength(a, b));
        ranked.into_iter().map(|(aspect, _)| aspect).collect()
    };
    result.dominant_emotions = {
        let mut present: Vec<_> = result
            .emotions
            .iter()
            .filter(|(_, intensity)| **intensity > 0.0)
            .map(|(emotion, intensity)| (*emotion, *intensity))
            .collect();
        present.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        present.into_iter().map(|(emotion, _)| emotion).collect()
    };
    result
}

/// Evidence-length weighted mean of aspect confidences.
fn overall_confidence(result: &AnalysisResult) -> f64 {
    if result.aspects.is_empty() {
        return result.confidence;
    }

    let weighted: Vec<(f64, f64)> = result
        .aspects
        .iter()
        .map(|(_, assessment)| (evidence_weight(assessment), assessment.confidence))
        .collect();
    let total_weight: f64 = weighted.iter().map(|(weight, _)| weight).sum();

    if total_weight > 0.0 {
        weighted
            .iter()
            .map(|(weight, confidence)| weight * confidence)
            .sum::<f64>()
            / total_weight
    } else {
        weighted.iter().map(|(_, confidence)| confidence).sum::<f64>() / weighted.len() as f64
    }
}

fn evidence_weight(assessment: &AspectAssessment) -> f64 {
    assessment
        .evidence_phrases
        .iter()
        .map(|phrase| phrase.chars().count())
        .sum::<usize>() as f64
}

/// Descending by absolute score, then by confidence.
fn compare_strength(a: &AspectAssessment, b: &AspectAssessment) -> Ordering {
    b.score()
        .abs()
        .total_cmp(&a.score().abs())
        .then_with(|| b.confidence.total_cmp(&a.confidence))
}
