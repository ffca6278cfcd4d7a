//! Core data types for the review analyzer.
//!
//! This module defines the closed vocabularies the whole pipeline agrees on
//! (sentiments, aspects, emotions) and the central [`AnalysisResult`] entity
//! produced by the response parser and enriched by the aggregator.
//!
//! All label enums serialize as their canonical upstream names
//! (`"Positive"`, `"ProductQuality"`, ...), which is also the spelling used
//! in the request contract sent to the language service.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Strips separators and compares case-insensitively, so that
/// `"product quality"`, `"product_quality"` and `"ProductQuality"` agree.
fn label_matches(candidate: &str, canonical: &str) -> bool {
    let normalized: String = candidate
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect();
    normalized.eq_ignore_ascii_case(canonical)
}

// ============================================================================
// Sentiment
// ============================================================================

/// Overall polarity of a review or an aspect.
///
/// Variants are declared in rank order, so the derived `Ord` gives
/// `Negative < Neutral < Positive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// All sentiments in rank order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }

    /// Numeric polarity: Positive = +1, Neutral = 0, Negative = -1.
    pub fn polarity(&self) -> f64 {
        match self {
            Sentiment::Negative => -1.0,
            Sentiment::Neutral => 0.0,
            Sentiment::Positive => 1.0,
        }
    }

    /// Rank position in the `Negative < Neutral < Positive` ordering.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Matches a label case-insensitively. Returns `None` for anything
    /// outside the closed set.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sentiment| label_matches(label, sentiment.as_str()))
    }

    /// Labels a star rating: 1-2 Negative, 3 Neutral, 4-5 Positive.
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            0..=2 => Sentiment::Negative,
            3 => Sentiment::Neutral,
            _ => Sentiment::Positive,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// A label outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label: {0}")]
pub struct UnknownLabel(pub String);

// ============================================================================
// Aspect
// ============================================================================

/// Fixed category of review content, scored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Aspect {
    Delivery,
    ProductQuality,
    CustomerService,
    Price,
    Other,
}

impl Aspect {
    /// All aspects in declaration order.
    pub const ALL: [Aspect; 5] = [
        Aspect::Delivery,
        Aspect::ProductQuality,
        Aspect::CustomerService,
        Aspect::Price,
        Aspect::Other,
    ];

    /// Canonical label, as used in the request contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aspect::Delivery => "Delivery",
            Aspect::ProductQuality => "ProductQuality",
            Aspect::CustomerService => "CustomerService",
            Aspect::Price => "Price",
            Aspect::Other => "Other",
        }
    }

    /// Human-facing label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Aspect::Delivery => "Delivery",
            Aspect::ProductQuality => "Product Quality",
            Aspect::CustomerService => "Customer Service",
            Aspect::Price => "Price",
            Aspect::Other => "Other",
        }
    }

    /// Matches a label ignoring case, spaces, underscores and hyphens.
    /// Synonyms such as `"Shipping"` are deliberately not recognized.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|aspect| label_matches(label, aspect.as_str()))
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aspect {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

// ============================================================================
// Emotion
// ============================================================================

/// Closed set of emotion labels the language service may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Satisfaction,
    Trust,
    Surprise,
    Anticipation,
    Sadness,
    Anger,
    Frustration,
    Disappointment,
    Fear,
    Disgust,
}

impl Emotion {
    /// All emotions in declaration order.
    pub const ALL: [Emotion; 11] = [
        Emotion::Joy,
        Emotion::Satisfaction,
        Emotion::Trust,
        Emotion::Surprise,
        Emotion::Anticipation,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Frustration,
        Emotion::Disappointment,
        Emotion::Fear,
        Emotion::Disgust,
    ];

    /// Canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Satisfaction => "Satisfaction",
            Emotion::Trust => "Trust",
            Emotion::Surprise => "Surprise",
            Emotion::Anticipation => "Anticipation",
            Emotion::Sadness => "Sadness",
            Emotion::Anger => "Anger",
            Emotion::Frustration => "Frustration",
            Emotion::Disappointment => "Disappointment",
            Emotion::Fear => "Fear",
            Emotion::Disgust => "Disgust",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|emotion| label_matches(label, emotion.as_str()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aspect breakdown
// ============================================================================

/// Sentiment assessment of one aspect of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectAssessment {
    pub sentiment: Sentiment,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    /// Quotes from the review supporting the assessment, in upstream order.
    #[serde(default)]
    pub evidence_phrases: Vec<String>,
}

impl AspectAssessment {
    pub fn new(sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            sentiment,
            confidence,
            evidence_phrases: Vec::new(),
        }
    }

    /// Adds supporting phrases.
    pub fn with_evidence<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence_phrases
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    /// Signed score: polarity scaled by confidence, in `[-1.0, 1.0]`.
    pub fn score(&self) -> f64 {
        self.sentiment.polarity() * self.confidence
    }
}

/// Ordered mapping from aspect to its assessment.
///
/// Keys are unique and iteration follows insertion order, which is the order
/// the upstream service reported them in. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectBreakdown {
    entries: Vec<(Aspect, AspectAssessment)>,
}

impl AspectBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an assessment. An existing aspect keeps its position and has
    /// its assessment replaced.
    pub fn insert(&mut self, aspect: Aspect, assessment: AspectAssessment) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == aspect) {
            Some((_, slot)) => *slot = assessment,
            None => self.entries.push((aspect, assessment)),
        }
    }

    pub fn get(&self, aspect: Aspect) -> Option<&AspectAssessment> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == aspect)
            .map(|(_, assessment)| assessment)
    }

    pub fn contains(&self, aspect: Aspect) -> bool {
        self.get(aspect).is_some()
    }

    /// Iterates in upstream order.
    pub fn iter(&self) -> impl Iterator<Item = (Aspect, &AspectAssessment)> {
        self.entries
            .iter()
            .map(|(aspect, assessment)| (*aspect, assessment))
    }

    pub fn aspects(&self) -> Vec<Aspect> {
        self.entries.iter().map(|(aspect, _)| *aspect).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Aspect, AspectAssessment)> for AspectBreakdown {
    fn from_iter<T: IntoIterator<Item = (Aspect, AspectAssessment)>>(iter: T) -> Self {
        let mut breakdown = AspectBreakdown::new();
        for (aspect, assessment) in iter {
            breakdown.insert(aspect, assessment);
        }
        breakdown
    }
}

impl Serialize for AspectBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (aspect, assessment) in &self.entries {
            map.serialize_entry(aspect, assessment)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AspectBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = AspectBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from aspect to assessment")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut breakdown = AspectBreakdown::new();
                while let Some((aspect, assessment)) =
                    access.next_entry::<Aspect, AspectAssessment>()?
                {
                    breakdown.insert(aspect, assessment);
                }
                Ok(breakdown)
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

// ============================================================================
// AnalysisResult
// ============================================================================

/// Structured analysis of a single review.
///
/// Produced by the response parser from untrusted upstream output; every key
/// is drawn from a closed vocabulary and every confidence or intensity lies
/// in `[0.0, 1.0]`. The trailing derived fields are empty until the
/// aggregator has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_sentiment: Sentiment,
    pub confidence: f64,
    #[serde(default)]
    pub aspects: AspectBreakdown,
    #[serde(default)]
    pub emotions: BTreeMap<Emotion, f64>,
    /// Insertion order is relevance rank.
    #[serde(default)]
    pub key_phrases: Vec<String>,
    #[serde(default)]
    pub summary: String,
    /// True when any field was missing, malformed or out of range upstream
    /// and was replaced by a documented default.
    #[serde(default)]
    pub was_repaired: bool,

    /// Evidence-length weighted confidence across aspects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,
    /// Aspects ordered by strength of sentiment.
    #[serde(default)]
    pub ranked_aspects: Vec<Aspect>,
    /// Emotions ordered by intensity.
    #[serde(default)]
    pub dominant_emotions: Vec<Emotion>,
}

impl AnalysisResult {
    /// Creates a result with the required fields and everything else empty.
    pub fn new(overall_sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            overall_sentiment,
            confidence,
            aspects: AspectBreakdown::new(),
            emotions: BTreeMap::new(),
            key_phrases: Vec::new(),
            summary: String::new(),
            was_repaired: false,
            overall_confidence: None,
            ranked_aspects: Vec::new(),
            dominant_emotions: Vec::new(),
        }
    }

    /// Signed score of an aspect, treating an absent aspect as neutral.
    pub fn aspect_score(&self, aspect: Aspect) -> f64 {
        self.aspects
            .get(aspect)
            .map(AspectAssessment::score)
            .unwrap_or(0.0)
    }

    /// Whether the aggregator has filled the derived fields.
    pub fn is_aggregated(&self) -> bool {
        self.overall_confidence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_ordering_follows_rank() {
        assert!(Sentiment::Negative < Sentiment::Neutral);
        assert!(Sentiment::Neutral < Sentiment::Positive);
        assert_eq!(Sentiment::Positive.rank(), 2);
    }

    #[test]
    fn sentiment_from_label_is_case_insensitive() {
        assert_eq!(Sentiment::from_label("positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label(" NEGATIVE "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("Mixed"), None);
    }

    #[test]
    fn sentiment_from_rating() {
        assert_eq!(Sentiment::from_rating(1), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(2), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(3), Sentiment::Neutral);
        assert_eq!(Sentiment::from_rating(5), Sentiment::Positive);
    }

    #[test]
    fn aspect_labels_ignore_separators() {
        assert_eq!(Aspect::from_label("Product Quality"), Some(Aspect::ProductQuality));
        assert_eq!(Aspect::from_label("customer_service"), Some(Aspect::CustomerService));
        assert_eq!(Aspect::from_label("Shipping"), None);
    }

    #[test]
    fn breakdown_insert_replaces_in_place() {
        let mut breakdown = AspectBreakdown::new();
        breakdown.insert(Aspect::Price, AspectAssessment::new(Sentiment::Negative, 0.4));
        breakdown.insert(Aspect::Delivery, AspectAssessment::new(Sentiment::Positive, 0.9));
        breakdown.insert(Aspect::Price, AspectAssessment::new(Sentiment::Positive, 0.7));

        assert_eq!(breakdown.aspects(), vec![Aspect::Price, Aspect::Delivery]);
        assert_eq!(breakdown.get(Aspect::Price).unwrap().sentiment, Sentiment::Positive);
    }

    #[test]
    fn breakdown_serializes_as_ordered_map() {
        let breakdown: AspectBreakdown = [
            (Aspect::Price, AspectAssessment::new(Sentiment::Neutral, 0.5)),
            (Aspect::Delivery, AspectAssessment::new(Sentiment::Negative, 0.8).with_evidence(["late"])),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&breakdown).unwrap();
        assert!(json.starts_with("{\"Price\""));

        let parsed: AspectBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, breakdown);
    }

    #[test]
    fn aspect_score_of_absent_aspect_is_neutral() {
        let mut result = AnalysisResult::new(Sentiment::Positive, 0.9);
        result
            .aspects
            .insert(Aspect::Delivery, AspectAssessment::new(Sentiment::Negative, 0.8));

        assert!((result.aspect_score(Aspect::Delivery) + 0.8).abs() < 1e-9);
        assert_eq!(result.aspect_score(Aspect::Price), 0.0);
    }
}
