//! Response validator and parser.
//!
//! Converts raw language-service output into an [`AnalysisResult`]. The
//! upstream text is untrusted: it may wrap JSON in prose or markdown fences,
//! omit fields, use wrong types, or invent labels. Only a complete structural
//! failure (no JSON object at all, or no sentiment at all) is an error.
//! Everything else is repaired toward a documented default and flagged on the
//! result via `was_repaired`.
//!
//! ## Repair rules
//!
//! | Problem                              | Outcome                          |
//! |--------------------------------------|----------------------------------|
//! | `confidence` missing or non-numeric  | 0.5                              |
//! | number outside `[0, 1]`              | clamped                          |
//! | numeric string (`"0.8"`)             | parsed, then clamped             |
//! | unknown `overallSentiment` label     | `Neutral`                        |
//! | unknown aspect / emotion key         | dropped, not flagged             |
//! | `emotions` given as a label array    | each label at intensity 0.5      |
//! | `aspects` given as an array of items | converted by their `aspect` key  |
//! | non-string phrase entries            | skipped                          |
//!
//! Owned by: agent-parser

use review_core::{
    AnalysisResult, Aspect, AspectAssessment, AspectBreakdown, Emotion, RawResponse, ReviewError,
    ReviewResult, Sentiment,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Value substituted for missing or non-numeric confidences and intensities.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const SENTIMENT_KEYS: &[&str] = &["overallSentiment", "overall_sentiment", "sentiment"];
const CONFIDENCE_KEYS: &[&str] = &["confidence"];
const ASPECT_KEYS: &[&str] = &["aspects"];
const EMOTION_KEYS: &[&str] = &["emotions"];
const KEY_PHRASE_KEYS: &[&str] = &["keyPhrases", "key_phrases"];
const SUMMARY_KEYS: &[&str] = &["summary"];
const EVIDENCE_KEYS: &[&str] = &["evidencePhrases", "evidence_phrases", "evidence", "quote"];

/// Parses a raw response into a validated result.
///
/// # Errors
///
/// [`ReviewError::MalformedResponse`] when the text contains no parseable JSON object,
/// or when the object carries no sentiment field at all. The raw text is kept
/// in the error.
pub fn parse_response(raw: &RawResponse) -> ReviewResult<AnalysisResult> {
    let body = raw.body();
    let object = locate_json_object(body).map_err(|err| match err {
        Some(err) => ReviewError::malformed(format!("invalid JSON object: {err}"), body),
        None => ReviewError::malformed("no JSON object found in response", body),
    })?;

    let sentiment_value = field(&object, SENTIMENT_KEYS)
        .ok_or_else(|| ReviewError::malformed("response has no overallSentiment", body))?;

    let mut repairs = Repairs::default();
    let overall_sentiment = coerce_sentiment(sentiment_value, "overallSentiment", &mut repairs);

    let confidence = match field(&object, CONFIDENCE_KEYS) {
        Some(value) => coerce_unit(value, "confidence", &mut repairs),
        None => {
            repairs.note("confidence missing");
            DEFAULT_CONFIDENCE
        }
    };

    let mut result = AnalysisResult::new(overall_sentiment, confidence);

    if let Some(value) = present(&object, ASPECT_KEYS) {
        result.aspects = parse_aspects(value, &mut repairs);
    }
    if let Some(value) = present(&object, EMOTION_KEYS) {
        result.emotions = parse_emotions(value, &mut repairs);
    }
    if let Some(value) = present(&object, KEY_PHRASE_KEYS) {
        result.key_phrases = string_list(value, "keyPhrases", &mut repairs);
    }
    if let Some(value) = present(&object, SUMMARY_KEYS) {
        match value {
            Value::String(summary) => result.summary = summary.trim().to_string(),
            _ => repairs.note("summary is not a string"),
        }
    }

    result.was_repaired = repairs.any();
    Ok(result)
}

/// Finds the first well-formed JSON object in free text.
///
/// Each `{` is tried as a starting point in order; the first position that
/// parses as a complete object wins. Text before and after the object
/// (including markdown fences) is ignored.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    locate_json_object(text).ok()
}

/// Like [`extract_json_object`], but reports the first parse failure when no
/// object is found. A balanced `{...}` span that fails to parse is skipped as
/// a whole, so an object nested inside it never stands in for it.
fn locate_json_object(text: &str) -> Result<Map<String, Value>, Option<serde_json::Error>> {
    let mut first_error = None;
    let mut resume_at = 0;

    for (start, _) in text.match_indices('{') {
        if start < resume_at {
            continue;
        }
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => return Ok(object),
            Some(Err(err)) => {
                if let Some(len) = balanced_span(&text[start..]) {
                    resume_at = start + len;
                    first_error.get_or_insert(err);
                }
            }
            _ => {}
        }
    }

    Err(first_error)
}

/// Byte length of the brace-balanced span opening at the start of `text`,
/// skipping braces inside JSON strings. `None` if it never closes.
fn balanced_span(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }

    None
}

// ============================================================================
// Repair tracking
// ============================================================================

/// Accumulates field-level repairs made while parsing one response.
#[derive(Debug, Default)]
struct Repairs {
    count: usize,
}

impl Repairs {
    fn note(&mut self, what: &str) {
        debug!(repair = what, "repaired upstream field");
        self.count += 1;
    }

    fn any(&self) -> bool {
        self.count > 0
    }
}

// ============================================================================
// Field helpers
// ============================================================================

/// First of `keys` present in the object, including explicit nulls.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// Like [`field`], but treats an explicit null as absent.
fn present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    field(object, keys).filter(|value| !value.is_null())
}

fn coerce_sentiment(value: &Value, what: &str, repairs: &mut Repairs) -> Sentiment {
    match value.as_str().and_then(Sentiment::from_label) {
        Some(sentiment) => sentiment,
        None => {
            debug!(field = what, value = %value, "unrecognized sentiment label");
            repairs.note("sentiment label outside enumeration");
            Sentiment::Neutral
        }
    }
}

/// Coerces a confidence or intensity into `[0, 1]`.
fn coerce_unit(value: &Value, what: &str, repairs: &mut Repairs) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let parsed = text.trim().parse::<f64>().ok();
            if parsed.is_some() {
                repairs.note("numeric value given as string");
            }
            parsed
        }
        _ => None,
    };

    match parsed.filter(|n| n.is_finite()) {
        Some(n) if (0.0..=1.0).contains(&n) => n,
        Some(n) => {
            debug!(field = what, value = n, "clamping out-of-range value");
            repairs.note("value outside [0, 1]");
            n.clamp(0.0, 1.0)
        }
        None => {
            debug!(field = what, value = %value, "non-numeric value, using default");
            repairs.note("non-numeric value");
            DEFAULT_CONFIDENCE
        }
    }
}

/// Collects non-empty strings, skipping other entries. A bare string is
/// accepted as a one-element list.
fn string_list(value: &Value, what: &str, repairs: &mut Repairs) -> Vec<String> {
    match value {
        Value::Array(items) => {
            let mut phrases = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str().map(str::trim) {
                    Some("") => {}
                    Some(phrase) => phrases.push(phrase.to_string()),
                    None => {
                        debug!(field = what, "skipping non-string entry");
                        repairs.note("non-string list entry");
                    }
                }
            }
            phrases
        }
        Value::String(single) => {
            repairs.note("list given as a single string");
            let single = single.trim();
            if single.is_empty() {
                Vec::new()
            } else {
                vec![single.to_string()]
            }
        }
        _ => {
            repairs.note("list has wrong type");
            Vec::new()
        }
    }
}

// ============================================================================
// Aspects
// ============================================================================

fn parse_aspects(value: &Value, repairs: &mut Repairs) -> AspectBreakdown {
    let mut breakdown = AspectBreakdown::new();

    match value {
        Value::Object(entries) => {
            for (key, entry) in entries {
                let Some(aspect) = Aspect::from_label(key) else {
                    debug!(aspect = %key, "dropping aspect outside enumeration");
                    continue;
                };
                if let Some(assessment) = parse_assessment(entry, repairs) {
                    breakdown.insert(aspect, assessment);
                }
            }
        }
        // `[{"aspect": "Delivery", "sentiment": ..., "quote": ...}, ...]`
        Value::Array(items) => {
            repairs.note("aspects given as an array");
            for item in items {
                let Some(label) = item.get("aspect").and_then(Value::as_str) else {
                    repairs.note("aspect item without name");
                    continue;
                };
                let Some(aspect) = Aspect::from_label(label) else {
                    debug!(aspect = %label, "dropping aspect outside enumeration");
                    continue;
                };
                if let Some(assessment) = parse_assessment(item, repairs) {
                    breakdown.insert(aspect, assessment);
                }
            }
        }
        _ => repairs.note("aspects has wrong type"),
    }

    breakdown
}

fn parse_assessment(entry: &Value, repairs: &mut Repairs) -> Option<AspectAssessment> {
    match entry {
        Value::Object(fields) => {
            let sentiment = match field(fields, &["sentiment"]) {
                Some(value) => coerce_sentiment(value, "aspect.sentiment", repairs),
                None => {
                    repairs.note("aspect sentiment missing");
                    Sentiment::Neutral
                }
            };
            let confidence = match field(fields, CONFIDENCE_KEYS) {
                Some(value) => coerce_unit(value, "aspect.confidence", repairs),
                None => {
                    repairs.note("aspect confidence missing");
                    DEFAULT_CONFIDENCE
                }
            };
            let evidence_phrases = present(fields, EVIDENCE_KEYS)
                .map(|value| string_list(value, "evidencePhrases", repairs))
                .unwrap_or_default();

            Some(AspectAssessment {
                sentiment,
                confidence,
                evidence_phrases,
            })
        }
        // `"Delivery": "Negative"`
        Value::String(_) => {
            repairs.note("aspect given as a bare label");
            Some(AspectAssessment::new(
                coerce_sentiment(entry, "aspect", repairs),
                DEFAULT_CONFIDENCE,
            ))
        }
        _ => {
            repairs.note("aspect entry has wrong type");
            None
        }
    }
}

// ============================================================================
// Emotions
// ============================================================================

fn parse_emotions(value: &Value, repairs: &mut Repairs) -> BTreeMap<Emotion, f64> {
    let mut emotions = BTreeMap::new();

    match value {
        Value::Object(entries) => {
            for (key, intensity) in entries {
                match Emotion::from_label(key) {
                    Some(emotion) => {
                        emotions.insert(emotion, coerce_unit(intensity, "emotion", repairs));
                    }
                    None => debug!(emotion = %key, "dropping emotion outside enumeration"),
                }
            }
        }
        // `["Joy", "Satisfaction"]`
        Value::Array(labels) => {
            repairs.note("emotions given as a label array");
            for label in labels.iter().filter_map(Value::as_str) {
                match Emotion::from_label(label) {
                    Some(emotion) => {
                        emotions.insert(emotion, DEFAULT_CONFIDENCE);
                    }
                    None => debug!(emotion = %label, "dropping emotion outside enumeration"),
                }
            }
        }
        _ => repairs.note("emotions has wrong type"),
    }

    emotions
}
