//! Analysis request builder.
//!
//! The prompt is a fixed contract: field names and enumerations come from the
//! closed Rust enums, never from runtime data, so the parser can validate
//! against a stable schema. The only variable part is the review itself,
//! embedded as a JSON string literal so quotes inside the review cannot
//! break out of the instructions.

use review_core::{AnalysisRequest, Aspect, Emotion, ReviewText, SCHEMA_VERSION, Sentiment};
use serde_json::{Map, Value, json};

/// Upper bound on key phrases requested from the service.
const MAX_KEY_PHRASES: usize = 6;

/// Upper bound on summary length, in words.
const SUMMARY_MAX_WORDS: usize = 100;

/// Builds the request for one review. Deterministic in `text`.
pub fn build_request(text: ReviewText) -> AnalysisRequest {
    let prompt = render_prompt(text.as_str());
    AnalysisRequest::new(text, SCHEMA_VERSION, prompt, response_schema())
}

fn quoted_list(labels: impl IntoIterator<Item = &'static str>) -> String {
    labels
        .into_iter()
        .map(|label| format!("\"{label}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_prompt(review: &str) -> String {
    let sentiments = quoted_list(Sentiment::ALL.iter().map(Sentiment::as_str));
    let aspects = quoted_list(Aspect::ALL.iter().map(Aspect::as_str));
    let emotions = quoted_list(Emotion::ALL.iter().map(Emotion::as_str));
    let review_literal = Value::String(review.to_string()).to_string();

    format!(
        "Analyze the customer review below.\n\
         \n\
         You MUST respond with ONLY one JSON object. No markdown, no explanation.\n\
         \n\
         The JSON object has exactly these fields:\n\
         - \"overallSentiment\": one of {sentiments}\n\
         - \"confidence\": number between 0 and 1\n\
         - \"aspects\": object whose keys are only from {aspects}; each value is an object \
         {{\"sentiment\": one of {sentiments}, \"confidence\": number between 0 and 1, \
         \"evidencePhrases\": array of exact quotes from the review}}\n\
         - \"emotions\": object whose keys are only from {emotions}; each value is an \
         intensity between 0 and 1\n\
         - \"keyPhrases\": array of at most {MAX_KEY_PHRASES} short phrases from the review, \
         most relevant first\n\
         - \"summary\": summary of the review in {SUMMARY_MAX_WORDS} words or less\n\
         \n\
         Include only aspects and emotions the review actually expresses. \
         Do not invent other keys.\n\
         \n\
         Review (JSON string): {review_literal}\n"
    )
}

/// JSON Schema of the expected response.
fn response_schema() -> Value {
    let sentiment_enum: Vec<&str> = Sentiment::ALL.iter().map(Sentiment::as_str).collect();
    let unit = json!({ "type": "number", "minimum": 0.0, "maximum": 1.0 });

    let assessment = json!({
        "type": "object",
        "properties": {
            "sentiment": { "type": "string", "enum": sentiment_enum },
            "confidence": unit,
            "evidencePhrases": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["sentiment", "confidence", "evidencePhrases"]
    });

    let aspect_properties: Map<String, Value> = Aspect::ALL
        .iter()
        .map(|aspect| (aspect.as_str().to_string(), assessment.clone()))
        .collect();
    let emotion_properties: Map<String, Value> = Emotion::ALL
        .iter()
        .map(|emotion| (emotion.as_str().to_string(), unit.clone()))
        .collect();

    json!({
        "type": "object",
        "properties": {
            "overallSentiment": { "type": "string", "enum": sentiment_enum },
            "confidence": unit,
            "aspects": {
                "type": "object",
                "properties": aspect_properties,
                "additionalProperties": false
            },
            "emotions": {
                "type": "object",
                "properties": emotion_properties,
                "additionalProperties": false
            },
            "keyPhrases": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": MAX_KEY_PHRASES
            },
            "summary": { "type": "string" }
        },
        "required": ["overallSentiment", "confidence", "aspects", "emotions", "keyPhrases", "summary"]
    })
}
