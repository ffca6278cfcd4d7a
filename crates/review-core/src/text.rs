//! Review text preprocessing.
//!
//! [`ReviewText`] is the only way raw user input enters the pipeline: it is
//! trimmed, rejected when empty or binary, and truncated to a character cap.
//! Casing and inner whitespace are left alone since the language service
//! expects natural text.

use serde::Serialize;

use crate::error::{ReviewError, ReviewResult};

/// Default cap on review length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 5000;

/// Reviews shorter than this are flagged as not substantive.
const MIN_SUBSTANTIVE_CHARS: usize = 20;
const MIN_SUBSTANTIVE_WORDS: usize = 5;

/// Word count at which the quality score saturates.
const QUALITY_SATURATION_WORDS: f64 = 50.0;

/// Advisory quality metrics for a review. Never causes rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewQuality {
    pub word_count: usize,
    pub char_count: usize,
    pub has_punctuation: bool,
    /// 0-100, saturating at 50 words.
    pub quality_score: f64,
    /// At least 20 characters and 5 words.
    pub is_substantive: bool,
}

impl ReviewQuality {
    /// Measures a piece of text.
    pub fn measure(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        let char_count = text.chars().count();
        let has_punctuation = text.contains(['.', '!', '?']);
        let quality_score = (word_count as f64 / QUALITY_SATURATION_WORDS * 100.0).min(100.0);

        Self {
            word_count,
            char_count,
            has_punctuation,
            quality_score,
            is_substantive: char_count >= MIN_SUBSTANTIVE_CHARS
                && word_count >= MIN_SUBSTANTIVE_WORDS,
        }
    }
}

/// A bounded, validated review: non-empty after trimming and at most the
/// configured number of characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewText {
    text: String,
    truncated: bool,
    original_chars: usize,
    quality: ReviewQuality,
}

impl ReviewText {
    /// Preprocesses raw input.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::EmptyInput`] if nothing remains after trimming
    /// - [`ReviewError::BinaryInput`] if the text contains NUL or non-whitespace
    ///   control characters
    ///
    /// Overlong input is truncated, never rejected. A cap of zero is treated
    /// as one so the result is never empty.
    pub fn new(raw: &str, max_chars: usize) -> ReviewResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReviewError::EmptyInput);
        }
        if trimmed.chars().any(is_binary_char) {
            return Err(ReviewError::BinaryInput);
        }

        let max_chars = max_chars.max(1);
        let original_chars = trimmed.chars().count();
        let (text, truncated) = match trimmed.char_indices().nth(max_chars) {
            Some((cut, _)) => (trimmed[..cut].trim_end().to_string(), true),
            None => (trimmed.to_string(), false),
        };

        if truncated {
            tracing::debug!(original_chars, max_chars, "review text truncated");
        }

        let quality = ReviewQuality::measure(&text);
        Ok(Self {
            text,
            truncated,
            original_chars,
            quality,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the input exceeded the cap.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Character count of the trimmed input before truncation.
    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    pub fn char_count(&self) -> usize {
        self.quality.char_count
    }

    pub fn quality(&self) -> &ReviewQuality {
        &self.quality
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

fn is_binary_char(c: char) -> bool {
    c == '\0' || (c.is_control() && !c.is_whitespace())
}
