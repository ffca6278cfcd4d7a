//! Word tokenization for corpus statistics.
//!
//! Processing steps:
//! 1. Drop whitespace-separated chunks that look like URLs or email addresses
//! 2. Split the rest on Unicode word boundaries
//! 3. Lowercase and keep alphabetic characters only
//! 4. Filter by minimum length
//! 5. Remove stop words
//!
//! Apostrophes are stripped before the stop word check, so contractions
//! appear in the list in their collapsed form (`dont`, `ive`).

use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Common English stop words excluded from word frequencies.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren", "arent", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "cant", "could", "couldnt", "did", "didnt", "do",
    "does", "doesnt", "doing", "don", "dont", "down", "during", "each", "even", "few", "for",
    "from", "further", "get", "got", "had", "hadnt", "has", "hasnt", "have", "havent", "having",
    "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "id", "if",
    "im", "in", "into", "is", "isnt", "it", "its", "itself", "ive", "just", "ll", "me", "more",
    "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "re", "same", "she",
    "should", "shouldnt", "so", "some", "such", "than", "that", "thats", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "ve", "very", "was", "wasnt", "we",
    "were", "werent", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "wont", "would", "wouldnt", "you", "your", "youre", "yours", "yourself",
    "yourselves",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Minimum token length to keep (shorter tokens are filtered).
const MIN_TOKEN_LENGTH: usize = 3;

/// Tokenizes review text into normalized, stopword-free words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|chunk| !is_link_or_address(chunk))
        .flat_map(|chunk| chunk.unicode_words())
        .map(normalize_token)
        .filter(|token| token.chars().count() >= MIN_TOKEN_LENGTH && !is_stop_word(token))
        .collect()
}

/// Lowercased words without stop word or length filtering, for keyword
/// matching against short lexicons.
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(normalize_token)
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase()
}

fn is_link_or_address(chunk: &str) -> bool {
    chunk.contains("://") || chunk.starts_with("www.") || chunk.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_basic() {
        let tokens = tokenize("The delivery was late, and the box was crushed!");
        assert_eq!(tokens, vec!["delivery", "late", "box", "crushed"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("... ??? !!!").is_empty());
    }

    #[test]
    fn contractions_are_stop_words() {
        let tokens = tokenize("I don't think it's worth it, wasn't great");
        assert_eq!(tokens, vec!["think", "worth", "great"]);
    }

    #[test]
    fn links_and_emails_are_dropped() {
        let tokens = tokenize("see https://example.com/item or mail help@shop.example today");
        assert_eq!(tokens, vec!["see", "mail", "today"]);
    }

    #[test]
    fn digits_are_stripped() {
        let tokens = tokenize("waited 14 days for 2nd package");
        assert_eq!(tokens, vec!["waited", "days", "package"]);
    }

    #[test]
    fn words_keeps_short_and_stop_words() {
        assert_eq!(words("It WAS ok"), vec!["it", "was", "ok"]);
    }
}
