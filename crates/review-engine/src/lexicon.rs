//! Keyword lexicon used to tag corpus rows with the aspects they mention.
//!
//! Corpus rows carry no aspect labels, so baselines come from simple keyword
//! presence. A row mentioning any keyword of an aspect contributes one sample
//! to that aspect. `Other` has no keywords and never receives samples.

use review_core::Aspect;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::tokenize::words;

static DELIVERY_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "delivery", "delivered", "deliver", "shipping", "shipped", "ship", "shipment",
        "package", "packaging", "arrived", "arrive", "arrival", "courier", "driver", "late",
        "delayed", "delay", "tracking", "parcel", "box",
    ]
    .into_iter()
    .collect()
});

static PRODUCT_QUALITY_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "quality", "product", "item", "broken", "broke", "defective", "damaged", "works",
        "worked", "working", "material", "durable", "cheap", "flimsy", "sturdy", "fake",
        "counterfeit", "used", "condition", "build",
    ]
    .into_iter()
    .collect()
});

static CUSTOMER_SERVICE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "service", "support", "customer", "refund", "refunded", "return", "returned",
        "returns", "representative", "agent", "chat", "call", "called", "email", "help",
        "helpful", "rude", "response", "replied", "account",
    ]
    .into_iter()
    .collect()
});

static PRICE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "price", "prices", "priced", "cost", "costs", "expensive", "overpriced", "value",
        "money", "deal", "discount", "charged", "charge", "fee", "fees", "prime",
        "subscription", "paid", "pay", "affordable",
    ]
    .into_iter()
    .collect()
});

fn keywords(aspect: Aspect) -> Option<&'static HashSet<&'static str>> {
    match aspect {
        Aspect::Delivery => Some(&*DELIVERY_WORDS),
        Aspect::ProductQuality => Some(&*PRODUCT_QUALITY_WORDS),
        Aspect::CustomerService => Some(&*CUSTOMER_SERVICE_WORDS),
        Aspect::Price => Some(&*PRICE_WORDS),
        Aspect::Other => None,
    }
}

/// Aspects mentioned in `text`, in aspect order.
pub fn detect_aspects(text: &str) -> Vec<Aspect> {
    let mentioned: HashSet<String> = words(text).into_iter().collect();
    Aspect::ALL
        .into_iter()
        .filter(|aspect| {
            keywords(*aspect)
                .is_some_and(|lexicon| mentioned.iter().any(|word| lexicon.contains(word.as_str())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_multiple_aspects_in_order() {
        let aspects = detect_aspects("Refund took weeks and the package arrived late.");
        assert_eq!(aspects, vec![Aspect::Delivery, Aspect::CustomerService]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_aspects("OVERPRICED"), vec![Aspect::Price]);
    }

    #[test]
    fn nothing_detected_in_unrelated_text() {
        assert!(detect_aspects("I feel fine today").is_empty());
    }

    #[test]
    fn other_is_never_detected() {
        let aspects = detect_aspects("delivery quality service price and other things");
        assert!(!aspects.contains(&Aspect::Other));
        assert_eq!(aspects.len(), 4);
    }
}
