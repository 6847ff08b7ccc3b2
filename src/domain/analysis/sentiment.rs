//! Lexicon-based sentiment scoring.
//!
//! A deliberately small word-list estimator: negotiation transcripts are
//! short and domain-specific, so a curated lexicon beats a general-purpose
//! model for the signal the dataset curator needs. Scores are real-valued
//! estimates in [-1, 1], not class labels.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "agree", "agreed", "appreciate", "deal", "fair", "glad", "good", "great", "happy",
        "helpful", "interested", "love", "perfect", "pleased", "reasonable", "sounds",
        "thank", "thanks", "wonderful", "works", "yes",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "angry", "bad", "cancel", "cannot", "can't", "complaint", "disappointed", "expensive",
        "frustrated", "impossible", "never", "no", "overpriced", "problem", "refuse", "ridiculous",
        "terrible", "unacceptable", "unfair", "unhappy", "won't", "worst",
    ]
    .into_iter()
    .collect()
});

/// Scores a piece of text in [-1, 1].
///
/// Returns 0.0 for text with no lexicon hits, including empty or
/// whitespace-only text.
pub fn score_sentiment(text: &str) -> f64 {
    let mut positive = 0usize;
    let mut negative = 0usize;

    for token in tokenize(text) {
        if POSITIVE_WORDS.contains(token.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(token.as_str()) {
            negative += 1;
        }
    }

    let hits = positive + negative;
    if hits == 0 {
        return 0.0;
    }

    (positive as f64 - negative as f64) / hits as f64
}

/// Lowercases and strips punctuation, keeping intra-word apostrophes so
/// contractions like "can't" match the lexicon.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|word| {
        word.chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'')
            .collect::<String>()
            .to_lowercase()
    })
}
