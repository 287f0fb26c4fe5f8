//! Bag-of-words feature extraction over a fixed vocabulary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Token-count vectorizer.
///
/// The vocabulary is learned once at fit time, mapping each distinct token
/// to a column index in first-seen order. At inference time arbitrary text
/// maps to a fixed-length count vector; tokens outside the vocabulary are
/// ignored.
///
/// Tokenization splits on whitespace runs. No stemming, no case folding,
/// no n-grams — changing any of this changes model behavior without
/// changing the artifact format, so it stays exactly this simple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCountVectorizer {
    vocabulary: HashMap<String, usize>,
}

impl TokenCountVectorizer {
    /// Learn the vocabulary from training documents.
    pub fn fit(documents: &[String]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            for token in tokenize(doc) {
                let next = vocabulary.len();
                vocabulary.entry(token.to_string()).or_insert(next);
            }
        }
        Self { vocabulary }
    }

    /// Map text to a count vector over the fitted vocabulary.
    pub fn transform(&self, document: &str) -> Vec<u32> {
        let mut counts = vec![0u32; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Some(&idx) = self.vocabulary.get(token) {
                counts[idx] += 1;
            }
        }
        counts
    }

    /// Number of distinct tokens in the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Whitespace tokenization shared by fit and transform.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}
