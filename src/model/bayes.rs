//! Multinomial Naive Bayes over token-count vectors.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Additive smoothing constant (Laplace).
const ALPHA: f64 = 1.0;

/// Multinomial Naive Bayes classifier.
///
/// Scores a candidate class `c` for a count vector `x` as
/// `log P(c) + Σ x[t] · log P(t|c)` with Laplace smoothing, and predicts
/// the argmax. Classes are stored in the order they were first seen during
/// training; ties break toward the earlier class. This tie-break is part
/// of the contract — predictions must be deterministic across runs and
/// across artifact reloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayes {
    /// Class names in first-seen training order.
    classes: Vec<String>,
    /// `log P(c)` per class.
    class_log_prior: Vec<f64>,
    /// `log P(t|c)` per class, per vocabulary column.
    token_log_likelihood: Vec<Vec<f64>>,
}

impl NaiveBayes {
    /// Fit priors and per-class token likelihoods from a count-vectorized
    /// training set. `features[i]` is the vector for label `labels[i]`.
    pub fn train(features: &[Vec<u32>], labels: &[String]) -> Result<Self, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }
        if features.len() != labels.len() {
            return Err(ModelError::SampleMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }

        let vocab_size = features[0].len();

        let mut classes: Vec<String> = Vec::new();
        let mut doc_counts: Vec<usize> = Vec::new();
        let mut token_totals: Vec<Vec<u64>> = Vec::new();

        for (vector, label) in features.iter().zip(labels) {
            let class_idx = match classes.iter().position(|c| c == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label.clone());
                    doc_counts.push(0);
                    token_totals.push(vec![0u64; vocab_size]);
                    classes.len() - 1
                }
            };
            doc_counts[class_idx] += 1;
            for (total, &count) in token_totals[class_idx].iter_mut().zip(vector) {
                *total += u64::from(count);
            }
        }

        let total_docs = features.len() as f64;
        let class_log_prior = doc_counts
            .iter()
            .map(|&n| (n as f64 / total_docs).ln())
            .collect();

        let token_log_likelihood = token_totals
            .iter()
            .map(|totals| {
                let class_total: u64 = totals.iter().sum();
                let denominator = class_total as f64 + ALPHA * vocab_size as f64;
                totals
                    .iter()
                    .map(|&t| ((t as f64 + ALPHA) / denominator).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            classes,
            class_log_prior,
            token_log_likelihood,
        })
    }

    /// Predict the most likely class for a count vector.
    ///
    /// The strict `>` comparison keeps the earliest class on equal scores.
    pub fn predict(&self, features: &[u32]) -> &str {
        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (idx, (prior, likelihoods)) in self
            .class_log_prior
            .iter()
            .zip(&self.token_log_likelihood)
            .enumerate()
        {
            let mut score = *prior;
            for (&count, log_p) in features.iter().zip(likelihoods) {
                if count > 0 {
                    score += f64::from(count) * log_p;
                }
            }
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        &self.classes[best_idx]
    }

    /// Class names in first-seen training order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(samples: &[(&str, &str)]) -> (crate::model::TokenCountVectorizer, NaiveBayes) {
        let docs: Vec<String> = samples.iter().map(|(t, _)| (*t).to_string()).collect();
        let labels: Vec<String> = samples.iter().map(|(_, l)| (*l).to_string()).collect();
        let vectorizer = crate::model::TokenCountVectorizer::fit(&docs);
        let features: Vec<Vec<u32>> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let bayes = NaiveBayes::train(&features, &labels).unwrap();
        (vectorizer, bayes)
    }

    #[test]
    fn learns_token_class_association() {
        let (vectorizer, bayes) = fit(&[
            ("refund unsubscribe now", "Promo"),
            ("hi John, attached is the report", "Work"),
            ("buy now limited offer", "Promo"),
        ]);

        assert_eq!(bayes.predict(&vectorizer.transform("unsubscribe refund")), "Promo");
        assert_eq!(bayes.predict(&vectorizer.transform("the report John")), "Work");
    }

    #[test]
    fn prior_decides_for_unseen_text() {
        // Nothing in the input overlaps the vocabulary, so the prior wins:
        // Promo has 2 of 3 training documents.
        let (vectorizer, bayes) = fit(&[
            ("refund unsubscribe", "Promo"),
            ("meeting notes", "Work"),
            ("buy now", "Promo"),
        ]);
        assert_eq!(bayes.predict(&vectorizer.transform("zzz qqq")), "Promo");
    }

    #[test]
    fn tie_breaks_toward_first_seen_class() {
        // Perfectly symmetric corpus: equal priors, mirrored likelihoods.
        let (vectorizer, bayes) = fit(&[("alpha", "First"), ("beta", "Second")]);
        assert_eq!(bayes.predict(&vectorizer.transform("")), "First");
        assert_eq!(bayes.predict(&vectorizer.transform("gamma")), "First");
    }

    #[test]
    fn classes_preserve_first_seen_order() {
        let (_, bayes) = fit(&[("a", "Z"), ("b", "A"), ("c", "Z")]);
        assert_eq!(bayes.classes(), &["Z".to_string(), "A".to_string()]);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(
            NaiveBayes::train(&[], &[]),
            Err(ModelError::EmptyCorpus)
        ));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let features = vec![vec![1u32]];
        assert!(matches!(
            NaiveBayes::train(&features, &[]),
            Err(ModelError::SampleMismatch { .. })
        ));
    }

    #[test]
    fn single_class_corpus_always_predicts_that_class() {
        let (vectorizer, bayes) = fit(&[("hello world", "Only")]);
        assert_eq!(bayes.predict(&vectorizer.transform("anything at all")), "Only");
    }

    #[test]
    fn smoothing_handles_tokens_unseen_for_a_class() {
        // "report" never appears in Promo documents; smoothing must keep
        // the Promo score finite.
        let (vectorizer, bayes) = fit(&[
            ("buy now", "Promo"),
            ("report attached", "Work"),
        ]);
        let prediction = bayes.predict(&vectorizer.transform("buy report"));
        assert!(prediction == "Promo" || prediction == "Work");
    }
}
