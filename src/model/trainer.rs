//! Model training — stratified split, fit, holdout diagnostics,
//! atomic persistence.

use std::path::Path;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::{ArtifactError, ModelError};
use crate::model::artifact::{self, ModelArtifact};
use crate::model::bayes::NaiveBayes;
use crate::model::vectorizer::TokenCountVectorizer;

/// Default fraction of the corpus held out for accuracy diagnostics.
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.1;

/// One (text, label) pair extracted from a historical labeled message.
/// Built in memory per training run, never persisted individually.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub text: String,
    pub label: String,
}

/// Diagnostics from one training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    /// Total corpus size, holdout included.
    pub samples: usize,
    /// Per-class sample counts in first-seen order.
    pub class_counts: Vec<(String, usize)>,
    /// Holdout accuracy; `None` when the holdout subset is empty.
    pub holdout_accuracy: Option<f64>,
}

/// A fitted vectorizer + classifier pair, ready to predict or persist.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    vectorizer: TokenCountVectorizer,
    classifier: NaiveBayes,
}

impl TrainedModel {
    /// Predict a label name for arbitrary text.
    pub fn predict(&self, text: &str) -> &str {
        self.classifier.predict(&self.vectorizer.transform(text))
    }

    /// Persist to the artifact path atomically (see `model::artifact`).
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let artifact = ModelArtifact::new(self.vectorizer.clone(), self.classifier.clone());
        artifact::write_atomic(&artifact, path)
    }

    /// Load from an artifact path. Absent, corrupt, or version-mismatched
    /// artifacts are fatal.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let artifact = artifact::read(path)?;
        Ok(Self {
            vectorizer: artifact.vectorizer,
            classifier: artifact.classifier,
        })
    }
}

/// Fits the feature extractor and classifier from a labeled corpus.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    holdout_fraction: f64,
    seed: Option<u64>,
}

impl ModelTrainer {
    /// Trainer with the given holdout fraction (0.0 disables the holdout).
    pub fn new(holdout_fraction: f64) -> Self {
        Self {
            holdout_fraction,
            seed: None,
        }
    }

    /// Fix the split RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Train on the corpus: stratified split, fit vocabulary and classifier
    /// on the training subset only, score the holdout if present.
    pub fn train(
        &self,
        corpus: &[TrainingSample],
    ) -> Result<(TrainedModel, TrainingReport), ModelError> {
        if corpus.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }

        let labels: Vec<&str> = corpus.iter().map(|s| s.label.as_str()).collect();
        let (train_idx, holdout_idx) = stratified_split(&labels, self.holdout_fraction, self.seed);

        info!(
            total = corpus.len(),
            train = train_idx.len(),
            holdout = holdout_idx.len(),
            "Fitting classifier"
        );

        let train_docs: Vec<String> = train_idx.iter().map(|&i| corpus[i].text.clone()).collect();
        let train_labels: Vec<String> =
            train_idx.iter().map(|&i| corpus[i].label.clone()).collect();

        let vectorizer = TokenCountVectorizer::fit(&train_docs);
        let features: Vec<Vec<u32>> = train_docs.iter().map(|d| vectorizer.transform(d)).collect();
        let classifier = NaiveBayes::train(&features, &train_labels)?;

        let model = TrainedModel {
            vectorizer,
            classifier,
        };

        let holdout_accuracy = if holdout_idx.is_empty() {
            None
        } else {
            let correct = holdout_idx
                .iter()
                .filter(|&&i| model.predict(&corpus[i].text) == corpus[i].label)
                .count();
            Some(correct as f64 / holdout_idx.len() as f64)
        };

        let report = TrainingReport {
            trained_at: Utc::now(),
            samples: corpus.len(),
            class_counts: count_classes(&labels),
            holdout_accuracy,
        };

        Ok((model, report))
    }
}

/// Split sample indices into (train, holdout) per class.
///
/// Each class contributes `round(fraction × class size)` indices to the
/// holdout, chosen by shuffling that class's indices, but never all of
/// them — at least one sample per class always stays in training.
fn stratified_split(
    labels: &[&str],
    fraction: f64,
    seed: Option<u64>,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (idx, label) in labels.iter().enumerate() {
        match groups.iter_mut().find(|(name, _)| name == label) {
            Some((_, indices)) => indices.push(idx),
            None => groups.push((label, vec![idx])),
        }
    }

    let mut train = Vec::new();
    let mut holdout = Vec::new();
    for (_, mut indices) in groups {
        indices.shuffle(&mut rng);
        let take = ((indices.len() as f64 * fraction).round() as usize).min(indices.len() - 1);
        holdout.extend(indices.drain(..take));
        train.extend(indices);
    }

    train.sort_unstable();
    holdout.sort_unstable();
    (train, holdout)
}

fn count_classes(labels: &[&str]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(name, _)| name == label) {
            Some((_, n)) => *n += 1,
            None => counts.push(((*label).to_string(), 1)),
        }
    }
    counts
}
