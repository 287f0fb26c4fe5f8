//! Statistical text classification — feature extraction, Naive Bayes,
//! artifact persistence, and training.
//!
//! Everything in this module is pure synchronous code. Mailbox I/O stays
//! in `pipeline`; the only filesystem access here is the artifact.

pub mod artifact;
pub mod bayes;
pub mod trainer;
pub mod vectorizer;

pub use artifact::ModelArtifact;
pub use bayes::NaiveBayes;
pub use trainer::{ModelTrainer, TrainedModel, TrainingReport, TrainingSample};
pub use vectorizer::TokenCountVectorizer;
