//! Error types for mailsort.
//!
//! Fatal conditions (bad configuration, mailbox listing failures, artifact
//! problems) surface as `Error` and abort the run before or between batches.
//! Per-message conditions are NOT errors — they are `pipeline::SkipReason`
//! values consumed by the batch loops.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Training error: {0}")]
    Model(#[from] ModelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mailbox service errors.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("HTTP transport failed: {0}")]
    Http(String),

    #[error("Mailbox API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from mailbox API: {0}")]
    InvalidResponse(String),

    #[error("Label not found in mailbox: {name}")]
    MissingLabel { name: String },
}

impl MailboxError {
    /// Whether this error indicates the whole run should abort rather than
    /// skipping the current message.
    ///
    /// Auth failures mean every subsequent call will fail too; anything else
    /// is treated as a single-item failure by the batch loops.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Model artifact I/O errors.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model artifact not found at {path}")]
    Missing { path: PathBuf },

    #[error("Another writer holds the artifact lock at {path}")]
    Locked { path: PathBuf },

    #[error("Model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("Unsupported artifact version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Failed to encode model artifact: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Model training errors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Sample/label count mismatch: {features} features, {labels} labels")]
    SampleMismatch { features: usize, labels: usize },
}

/// Result type alias for mailsort.
pub type Result<T> = std::result::Result<T, Error>;
