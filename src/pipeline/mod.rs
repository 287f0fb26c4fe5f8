//! Message categorization pipeline.
//!
//! Both batch flows live here:
//! 1. `corpus` — labeled-mail → training samples, feeding `model::trainer`
//! 2. `categorize` — unread mail → ordered rule evaluation → label mutation
//!
//! Every loop over messages isolates one item's failure from the rest of
//! the batch: per-message problems become `SkipReason` values, logged and
//! counted, never propagated.

pub mod categorize;
pub mod corpus;
pub mod rules;

pub use categorize::{Categorizer, CategorizeReport};
pub use corpus::{CorpusBuilder, CorpusReport};
pub use rules::{Category, Rule};

/// Why one message was left out of a batch.
///
/// A skip is a value, not an error — the loops log it and continue.
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// No body payload anywhere in the MIME tree.
    MissingBody,
    /// A part had a MIME type the extractor does not understand.
    UnknownMimeType(String),
    /// Body payload present but not decodable.
    UndecodablePayload(String),
    /// The mailbox service failed while fetching this message.
    Fetch(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody => write!(f, "no body payload"),
            Self::UnknownMimeType(mime) => write!(f, "unknown MIME type: {mime}"),
            Self::UndecodablePayload(reason) => write!(f, "undecodable payload: {reason}"),
            Self::Fetch(reason) => write!(f, "fetch failed: {reason}"),
        }
    }
}
