//! mailsort — rule-and-model mailbox categorization.

pub mod config;
pub mod error;
pub mod mailbox;
pub mod model;
pub mod normalize;
pub mod pipeline;
