//! Mailbox access — data types, the service trait, and the Gmail adapter.
//!
//! The core never talks to a mail provider directly. Everything goes
//! through `MailboxService`, a narrow async trait covering exactly the
//! operations the pipeline needs: label listing/creation, message id
//! listing, message fetch, and label mutation. `GmailMailbox` is the thin
//! REST implementation; tests substitute an in-memory one.

pub mod gmail;
pub mod types;

use async_trait::async_trait;

pub use gmail::GmailMailbox;
pub use types::{Header, Label, Message, MessagePart};

use crate::error::MailboxError;

/// Mailbox service interface — pure I/O, no classification logic.
#[async_trait]
pub trait MailboxService: Send + Sync {
    /// List all labels in the mailbox.
    async fn list_labels(&self) -> Result<Vec<Label>, MailboxError>;

    /// Create a label by name and return it.
    async fn create_label(&self, name: &str) -> Result<Label, MailboxError>;

    /// List up to `max` message ids matching a search query
    /// (e.g. `in:sent`, `is:unread`, `label:"2023 Receipts"`).
    async fn list_message_ids(&self, query: &str, max: u32) -> Result<Vec<String>, MailboxError>;

    /// Fetch a single message by id.
    async fn get_message(&self, id: &str) -> Result<Message, MailboxError>;

    /// Add one label to a message and remove another.
    async fn apply_label(
        &self,
        id: &str,
        add_label_id: &str,
        remove_label_id: &str,
    ) -> Result<(), MailboxError>;
}
