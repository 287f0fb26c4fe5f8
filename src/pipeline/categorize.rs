//! Categorizer — ensures labels, harvests sent history, classifies unread
//! mail, and files each message under its category label.
//!
//! Construction performs all setup I/O (any failure there is fatal).
//! Classification itself is pure; the batch loop isolates per-message
//! failures and keeps going.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::mailbox::{MailboxService, Message};
use crate::model::TrainedModel;
use crate::pipeline::SkipReason;
use crate::pipeline::rules::{
    AttachmentRule, Category, KnownCorrespondentRule, ModelRule, NewsletterKeywordRule, Rule,
};

/// Query and cap for the sent-history harvest.
pub const SENT_HISTORY_QUERY: &str = "in:sent";
pub const SENT_HISTORY_MAX: u32 = 1000;

/// Query for the classification batch.
pub const UNREAD_QUERY: &str = "is:unread";

/// The system label removed from every classified message.
pub const INBOX_LABEL_ID: &str = "INBOX";

/// Diagnostics from one categorize run.
#[derive(Debug, Clone, Default)]
pub struct CategorizeReport {
    /// Messages classified and filed.
    pub processed: usize,
    /// Messages skipped (fetch or label-apply failure).
    pub skipped: usize,
    /// Label name → count of messages filed under it.
    pub counts: Vec<(String, usize)>,
}

/// The classification pipeline, holding the ordered rule list and the
/// label-name → id map for applying results.
pub struct Categorizer {
    mailbox: Arc<dyn MailboxService>,
    rules: Vec<Box<dyn Rule>>,
    labels_by_name: HashMap<String, String>,
}

impl Categorizer {
    /// Build the pipeline: ensure the reserved category labels exist,
    /// harvest the sent history, and assemble the rule list.
    ///
    /// The model rule is included only when a model is supplied; without
    /// one the keyword and attachment rules carry the fallback path.
    pub async fn new(
        mailbox: Arc<dyn MailboxService>,
        model: Option<TrainedModel>,
    ) -> Result<Self, Error> {
        let labels_by_name = ensure_reserved_labels(mailbox.as_ref()).await?;

        info!(max = SENT_HISTORY_MAX, "Harvesting sent history");
        let sent_to = harvest_sent_history(mailbox.as_ref()).await?;
        info!(correspondents = sent_to.len(), "Sent history ready");

        let mut rules: Vec<Box<dyn Rule>> =
            vec![Box::new(KnownCorrespondentRule::new(sent_to))];
        if let Some(model) = model {
            rules.push(Box::new(ModelRule::new(model)));
        }
        rules.push(Box::new(NewsletterKeywordRule));
        rules.push(Box::new(AttachmentRule));

        Ok(Self {
            mailbox,
            rules,
            labels_by_name,
        })
    }

    /// Classify one message: first firing rule wins, default *unclassified*.
    ///
    /// Pure — label application is a separate step.
    pub fn classify(&self, message: &Message) -> String {
        for rule in &self.rules {
            if let Some(label) = rule.evaluate(message) {
                debug!(id = %message.id, rule = rule.name(), label = %label, "Rule fired");
                return label;
            }
        }
        Category::Unclassified.as_str().to_string()
    }

    /// Classify up to `max` unread messages and file each one.
    ///
    /// Listing failures are fatal; everything per-message is logged,
    /// counted, and skipped.
    pub async fn run(&self, max: u32) -> Result<CategorizeReport, Error> {
        let ids = self.mailbox.list_message_ids(UNREAD_QUERY, max).await?;
        let total = ids.len();
        info!(total, "Categorizing unread messages");

        let mut report = CategorizeReport::default();
        for (position, id) in ids.iter().enumerate() {
            let message = match self.mailbox.get_message(id).await {
                Ok(m) => m,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    let skip = SkipReason::Fetch(e.to_string());
                    warn!(id = %id, reason = %skip, "Skipping message");
                    report.skipped += 1;
                    continue;
                }
            };

            let label = self.classify(&message);
            info!(
                n = position + 1,
                total,
                sender = message.from(),
                subject = message.subject(),
                label = %label,
                "Classified"
            );

            match self.file_message(id, &label).await {
                Ok(filed) => {
                    report.processed += 1;
                    bump(&mut report.counts, &filed);
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping message: label apply failed");
                    report.skipped += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            "Categorize run complete"
        );
        Ok(report)
    }

    /// Apply the chosen label and pull the message out of the inbox.
    /// Returns the label name actually applied.
    ///
    /// A model prediction naming a label the mailbox no longer has falls
    /// back to *unclassified* rather than failing the message.
    async fn file_message(
        &self,
        id: &str,
        label: &str,
    ) -> Result<String, crate::error::MailboxError> {
        let (name, label_id) = match self.labels_by_name.get(label) {
            Some(label_id) => (label, label_id),
            None => {
                warn!(id = %id, label = %label, "Predicted label missing from mailbox");
                let fallback = Category::Unclassified.as_str();
                let label_id = self.labels_by_name.get(fallback).ok_or_else(|| {
                    crate::error::MailboxError::MissingLabel {
                        name: fallback.to_string(),
                    }
                })?;
                (fallback, label_id)
            }
        };

        self.mailbox
            .apply_label(id, label_id, INBOX_LABEL_ID)
            .await?;
        Ok(name.to_string())
    }
}

/// Create any missing reserved category labels (idempotent) and return the
/// full label-name → id map.
pub async fn ensure_reserved_labels(
    mailbox: &dyn MailboxService,
) -> Result<HashMap<String, String>, Error> {
    let existing = mailbox.list_labels().await?;
    let mut by_name: HashMap<String, String> = existing
        .into_iter()
        .map(|l| (l.name, l.id))
        .collect();

    for category in Category::ALL {
        let name = category.as_str();
        if !by_name.contains_key(name) {
            info!(label = name, "Creating missing category label");
            let created = mailbox.create_label(name).await?;
            by_name.insert(created.name, created.id);
        }
    }

    Ok(by_name)
}

/// Collect every address the mailbox owner has written to, from up to the
/// most recent `SENT_HISTORY_MAX` sent messages. `To` header values are
/// kept verbatim; a message that cannot be fetched is skipped.
pub async fn harvest_sent_history(
    mailbox: &dyn MailboxService,
) -> Result<HashSet<String>, Error> {
    let ids = mailbox
        .list_message_ids(SENT_HISTORY_QUERY, SENT_HISTORY_MAX)
        .await?;

    let mut addresses = HashSet::new();
    for id in ids {
        let message = match mailbox.get_message(&id).await {
            Ok(m) => m,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping sent message");
                continue;
            }
        };
        for header in &message.headers {
            if header.name == "To" {
                addresses.insert(header.value.clone());
            }
        }
    }

    Ok(addresses)
}

fn bump(counts: &mut Vec<(String, usize)>, label: &str) {
    match counts.iter_mut().find(|(name, _)| name == label) {
        Some((_, n)) => *n += 1,
        None => counts.push((label.to_string(), 1)),
    }
}
