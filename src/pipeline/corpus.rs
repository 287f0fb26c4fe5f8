//! Training-corpus assembly from labeled mailbox history.
//!
//! Iterates the user's own labels, selects the trainable ones by name
//! pattern, and turns each labeled message into one `TrainingSample`.
//! Per-message problems (odd MIME structure, missing body, fetch failure)
//! skip that message only.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::mailbox::types::decode_body;
use crate::mailbox::{MailboxService, Message};
use crate::model::TrainingSample;
use crate::normalize::normalize;
use crate::pipeline::SkipReason;

/// Default per-label message cap for corpus building.
pub const DEFAULT_PER_LABEL_CAP: u32 = 500;

/// Default trainable-label selector: label names starting with a digit,
/// the mailbox owner's filing convention for classifier-ready folders.
pub const DEFAULT_LABEL_PATTERN: &str = r"^\d";

/// Diagnostics from one corpus build.
#[derive(Debug, Clone, Default)]
pub struct CorpusReport {
    /// Samples successfully extracted.
    pub samples: usize,
    /// Messages skipped, with reasons logged as they happened.
    pub skipped: usize,
    /// Labels that contributed samples, with counts.
    pub labels: Vec<(String, usize)>,
}

/// Builds a labeled training corpus from the mailbox.
pub struct CorpusBuilder {
    mailbox: Arc<dyn MailboxService>,
    label_pattern: Regex,
    excluded: HashSet<String>,
    per_label_cap: u32,
}

impl CorpusBuilder {
    pub fn new(mailbox: Arc<dyn MailboxService>, label_pattern: Regex) -> Self {
        Self {
            mailbox,
            label_pattern,
            excluded: HashSet::new(),
            per_label_cap: DEFAULT_PER_LABEL_CAP,
        }
    }

    /// Exclude labels by exact name.
    pub fn exclude(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.excluded.extend(names);
        self
    }

    /// Cap the number of messages fetched per label.
    pub fn per_label_cap(mut self, cap: u32) -> Self {
        self.per_label_cap = cap;
        self
    }

    /// Fetch and extract the corpus. Label listing failures are fatal;
    /// anything per-message is skipped and counted.
    pub async fn build(&self) -> Result<(Vec<TrainingSample>, CorpusReport), Error> {
        let labels = self.mailbox.list_labels().await?;

        let mut samples = Vec::new();
        let mut report = CorpusReport::default();

        for label in labels {
            if !self.label_pattern.is_match(&label.name) || self.excluded.contains(&label.name) {
                continue;
            }

            info!(label = %label.name, "Fetching messages for label");
            let query = format!("label:\"{}\"", label.name);
            let ids = self
                .mailbox
                .list_message_ids(&query, self.per_label_cap)
                .await?;

            let mut label_count = 0usize;
            for id in ids {
                let message = match self.mailbox.get_message(&id).await {
                    Ok(m) => m,
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    Err(e) => {
                        let skip = SkipReason::Fetch(e.to_string());
                        warn!(id = %id, reason = %skip, "Skipping message");
                        report.skipped += 1;
                        continue;
                    }
                };

                match sample_from_message(&message, &label.name) {
                    Ok(sample) => {
                        samples.push(sample);
                        label_count += 1;
                    }
                    Err(skip) => {
                        debug!(id = %id, reason = %skip, "Skipping message");
                        report.skipped += 1;
                    }
                }
            }

            if label_count > 0 {
                report.labels.push((label.name.clone(), label_count));
            }
        }

        report.samples = samples.len();
        info!(
            samples = report.samples,
            skipped = report.skipped,
            labels = report.labels.len(),
            "Corpus assembled"
        );
        Ok((samples, report))
    }
}

/// Extract one training sample from a labeled message.
///
/// The sample text is the sender and subject, a blank line, then the
/// normalized body.
pub fn sample_from_message(message: &Message, label: &str) -> Result<TrainingSample, SkipReason> {
    let body = extract_body(message)?;
    let text = format!(
        "{} {} \n\n{}",
        message.from(),
        message.subject(),
        normalize(&body)
    );
    Ok(TrainingSample {
        text,
        label: label.to_string(),
    })
}

/// Pick the body payload for training.
///
/// The top-level body wins when present. Otherwise the direct parts are
/// scanned: text and multipart/alternative parts may carry the payload
/// (the last one seen wins), and any other part type skips the message.
fn extract_body(message: &Message) -> Result<String, SkipReason> {
    let Some(payload) = &message.payload else {
        return Err(SkipReason::MissingBody);
    };

    let mut data = payload.body.as_deref();
    if data.is_none() {
        for part in &payload.parts {
            match part.mime_type.as_str() {
                "text/html" | "text/plain" | "multipart/alternative" => {
                    data = part.body.as_deref();
                }
                other => return Err(SkipReason::UnknownMimeType(other.to_string())),
            }
        }
    }

    let Some(data) = data else {
        return Err(SkipReason::MissingBody);
    };
    decode_body(data).map_err(SkipReason::UndecodablePayload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{Header, MessagePart};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn encoded(text: &str) -> String {
        URL_SAFE_NO_PAD.encode(text)
    }

    fn labeled_message(body: Option<MessagePart>) -> Message {
        Message {
            id: "m1".into(),
            snippet: "preview".into(),
            headers: vec![
                Header {
                    name: "From".into(),
                    value: "alice@example.com".into(),
                },
                Header {
                    name: "Subject".into(),
                    value: "Quarterly numbers".into(),
                },
            ],
            payload: body,
        }
    }

    #[test]
    fn sample_uses_top_level_body() {
        let msg = labeled_message(Some(MessagePart {
            mime_type: "text/html".into(),
            body: Some(encoded("<p>Revenue is <b>up</b></p>")),
            parts: vec![],
        }));

        let sample = sample_from_message(&msg, "2023 Finance").unwrap();
        assert_eq!(sample.label, "2023 Finance");
        assert_eq!(
            sample.text,
            "alice@example.com Quarterly numbers \n\nRevenue is up"
        );
    }

    #[test]
    fn sample_falls_back_to_text_part() {
        let msg = labeled_message(Some(MessagePart {
            mime_type: "multipart/alternative".into(),
            body: None,
            parts: vec![MessagePart {
                mime_type: "text/plain".into(),
                body: Some(encoded("plain words here")),
                parts: vec![],
            }],
        }));

        let sample = sample_from_message(&msg, "1 Inbox").unwrap();
        assert!(sample.text.ends_with("plain words here"));
    }

    #[test]
    fn unknown_part_type_skips() {
        let msg = labeled_message(Some(MessagePart {
            mime_type: "multipart/mixed".into(),
            body: None,
            parts: vec![MessagePart {
                mime_type: "application/zip".into(),
                body: Some(encoded("binary")),
                parts: vec![],
            }],
        }));

        assert!(matches!(
            sample_from_message(&msg, "1 Inbox"),
            Err(SkipReason::UnknownMimeType(_))
        ));
    }

    #[test]
    fn missing_body_skips() {
        let msg = labeled_message(Some(MessagePart {
            mime_type: "multipart/alternative".into(),
            body: None,
            parts: vec![],
        }));
        assert!(matches!(
            sample_from_message(&msg, "1 Inbox"),
            Err(SkipReason::MissingBody)
        ));

        let msg = labeled_message(None);
        assert!(matches!(
            sample_from_message(&msg, "1 Inbox"),
            Err(SkipReason::MissingBody)
        ));
    }

    #[test]
    fn undecodable_payload_skips() {
        let msg = labeled_message(Some(MessagePart {
            mime_type: "text/plain".into(),
            body: Some("!!!not base64!!!".into()),
            parts: vec![],
        }));
        assert!(matches!(
            sample_from_message(&msg, "1 Inbox"),
            Err(SkipReason::UndecodablePayload(_))
        ));
    }

    #[test]
    fn default_label_pattern_selects_digit_prefixed_names() {
        let pattern = Regex::new(DEFAULT_LABEL_PATTERN).unwrap();
        assert!(pattern.is_match("2023 Receipts"));
        assert!(pattern.is_match("1 Inbox"));
        assert!(!pattern.is_match("Receipts 2023"));
        assert!(!pattern.is_match("INBOX"));
    }
}
