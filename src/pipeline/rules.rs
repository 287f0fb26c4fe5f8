//! Heuristic classification rules — an ordered sequence of independent
//! predicates, each producing a label or abstaining.
//!
//! Ordering encodes a confidence hierarchy: a known personal correspondent
//! is stronger evidence than a statistical guess, and the statistical rule
//! never abstains once a model is loaded, so the keyword and attachment
//! rules are a fallback path for model-less runs.

use std::collections::HashSet;

use crate::mailbox::Message;
use crate::model::TrainedModel;

/// Reserved category labels. Created idempotently at categorizer startup,
/// never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    HasAttachment,
    Handwritten,
    Newsletter,
    Automated,
    Unclassified,
}

impl Category {
    /// All reserved categories, in ensure-exists order.
    pub const ALL: [Category; 5] = [
        Category::HasAttachment,
        Category::Handwritten,
        Category::Newsletter,
        Category::Automated,
        Category::Unclassified,
    ];

    /// The mailbox label name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasAttachment => "has-attachment",
            Self::Handwritten => "handwritten",
            Self::Newsletter => "newsletter",
            Self::Automated => "automated",
            Self::Unclassified => "unclassified",
        }
    }
}

/// One classification rule.
///
/// Rules are pure: same message, same answer. `None` means abstain —
/// defer to the next rule in sequence.
pub trait Rule: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Label name for this message, or `None` to abstain.
    fn evaluate(&self, message: &Message) -> Option<String>;
}

// ── Known correspondent ─────────────────────────────────────────────

/// Labels mail *handwritten* when the sender is someone the mailbox owner
/// has written to. The sent-history set is harvested once per run from the
/// most recent sent messages; matching is exact and case-sensitive on the
/// full `From` header value.
pub struct KnownCorrespondentRule {
    sent_to: HashSet<String>,
}

impl KnownCorrespondentRule {
    pub fn new(sent_to: HashSet<String>) -> Self {
        Self { sent_to }
    }
}

impl Rule for KnownCorrespondentRule {
    fn name(&self) -> &'static str {
        "known-correspondent"
    }

    fn evaluate(&self, message: &Message) -> Option<String> {
        let from = message.header("From")?;
        self.sent_to
            .contains(from)
            .then(|| Category::Handwritten.as_str().to_string())
    }
}

// ── Statistical model ───────────────────────────────────────────────

/// Delegates to the trained classifier. Never abstains: once this rule is
/// reached it is terminal. It is only present in the rule list when an
/// artifact was loaded.
pub struct ModelRule {
    model: TrainedModel,
}

impl ModelRule {
    pub fn new(model: TrainedModel) -> Self {
        Self { model }
    }
}

impl Rule for ModelRule {
    fn name(&self) -> &'static str {
        "statistical-model"
    }

    fn evaluate(&self, message: &Message) -> Option<String> {
        Some(self.model.predict(&model_input(message)).to_string())
    }
}

/// Classifier input text: every header as a `name: value` line, a blank
/// line, then the subject and snippet.
pub fn model_input(message: &Message) -> String {
    format!(
        "{}\n\n{} {}",
        message.header_lines(),
        message.subject(),
        message.snippet
    )
}

// ── Newsletter keywords ─────────────────────────────────────────────

/// Substrings that mark bulk mail, matched case-insensitively against the
/// snippet. English, Dutch, German, and French variants.
const NEWSLETTER_KEYWORDS: &[&str] = &[
    // English
    "unsubscribe",
    "stop receiving",
    "buy now",
    "order now",
    "view online",
    "privacy policy",
    // Dutch
    "uitschrijven",
    "stop ontvangen",
    "koop nu",
    "bestel nu",
    "bekijk online",
    "privacybeleid",
    // German
    "abmelden",
    "jetzt kaufen",
    "jetzt bestellen",
    "online ansehen",
    "datenschutz",
    // French
    "se désinscrire",
    "achetez maintenant",
    "commandez maintenant",
    "voir en ligne",
    "politique de confidentialité",
];

/// Labels mail *newsletter* on any bulk-mail keyword in the snippet.
pub struct NewsletterKeywordRule;

impl Rule for NewsletterKeywordRule {
    fn name(&self) -> &'static str {
        "newsletter-keyword"
    }

    fn evaluate(&self, message: &Message) -> Option<String> {
        let snippet = message.snippet.to_lowercase();
        NEWSLETTER_KEYWORDS
            .iter()
            .any(|kw| snippet.contains(kw))
            .then(|| Category::Newsletter.as_str().to_string())
    }
}

// ── Attachments ─────────────────────────────────────────────────────

/// Labels mail *has-attachment* when any MIME part is a PDF.
pub struct AttachmentRule;

impl Rule for AttachmentRule {
    fn name(&self) -> &'static str {
        "attachment"
    }

    fn evaluate(&self, message: &Message) -> Option<String> {
        message
            .has_part_of_type("application/pdf")
            .then(|| Category::HasAttachment.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::{Header, MessagePart};
    use crate::model::{ModelTrainer, TrainingSample};

    fn message(from: &str, subject: &str, snippet: &str) -> Message {
        Message {
            id: "m1".into(),
            snippet: snippet.into(),
            headers: vec![
                Header {
                    name: "From".into(),
                    value: from.into(),
                },
                Header {
                    name: "Subject".into(),
                    value: subject.into(),
                },
            ],
            payload: None,
        }
    }

    // ── Known correspondent ─────────────────────────────────────────

    #[test]
    fn known_sender_is_handwritten() {
        let rule = KnownCorrespondentRule::new(
            ["alice@example.com".to_string()].into_iter().collect(),
        );
        let msg = message("alice@example.com", "Hi", "buy now");
        assert_eq!(rule.evaluate(&msg).as_deref(), Some("handwritten"));
    }

    #[test]
    fn unknown_sender_abstains() {
        let rule = KnownCorrespondentRule::new(
            ["alice@example.com".to_string()].into_iter().collect(),
        );
        let msg = message("mallory@example.com", "Hi", "hello");
        assert_eq!(rule.evaluate(&msg), None);
    }

    #[test]
    fn correspondent_match_is_case_sensitive() {
        let rule = KnownCorrespondentRule::new(
            ["Alice@Example.com".to_string()].into_iter().collect(),
        );
        let msg = message("alice@example.com", "Hi", "hello");
        assert_eq!(rule.evaluate(&msg), None);
    }

    #[test]
    fn missing_from_header_abstains() {
        let rule = KnownCorrespondentRule::new(HashSet::new());
        let msg = Message {
            id: "m1".into(),
            ..Default::default()
        };
        assert_eq!(rule.evaluate(&msg), None);
    }

    // ── Newsletter keywords ─────────────────────────────────────────

    #[test]
    fn unsubscribe_snippet_is_newsletter() {
        let msg = message("x@y.com", "Deals", "Click here to UNSUBSCRIBE anytime");
        assert_eq!(
            NewsletterKeywordRule.evaluate(&msg).as_deref(),
            Some("newsletter")
        );
    }

    #[test]
    fn dutch_keyword_is_newsletter() {
        let msg = message("x@y.nl", "Aanbieding", "Klik hier om uit te schrijven: uitschrijven");
        assert_eq!(
            NewsletterKeywordRule.evaluate(&msg).as_deref(),
            Some("newsletter")
        );
    }

    #[test]
    fn plain_snippet_abstains() {
        let msg = message("x@y.com", "Lunch", "See you at noon?");
        assert_eq!(NewsletterKeywordRule.evaluate(&msg), None);
    }

    // ── Attachments ─────────────────────────────────────────────────

    #[test]
    fn pdf_part_is_has_attachment() {
        let mut msg = message("x@y.com", "Invoice", "attached");
        msg.payload = Some(MessagePart {
            mime_type: "multipart/mixed".into(),
            body: None,
            parts: vec![MessagePart {
                mime_type: "application/pdf".into(),
                body: None,
                parts: vec![],
            }],
        });
        assert_eq!(
            AttachmentRule.evaluate(&msg).as_deref(),
            Some("has-attachment")
        );
    }

    #[test]
    fn non_pdf_parts_abstain() {
        let mut msg = message("x@y.com", "Photo", "see attached");
        msg.payload = Some(MessagePart {
            mime_type: "multipart/mixed".into(),
            body: None,
            parts: vec![MessagePart {
                mime_type: "image/png".into(),
                body: None,
                parts: vec![],
            }],
        });
        assert_eq!(AttachmentRule.evaluate(&msg), None);
    }

    // ── Statistical model ───────────────────────────────────────────

    #[test]
    fn model_rule_never_abstains() {
        let corpus = vec![
            TrainingSample {
                text: "refund unsubscribe now".into(),
                label: "Promo".into(),
            },
            TrainingSample {
                text: "hi John, attached is the report".into(),
                label: "Work".into(),
            },
        ];
        let (model, _) = ModelTrainer::new(0.0).train(&corpus).unwrap();
        let rule = ModelRule::new(model);

        // Even a message with nothing in the vocabulary gets a prediction
        let msg = message("x@y.com", "zzz", "qqq www");
        assert!(rule.evaluate(&msg).is_some());
    }

    #[test]
    fn model_input_layout() {
        let msg = message("alice@example.com", "Hello", "short preview");
        let input = model_input(&msg);
        assert!(input.starts_with("From: alice@example.com\nSubject: Hello\n"));
        assert!(input.contains("\n\n"));
        assert!(input.ends_with("Hello short preview"));
    }
}
