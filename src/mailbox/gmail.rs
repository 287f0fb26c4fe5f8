//! Thin Gmail REST adapter for `MailboxService`.
//!
//! Pure plumbing: every call is a single authenticated JSON request against
//! the Gmail API, converted into the crate's mailbox types. OAuth consent
//! and token refresh are out of scope — the adapter is handed a
//! pre-obtained bearer token via `MailboxConfig`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::config::MailboxConfig;
use crate::error::MailboxError;
use crate::mailbox::types::{Header, Label, Message, MessagePart};
use crate::mailbox::MailboxService;

/// Gmail REST mailbox client.
pub struct GmailMailbox {
    http: reqwest::Client,
    api_base: String,
    user: String,
    token: SecretString,
}

impl GmailMailbox {
    /// Create a client from configuration.
    pub fn new(config: MailboxConfig) -> Result<Self, MailboxError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| MailboxError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_base: config.api_base,
            user: config.user,
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/{}/{}", self.api_base, self.user, path)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T, MailboxError> {
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.token.expose_secret())
            .query(query)
            .send()
            .await
            .map_err(|e| MailboxError::Http(e.to_string()))?;
        decode_response(response).await
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<T, MailboxError> {
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailboxError::Http(e.to_string()))?;
        decode_response(response).await
    }
}

async fn decode_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, MailboxError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(MailboxError::Api {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| MailboxError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl MailboxService for GmailMailbox {
    async fn list_labels(&self) -> Result<Vec<Label>, MailboxError> {
        let list: WireLabelList = self.get_json(self.url("labels"), &[]).await?;
        Ok(list
            .labels
            .into_iter()
            .map(|l| Label {
                id: l.id,
                name: l.name,
            })
            .collect())
    }

    async fn create_label(&self, name: &str) -> Result<Label, MailboxError> {
        let label: WireLabel = self
            .post_json(self.url("labels"), json!({ "name": name }))
            .await?;
        Ok(Label {
            id: label.id,
            name: label.name,
        })
    }

    async fn list_message_ids(&self, query: &str, max: u32) -> Result<Vec<String>, MailboxError> {
        let list: WireMessageList = self
            .get_json(
                self.url("messages"),
                &[
                    ("q", query.to_string()),
                    ("maxResults", max.to_string()),
                    ("includeSpamTrash", "false".to_string()),
                ],
            )
            .await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn get_message(&self, id: &str) -> Result<Message, MailboxError> {
        let wire: WireMessage = self.get_json(self.url(&format!("messages/{id}")), &[]).await?;
        Ok(wire.into_message())
    }

    async fn apply_label(
        &self,
        id: &str,
        add_label_id: &str,
        remove_label_id: &str,
    ) -> Result<(), MailboxError> {
        let _: serde_json::Value = self
            .post_json(
                self.url(&format!("messages/{id}/modify")),
                json!({
                    "addLabelIds": [add_label_id],
                    "removeLabelIds": [remove_label_id],
                }),
            )
            .await?;
        Ok(())
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireLabelList {
    #[serde(default)]
    labels: Vec<WireLabel>,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireMessageList {
    #[serde(default)]
    messages: Vec<WireMessageRef>,
}

#[derive(Debug, Deserialize)]
struct WireMessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    id: String,
    #[serde(default)]
    snippet: String,
    payload: Option<WirePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<WireHeader>,
    body: Option<WireBody>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WireHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireBody {
    data: Option<String>,
}

impl WireMessage {
    /// Flatten the wire payload into the crate's message type. Headers live
    /// on the top-level part in the wire format; the crate keeps them on
    /// the message itself.
    fn into_message(self) -> Message {
        let headers = self
            .payload
            .as_ref()
            .map(|p| {
                p.headers
                    .iter()
                    .map(|h| Header {
                        name: h.name.clone(),
                        value: h.value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Message {
            id: self.id,
            snippet: self.snippet,
            headers,
            payload: self.payload.map(WirePart::into_part),
        }
    }
}

impl WirePart {
    fn into_part(self) -> MessagePart {
        MessagePart {
            mime_type: self.mime_type,
            body: self.body.and_then(|b| b.data),
            parts: self.parts.into_iter().map(WirePart::into_part).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_flattens_headers() {
        let raw = r#"{
            "id": "m1",
            "snippet": "hello there",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "From", "value": "alice@example.com"},
                    {"name": "Subject", "value": "Hi"}
                ],
                "body": {"size": 0},
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": "aGk="}}
                ]
            }
        }"#;
        let wire: WireMessage = serde_json::from_str(raw).unwrap();
        let message = wire.into_message();

        assert_eq!(message.id, "m1");
        assert_eq!(message.header("From"), Some("alice@example.com"));
        assert_eq!(message.subject(), "Hi");

        let payload = message.payload.unwrap();
        assert_eq!(payload.mime_type, "multipart/alternative");
        assert_eq!(payload.body, None);
        assert_eq!(payload.parts[0].body.as_deref(), Some("aGk="));
    }

    #[test]
    fn message_list_without_matches_is_empty() {
        let raw = r#"{"resultSizeEstimate": 0}"#;
        let list: WireMessageList = serde_json::from_str(raw).unwrap();
        assert!(list.messages.is_empty());
    }
}
