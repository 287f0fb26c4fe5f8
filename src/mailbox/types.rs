//! Mailbox data types — labels, headers, MIME parts, messages.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// A named mailbox category with a stable id. Unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// One message header. Names are not unique within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// One MIME part of a message body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    /// MIME type, e.g. `text/plain` or `application/pdf`.
    pub mime_type: String,
    /// base64url-encoded body payload, when the part carries one.
    pub body: Option<String>,
    /// Nested parts for multipart messages.
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Whether this part or any nested part has the given MIME type.
    pub fn contains_mime_type(&self, mime_type: &str) -> bool {
        self.mime_type == mime_type || self.parts.iter().any(|p| p.contains_mime_type(mime_type))
    }
}

/// An email message as delivered by the mailbox service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    /// Short plain-text preview of the body.
    pub snippet: String,
    /// All headers, in wire order.
    pub headers: Vec<Header>,
    /// Body part tree; absent for metadata-only fetches.
    pub payload: Option<MessagePart>,
}

impl Message {
    /// Look up a header value by exact (case-sensitive) name.
    ///
    /// When a header name repeats, the LAST occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    /// The `From` header value, or empty.
    pub fn from(&self) -> &str {
        self.header("From").unwrap_or_default()
    }

    /// The `Subject` header value, or empty.
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or_default()
    }

    /// All headers rendered as `name: value` lines, one per header,
    /// in wire order.
    pub fn header_lines(&self) -> String {
        let mut out = String::new();
        for h in &self.headers {
            out.push_str(&h.name);
            out.push_str(": ");
            out.push_str(&h.value);
            out.push('\n');
        }
        out
    }

    /// Whether any MIME part of the message has the given type.
    pub fn has_part_of_type(&self, mime_type: &str) -> bool {
        self.payload
            .as_ref()
            .is_some_and(|p| p.contains_mime_type(mime_type))
    }
}

/// Decode a base64url body payload into text.
///
/// Accepts both padded and unpadded encodings; decoded bytes that are not
/// valid UTF-8 are replaced lossily rather than rejected.
pub fn decode_body(data: &str) -> Result<String, String> {
    let bytes = URL_SAFE
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data))
        .map_err(|e| format!("invalid base64url payload: {e}"))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
