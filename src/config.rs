//! Runtime configuration, read from the environment.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Gmail REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Mailbox connection configuration.
///
/// OAuth consent and token refresh are out of scope — the adapter expects a
/// pre-obtained bearer token, either inline in `MAILSORT_TOKEN` or in the
/// file named by `MAILSORT_TOKEN_FILE`.
#[derive(Debug)]
pub struct MailboxConfig {
    /// API base URL (override for self-hosted proxies and tests).
    pub api_base: String,
    /// Mailbox user id; the API accepts `me` for the token owner.
    pub user: String,
    /// Bearer token for the mailbox API.
    pub token: SecretString,
}

impl MailboxConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = match std::env::var("MAILSORT_TOKEN") {
            Ok(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => match std::env::var("MAILSORT_TOKEN_FILE") {
                Ok(path) => std::fs::read_to_string(path)?.trim().to_string(),
                Err(_) => return Err(ConfigError::MissingEnvVar("MAILSORT_TOKEN".into())),
            },
        };

        if token.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "MAILSORT_TOKEN".into(),
                message: "token is empty".into(),
            });
        }

        let api_base = std::env::var("MAILSORT_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let user = std::env::var("MAILSORT_USER").unwrap_or_else(|_| "me".to_string());

        Ok(Self {
            api_base,
            user,
            token: SecretString::from(token),
        })
    }
}
