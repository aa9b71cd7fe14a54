//! Chat backend trait and common request types

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Role of a conversational message sent to a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in the conversation sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for an assistant-role message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single generation request handed to a backend
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System prompt, passed separately because providers disagree on where
    /// it goes
    pub system: String,
    /// Ordered user/assistant messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Response token cap
    pub max_tokens: u32,
}

/// Backend-level failure, classified for the gateway's retry discipline
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Connection errors, timeouts, HTTP 429 and 5xx. Retried.
    #[error("transient failure: {0}")]
    Transient(String),
    /// Credentials missing or rejected (HTTP 401/403). Never retried.
    #[error("authentication rejected: {0}")]
    Auth(String),
    /// Request rejected by the provider (other 4xx). Never retried.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// Response body could not be understood. Never retried.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Map a non-success HTTP status to its failure class
pub(crate) fn classify_status(status: StatusCode, body: &str) -> CallError {
    let detail = format!("status {}: {}", status.as_u16(), truncate(body, 200));
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        CallError::Transient(detail)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        CallError::Auth(detail)
    } else {
        CallError::Rejected(detail)
    }
}

/// Map a reqwest transport error; connection failures and timeouts are
/// transient by the retry policy
pub(crate) fn classify_transport(err: reqwest::Error) -> CallError {
    CallError::Transient(err.to_string())
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trait for provider chat backends
#[async_trait]
pub trait ChatBackend: Send + Sync + std::fmt::Debug {
    /// Provider name for logs and error context
    fn name(&self) -> &str;

    /// Generate a single completion
    async fn complete(&self, request: ChatRequest) -> Result<String, CallError>;
}
