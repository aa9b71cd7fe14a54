//! Ollama backend for local inference

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{classify_status, classify_transport, CallError, ChatBackend, ChatRequest};

/// Default local endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama chat API request format
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama chat API response format
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Backend for a local Ollama server
///
/// Uses `/api/chat` rather than `/api/generate` so the debate history can be
/// passed as a proper message sequence. No credential required.
#[derive(Debug)]
pub struct OllamaBackend {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, model: &str) -> Self {
        Self {
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Point at a non-default endpoint
    pub fn with_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, CallError> {
        let url = format!("{}/api/chat", self.base_url);

        let mut messages = vec![WireMessage {
            role: "system",
            content: request.system,
        }];
        messages.extend(request.messages.into_iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: m.content,
        }));

        let body = OllamaRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let api_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| CallError::Malformed(e.to_string()))?;

        Ok(api_response.message.content)
    }
}
