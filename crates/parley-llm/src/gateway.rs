//! Provider dispatch, credential resolution and retry discipline

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use parley_core::{ModelBinding, ProviderTag};

use crate::anthropic::AnthropicBackend;
use crate::backend::{CallError, ChatBackend, ChatMessage, ChatRequest};
use crate::ollama::{self, OllamaBackend};
use crate::openai::OpenAiBackend;

/// Total attempts per generation, including the first
pub const MAX_ATTEMPTS: u32 = 3;
/// Backoff before the first retry; doubles per retry (1s, 2s, …)
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Normalized gateway failure
///
/// Every error carries a stable kind plus a `provider/model` context string.
/// Raw provider payloads never leak past the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Retries exhausted on transient failures, or the provider rejected
    /// the request outright
    #[error("upstream unavailable ({context}): {detail}")]
    UpstreamUnavailable { context: String, detail: String },
    /// Credentials missing or rejected
    #[error("upstream authentication failed ({context}): {detail}")]
    UpstreamAuth { context: String, detail: String },
    /// Provider returned something we could not interpret
    #[error("malformed upstream response ({context}): {detail}")]
    UpstreamMalformed { context: String, detail: String },
    /// The debate task was cancelled mid-call
    #[error("generation cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Stable kind label used in error events and failure records
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::UpstreamUnavailable { .. } => "upstream_unavailable",
            GatewayError::UpstreamAuth { .. } => "upstream_auth",
            GatewayError::UpstreamMalformed { .. } => "upstream_malformed",
            GatewayError::Cancelled => "cancelled",
        }
    }
}

/// Uniform text-generation primitive over heterogeneous providers
///
/// Dispatches on the binding's provider tag, resolves the API key from the
/// environment variable the binding names, and retries transient failures
/// up to [`MAX_ATTEMPTS`] with exponential backoff. Cancellation is observed
/// between and during attempts; an aborted request is never retried.
#[derive(Debug)]
pub struct ModelGateway {
    client: reqwest::Client,
    ollama_url: String,
    override_backend: Option<Arc<dyn ChatBackend>>,
}

impl ModelGateway {
    /// Gateway dispatching to real provider backends
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| ollama::DEFAULT_BASE_URL.to_string()),
            override_backend: None,
        }
    }

    /// Gateway that routes every binding to the given backend.
    ///
    /// Test seam: the retry and cancellation paths run unchanged while the
    /// backend is scripted.
    pub fn with_backend(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            client: reqwest::Client::new(),
            ollama_url: ollama::DEFAULT_BASE_URL.to_string(),
            override_backend: Some(backend),
        }
    }

    fn backend_for(&self, binding: &ModelBinding) -> Result<Arc<dyn ChatBackend>, GatewayError> {
        if let Some(backend) = &self.override_backend {
            return Ok(backend.clone());
        }

        let context = binding.label();
        match binding.provider {
            ProviderTag::Anthropic => {
                let key = self.resolve_api_key(binding, &context)?;
                let mut backend =
                    AnthropicBackend::new(self.client.clone(), &key, &binding.model_name);
                if let Some(endpoint) = &binding.endpoint {
                    backend = backend.with_url(endpoint);
                }
                Ok(Arc::new(backend))
            }
            ProviderTag::OpenAi => {
                let key = self.resolve_api_key(binding, &context)?;
                let mut backend =
                    OpenAiBackend::new(self.client.clone(), &key, &binding.model_name);
                if let Some(endpoint) = &binding.endpoint {
                    backend = backend.with_url(endpoint);
                }
                Ok(Arc::new(backend))
            }
            ProviderTag::Ollama => {
                let url = binding.endpoint.as_deref().unwrap_or(&self.ollama_url);
                let backend =
                    OllamaBackend::new(self.client.clone(), &binding.model_name).with_url(url);
                Ok(Arc::new(backend))
            }
        }
    }

    fn resolve_api_key(
        &self,
        binding: &ModelBinding,
        context: &str,
    ) -> Result<String, GatewayError> {
        let var = binding
            .api_key_env_var
            .as_deref()
            .ok_or_else(|| GatewayError::UpstreamAuth {
                context: context.to_string(),
                detail: "no api key reference configured".to_string(),
            })?;
        std::env::var(var).map_err(|_| GatewayError::UpstreamAuth {
            context: context.to_string(),
            detail: format!("environment variable '{var}' is not set"),
        })
    }

    /// Generate a single response for the given binding.
    ///
    /// `messages` is the ordered user/assistant conversation; the system
    /// prompt travels separately. Returns the generated text or a
    /// normalized [`GatewayError`].
    pub async fn generate(
        &self,
        binding: &ModelBinding,
        system: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        let context = binding.label();
        let backend = self.backend_for(binding)?;

        let mut delay = INITIAL_BACKOFF;
        let mut attempt = 0;
        loop {
            attempt += 1;

            let request = ChatRequest {
                system: system.to_string(),
                messages: messages.to_vec(),
                temperature,
                max_tokens,
            };

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                outcome = backend.complete(request) => outcome,
            };

            match outcome {
                Ok(text) => {
                    tracing::debug!(
                        provider = backend.name(),
                        model = %binding.model_name,
                        attempt,
                        chars = text.len(),
                        "generation succeeded"
                    );
                    return Ok(text);
                }
                Err(CallError::Transient(detail)) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        provider = backend.name(),
                        model = %binding.model_name,
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %detail,
                        "transient upstream failure, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    delay *= 2;
                }
                Err(CallError::Transient(detail)) => {
                    return Err(GatewayError::UpstreamUnavailable {
                        context,
                        detail: format!("{MAX_ATTEMPTS} attempts exhausted: {detail}"),
                    });
                }
                Err(CallError::Auth(detail)) => {
                    return Err(GatewayError::UpstreamAuth { context, detail });
                }
                Err(CallError::Rejected(detail)) => {
                    return Err(GatewayError::UpstreamUnavailable { context, detail });
                }
                Err(CallError::Malformed(detail)) => {
                    return Err(GatewayError::UpstreamMalformed { context, detail });
                }
            }
        }
    }
}

impl Default for ModelGateway {
    fn default() -> Self {
        Self::new()
    }
}
