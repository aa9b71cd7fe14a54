//! # Parley LLM
//!
//! Model gateway for Parley debate agents.
//!
//! Exposes one text-generation primitive over heterogeneous providers:
//! - Anthropic (API)
//! - OpenAI (API)
//! - Ollama (local, free)
//! - Mock (for testing)
//!
//! The [`ModelGateway`] dispatches on a [`parley_core::ModelBinding`],
//! resolves credentials from the environment, retries transient upstream
//! failures with exponential backoff and normalizes every error into a
//! stable [`GatewayError`] kind. Higher layers only ever see terminal
//! success or a normalized failure.

pub mod anthropic;
pub mod backend;
pub mod gateway;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use backend::{CallError, ChatBackend, ChatMessage, ChatRequest, ChatRole};
pub use gateway::{GatewayError, ModelGateway, INITIAL_BACKOFF, MAX_ATTEMPTS};
pub use mock::{MockBackend, MockOutcome};
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;
