//! Agent configuration and model bindings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an agent within a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Argues a stance during the rounds
    Debater,
    /// Scores the transcript after the final round
    Judge,
}

/// Known model providers
///
/// Closed set: unknown tags are rejected at the ingress boundary by serde.
/// `Ollama` is the local provider and needs no credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl ProviderTag {
    /// Whether this provider runs locally and works without an API key
    pub fn is_local(&self) -> bool {
        matches!(self, ProviderTag::Ollama)
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ProviderTag::Anthropic => "anthropic",
            ProviderTag::OpenAi => "openai",
            ProviderTag::Ollama => "ollama",
        };
        f.write_str(tag)
    }
}

/// How to reach a specific model: provider, model name and credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Provider backend to dispatch to
    pub provider: ProviderTag,
    /// Model name as the provider knows it (e.g. "claude-3-5-sonnet-20241022")
    pub model_name: String,
    /// Name of the environment variable holding the API key.
    /// May be absent for local providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env_var: Option<String>,
    /// Endpoint override, used for local providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ModelBinding {
    /// `provider/model` label used in logs, error context and exports
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model_name)
    }
}

/// Configuration for a single debate participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique identifier within the debate
    pub agent_id: String,
    /// Display name
    pub name: String,
    /// Stance or position, conventionally "Pro"/"Con"/"Neutral"
    pub stance: String,
    /// Debater or judge
    pub role: AgentRole,
    /// Persona-defining system prompt
    pub system_prompt: String,
    /// Sampling temperature, 0.0–2.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Response token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Model binding used to generate this agent's turns
    pub model: ModelBinding,
}

fn default_temperature() -> f32 {
    1.0
}

fn default_max_tokens() -> u32 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_tag_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProviderTag::Anthropic).unwrap(),
            "\"anthropic\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderTag::OpenAi).unwrap(),
            "\"openai\""
        );
        let tag: ProviderTag = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(tag, ProviderTag::Ollama);
        assert!(serde_json::from_str::<ProviderTag>("\"mystery\"").is_err());
    }

    #[test]
    fn binding_label() {
        let binding = ModelBinding {
            provider: ProviderTag::OpenAi,
            model_name: "gpt-4o".to_string(),
            api_key_env_var: Some("OPENAI_API_KEY".to_string()),
            endpoint: None,
        };
        assert_eq!(binding.label(), "openai/gpt-4o");
    }

    #[test]
    fn agent_config_defaults() {
        let json = r#"{
            "agent_id": "a1",
            "name": "Alice",
            "stance": "Pro",
            "role": "debater",
            "system_prompt": "You argue in favor.",
            "model": {"provider": "ollama", "model_name": "llama3.1"}
        }"#;
        let agent: AgentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(agent.temperature, 1.0);
        assert_eq!(agent.max_tokens, 1024);
        assert!(agent.model.provider.is_local());
    }
}
