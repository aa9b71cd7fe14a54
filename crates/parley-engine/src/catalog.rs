//! Static catalog of providers and models exposed to clients

use serde::{Deserialize, Serialize};

use parley_core::ProviderTag;

/// Information about a specific model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub display_name: String,
    pub description: String,
    pub context_window: u32,
    pub max_output_tokens: u32,
    pub recommended: bool,
    pub pricing_tier: String,
}

/// Information about a provider and the models it serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub provider_id: ProviderTag,
    pub display_name: String,
    pub description: String,
    /// Default environment variable for the API key; `None` for local
    /// providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env_var: Option<String>,
    pub documentation_url: String,
    pub models: Vec<ModelInfo>,
}

fn model(
    model_id: &str,
    display_name: &str,
    description: &str,
    context_window: u32,
    max_output_tokens: u32,
    recommended: bool,
    pricing_tier: &str,
) -> ModelInfo {
    ModelInfo {
        model_id: model_id.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        context_window,
        max_output_tokens,
        recommended,
        pricing_tier: pricing_tier.to_string(),
    }
}

/// The curated catalog of supported providers and models
pub fn provider_catalog() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            provider_id: ProviderTag::Anthropic,
            display_name: "Anthropic".to_string(),
            description: "Claude models by Anthropic".to_string(),
            api_key_env_var: Some("ANTHROPIC_API_KEY".to_string()),
            documentation_url: "https://docs.anthropic.com/".to_string(),
            models: vec![
                model(
                    "claude-3-5-sonnet-20241022",
                    "Claude 3.5 Sonnet",
                    "Most intelligent model, balanced performance and speed",
                    200_000,
                    8_192,
                    true,
                    "standard",
                ),
                model(
                    "claude-3-opus-20240229",
                    "Claude 3 Opus",
                    "Most powerful model for complex tasks",
                    200_000,
                    4_096,
                    false,
                    "premium",
                ),
            ],
        },
        ProviderInfo {
            provider_id: ProviderTag::OpenAi,
            display_name: "OpenAI".to_string(),
            description: "GPT models by OpenAI".to_string(),
            api_key_env_var: Some("OPENAI_API_KEY".to_string()),
            documentation_url: "https://platform.openai.com/docs/".to_string(),
            models: vec![
                model(
                    "gpt-4o",
                    "GPT-4o",
                    "Fastest and most affordable flagship model",
                    128_000,
                    16_384,
                    true,
                    "standard",
                ),
                model(
                    "gpt-4-turbo",
                    "GPT-4 Turbo",
                    "Previous generation, strong reasoning",
                    128_000,
                    4_096,
                    false,
                    "standard",
                ),
            ],
        },
        ProviderInfo {
            provider_id: ProviderTag::Ollama,
            display_name: "Ollama".to_string(),
            description: "Locally hosted open models, no API key required".to_string(),
            api_key_env_var: None,
            documentation_url: "https://github.com/ollama/ollama".to_string(),
            models: vec![
                model(
                    "llama3.1",
                    "Llama 3.1",
                    "Meta's open model served locally",
                    128_000,
                    4_096,
                    true,
                    "free",
                ),
                model(
                    "mistral",
                    "Mistral 7B",
                    "Compact open model for fast local runs",
                    32_000,
                    4_096,
                    false,
                    "free",
                ),
            ],
        },
    ]
}

/// Look up one provider's catalog entry
pub fn provider_by_id(provider_id: ProviderTag) -> Option<ProviderInfo> {
    provider_catalog()
        .into_iter()
        .find(|p| p.provider_id == provider_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_all_provider_tags() {
        let catalog = provider_catalog();
        assert_eq!(catalog.len(), 3);
        for provider in &catalog {
            assert!(!provider.models.is_empty());
            assert!(provider.models.iter().any(|m| m.recommended));
        }
    }

    #[test]
    fn local_provider_needs_no_key() {
        let ollama = provider_by_id(ProviderTag::Ollama).unwrap();
        assert!(ollama.api_key_env_var.is_none());

        let anthropic = provider_by_id(ProviderTag::Anthropic).unwrap();
        assert_eq!(
            anthropic.api_key_env_var.as_deref(),
            Some("ANTHROPIC_API_KEY")
        );
    }
}
