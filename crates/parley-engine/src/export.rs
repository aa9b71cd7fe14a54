//! Transcript exporters: JSON, Markdown and plain text

use parley_core::{AgentRole, DebateState};

use crate::error::EngineError;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Text,
}

impl ExportFormat {
    /// Parse a client-supplied format name
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        match value {
            "json" => Ok(ExportFormat::Json),
            "markdown" => Ok(ExportFormat::Markdown),
            "text" => Ok(ExportFormat::Text),
            other => Err(EngineError::UnsupportedFormat(other.to_string())),
        }
    }

    /// MIME type of the rendered export
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Text => "text/plain",
        }
    }
}

/// Render a debate snapshot in the requested format
pub fn export_debate(state: &DebateState, format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(state).expect("debate state serializes to JSON")
        }
        ExportFormat::Markdown => to_markdown(state),
        ExportFormat::Text => to_text(state),
    }
}

fn role_name(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Debater => "debater",
        AgentRole::Judge => "judge",
    }
}

fn to_markdown(state: &DebateState) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Debate: {}", state.config.topic));
    lines.push(String::new());
    lines.push(format!("**Date:** {}", state.created_at.to_rfc3339()));
    lines.push(format!("**Rounds:** {}", state.config.num_rounds));
    lines.push(format!("**Status:** {}", state.status.as_str()));
    lines.push(String::new());

    lines.push("## Participants".to_string());
    lines.push(String::new());
    for agent in &state.config.agents {
        lines.push(format!("- **{}** ({})", agent.name, agent.stance));
        lines.push(format!("  - Model: {}", agent.model.label()));
        lines.push(format!("  - Role: {}", role_name(agent.role)));
    }
    lines.push(String::new());

    lines.push("## Debate Transcript".to_string());
    lines.push(String::new());
    let mut current_round = 0;
    for message in &state.history {
        if message.round_number != current_round {
            current_round = message.round_number;
            lines.push(format!("### Round {current_round}"));
            lines.push(String::new());
        }
        lines.push(format!("**{} ({}):**", message.agent_name, message.stance));
        lines.push(String::new());
        lines.push(message.content.clone());
        lines.push(String::new());
    }

    if let Some(result) = &state.judge_result {
        lines.push("## Judge's Decision".to_string());
        lines.push(String::new());
        lines.push(format!("**Winner:** {}", result.winner_name));
        lines.push(String::new());
        lines.push("### Summary".to_string());
        lines.push(String::new());
        lines.push(result.summary.clone());
        lines.push(String::new());

        lines.push("### Scores".to_string());
        lines.push(String::new());
        for score in &result.agent_scores {
            lines.push(format!("- **{}:** {}/10", score.agent_name, score.score));
            lines.push(format!("  - {}", score.reasoning));
            lines.push(String::new());
        }

        if !result.key_arguments.is_empty() {
            lines.push("### Key Arguments".to_string());
            lines.push(String::new());
            for argument in &result.key_arguments {
                lines.push(format!("- {argument}"));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

fn to_text(state: &DebateState) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("DEBATE: {}", state.config.topic));
    lines.push("=".repeat(80));
    lines.push(String::new());
    lines.push(format!("Date: {}", state.created_at.to_rfc3339()));
    lines.push(format!("Rounds: {}", state.config.num_rounds));
    lines.push(format!("Status: {}", state.status.as_str()));
    lines.push(String::new());

    lines.push("PARTICIPANTS:".to_string());
    lines.push("-".repeat(80));
    for agent in &state.config.agents {
        lines.push(format!("{} ({})", agent.name, agent.stance));
        lines.push(format!("  Model: {}", agent.model.label()));
        lines.push(format!("  Role: {}", role_name(agent.role)));
    }
    lines.push(String::new());

    lines.push("DEBATE TRANSCRIPT:".to_string());
    lines.push("-".repeat(80));
    lines.push(String::new());
    let mut current_round = 0;
    for message in &state.history {
        if message.round_number != current_round {
            current_round = message.round_number;
            lines.push(format!("ROUND {current_round}"));
            lines.push("-".repeat(40));
            lines.push(String::new());
        }
        lines.push(format!("{} ({}):", message.agent_name, message.stance));
        lines.push(String::new());
        lines.push(message.content.clone());
        lines.push(String::new());
    }

    if let Some(result) = &state.judge_result {
        lines.push("JUDGE'S DECISION:".to_string());
        lines.push("-".repeat(80));
        lines.push(String::new());
        lines.push(format!("Winner: {}", result.winner_name));
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.push(result.summary.clone());
        lines.push(String::new());

        lines.push("Scores:".to_string());
        for score in &result.agent_scores {
            lines.push(format!("  {}: {}/10", score.agent_name, score.score));
            lines.push(format!("    {}", score.reasoning));
            lines.push(String::new());
        }

        if !result.key_arguments.is_empty() {
            lines.push("Key Arguments:".to_string());
            for argument in &result.key_arguments {
                lines.push(format!("  - {argument}"));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
