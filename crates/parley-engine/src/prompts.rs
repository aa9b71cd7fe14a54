//! Deterministic prompt construction and judge-response parsing
//!
//! Pure functions, no I/O. The block formats are part of the engine's
//! observable behavior and stay stable across versions: transcripts use
//! 1-indexed rounds and 0-indexed turns, matching the committed history.

use parley_core::{AgentConfig, AgentScore, JudgeResult, Message};

/// Judge output that could not be turned into a result
#[derive(Debug, thiserror::Error)]
pub enum JudgeParseError {
    #[error("no structured block found in judge output")]
    NoJson,
    #[error("judge output is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("no usable agent scores in judge output")]
    NoScores,
}

/// System prompt for a debater's turn
pub fn build_debater_prompt(
    agent: &AgentConfig,
    topic: &str,
    current_round: u32,
    total_rounds: u32,
) -> String {
    format!(
        "{}\n\n\
         DEBATE CONTEXT:\n\
         - Topic: {}\n\
         - Your stance: {}\n\
         - Current round: {} of {}\n\n\
         INSTRUCTIONS:\n\
         - Present clear arguments supporting your position\n\
         - Respond to opposing arguments from previous turns\n\
         - Maintain your persona and debate style\n\
         - Be persuasive but respectful\n\
         - Aim for 200-400 words per response",
        agent.system_prompt.trim(),
        topic,
        agent.stance,
        current_round,
        total_rounds
    )
}

/// Debate history rendered as the single user message for the next turn
pub fn build_history_context(
    history: &[Message],
    topic: &str,
    current_round: u32,
    total_rounds: u32,
) -> String {
    if history.is_empty() {
        return format!(
            "DEBATE TOPIC: {topic}\n\
             ROUND: {current_round} of {total_rounds}\n\n\
             DEBATE HISTORY:\n\
             (No previous messages)\n\n\
             YOUR TURN: Please provide your opening statement."
        );
    }

    let transcript = history
        .iter()
        .map(|msg| {
            format!(
                "[Round {}, Turn {}] {} ({}): {}",
                msg.round_number, msg.turn_number, msg.agent_name, msg.stance, msg.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "DEBATE TOPIC: {topic}\n\
         ROUND: {current_round} of {total_rounds}\n\n\
         DEBATE HISTORY:\n\
         {transcript}\n\n\
         YOUR TURN: Please provide your response."
    )
}

/// System prompt for the judge
pub fn build_judge_prompt(judge: &AgentConfig, topic: &str, agents: &[AgentConfig]) -> String {
    let participants = agents
        .iter()
        .map(|a| format!("- {} ({})", a.name, a.stance))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n\
         DEBATE TOPIC: {}\n\n\
         PARTICIPANTS:\n\
         {}\n\n\
         TASK:\n\
         1. Score each participant 0-10 on: argument quality, logic, evidence, rebuttals, persuasiveness\n\
         2. Provide detailed reasoning for each score\n\
         3. Identify key arguments from each side\n\
         4. Declare the winner (highest score)\n\n\
         Respond in JSON format:\n\
         {{\n\
         \x20 \"summary\": \"Overall debate analysis\",\n\
         \x20 \"agent_scores\": [\n\
         \x20   {{\"agent_id\": \"...\", \"agent_name\": \"...\", \"score\": 8.5, \"reasoning\": \"...\"}}\n\
         \x20 ],\n\
         \x20 \"winner_id\": \"...\",\n\
         \x20 \"winner_name\": \"...\",\n\
         \x20 \"key_arguments\": [\"...\", \"...\"]\n\
         }}",
        judge.system_prompt.trim(),
        topic,
        participants
    )
}

/// Full transcript rendered as the judge's user message
pub fn build_judge_context(history: &[Message], topic: &str) -> String {
    let transcript = history
        .iter()
        .map(|msg| {
            format!(
                "[Round {}, Turn {}] {} ({}):\n{}",
                msg.round_number, msg.turn_number, msg.agent_name, msg.stance, msg.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "DEBATE TOPIC: {topic}\n\n\
         FULL TRANSCRIPT:\n\
         {transcript}\n\n\
         Please evaluate the debate and provide your judgment in the specified JSON format."
    )
}

/// Parse the judge's reply into a [`JudgeResult`], salvaging partial output.
///
/// The first well-formed JSON object in the text is used. `agent_scores` is
/// the one field that must be present and usable; a missing or invalid
/// `winner_id` is re-derived as the highest-scoring debater (ties broken by
/// earliest position in the configuration), `summary` defaults to empty and
/// `key_arguments` to none. Entries for unknown agents are ignored; scores
/// are clamped into 0–10.
pub fn parse_judge_response(
    text: &str,
    agents: &[AgentConfig],
) -> Result<JudgeResult, JudgeParseError> {
    let block = extract_json_object(strip_code_fences(text)).ok_or(JudgeParseError::NoJson)?;
    let value: serde_json::Value =
        serde_json::from_str(block).map_err(|e| JudgeParseError::InvalidJson(e.to_string()))?;

    let raw_scores = value
        .get("agent_scores")
        .and_then(|v| v.as_array())
        .ok_or(JudgeParseError::NoScores)?;

    let mut agent_scores: Vec<AgentScore> = Vec::new();
    for entry in raw_scores {
        let Some(agent_id) = entry.get("agent_id").and_then(|v| v.as_str()) else {
            continue;
        };
        let Some(agent) = agents.iter().find(|a| a.agent_id == agent_id) else {
            continue;
        };
        if agent_scores.iter().any(|s| s.agent_id == agent_id) {
            continue;
        }
        let Some(score) = entry.get("score").and_then(|v| v.as_f64()) else {
            continue;
        };
        agent_scores.push(AgentScore {
            agent_id: agent_id.to_string(),
            agent_name: entry
                .get("agent_name")
                .and_then(|v| v.as_str())
                .unwrap_or(&agent.name)
                .to_string(),
            score: score.clamp(0.0, 10.0),
            reasoning: entry
                .get("reasoning")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    if agent_scores.is_empty() {
        return Err(JudgeParseError::NoScores);
    }

    let winner_id = value
        .get("winner_id")
        .and_then(|v| v.as_str())
        .filter(|id| agents.iter().any(|a| a.agent_id == *id))
        .map(str::to_string)
        .unwrap_or_else(|| derive_winner(&agent_scores, agents));

    let winner_name = agents
        .iter()
        .find(|a| a.agent_id == winner_id)
        .map(|a| a.name.clone())
        .unwrap_or_default();

    let summary = value
        .get("summary")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let key_arguments = value
        .get("key_arguments")
        .and_then(|v| v.as_array())
        .map(|args| {
            args.iter()
                .filter_map(|a| a.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(JudgeResult {
        summary,
        agent_scores,
        winner_id,
        winner_name,
        key_arguments,
    })
}

/// Highest score wins; ties go to the debater configured earliest
fn derive_winner(scores: &[AgentScore], agents: &[AgentConfig]) -> String {
    let mut best: Option<(&str, f64)> = None;
    for agent in agents {
        let Some(score) = scores.iter().find(|s| s.agent_id == agent.agent_id) else {
            continue;
        };
        match best {
            Some((_, top)) if score.score <= top => {}
            _ => best = Some((&agent.agent_id, score.score)),
        }
    }
    best.map(|(id, _)| id.to_string()).unwrap_or_default()
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// First balanced `{…}` block, string- and escape-aware
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in text.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}
