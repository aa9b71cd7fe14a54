//! Debate configuration, state and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::agent::{AgentConfig, AgentRole};
use crate::judge::JudgeResult;
use crate::message::Message;

/// Lifecycle status of a debate
///
/// Transitions are `Created → InProgress → (Completed | Failed)`, each edge
/// taken at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    Created,
    InProgress,
    Completed,
    Failed,
}

impl DebateStatus {
    /// Whether the debate can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, DebateStatus::Completed | DebateStatus::Failed)
    }

    /// Lowercase wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DebateStatus::Created => "created",
            DebateStatus::InProgress => "in_progress",
            DebateStatus::Completed => "completed",
            DebateStatus::Failed => "failed",
        }
    }
}

/// A configuration rejected at creation time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("debate topic must not be empty")]
    EmptyTopic,
    #[error("num_rounds must be at least 1")]
    NoRounds,
    #[error("at least 2 debaters are required, got {0}")]
    TooFewAgents(usize),
    #[error("duplicate agent id '{0}'")]
    DuplicateAgentId(String),
    #[error("agent '{agent_id}': {detail}")]
    InvalidAgent { agent_id: String, detail: String },
    #[error("judge '{0}' must have the judge role")]
    JudgeRole(String),
}

/// Immutable configuration a debate is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Proposition being argued
    pub topic: String,
    /// Number of rounds; every debater speaks once per round
    pub num_rounds: u32,
    /// Participating debaters in speaking order
    pub agents: Vec<AgentConfig>,
    /// Judge invoked after the final round, if configured
    #[serde(
        rename = "judge_config",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub judge: Option<AgentConfig>,
}

impl DebateConfig {
    /// Validate the configuration, returning the first violation found.
    ///
    /// Checks: non-empty topic, at least one round, at least two debaters
    /// with unique ids and the debater role, sane sampling parameters, and
    /// the judge (if present) carrying the judge role.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if self.num_rounds < 1 {
            return Err(ConfigError::NoRounds);
        }
        if self.agents.len() < 2 {
            return Err(ConfigError::TooFewAgents(self.agents.len()));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.agent_id.as_str()) {
                return Err(ConfigError::DuplicateAgentId(agent.agent_id.clone()));
            }
            if agent.role != AgentRole::Debater {
                return Err(ConfigError::InvalidAgent {
                    agent_id: agent.agent_id.clone(),
                    detail: "participants must have the debater role".to_string(),
                });
            }
            validate_agent(agent)?;
        }

        if let Some(judge) = &self.judge {
            if judge.role != AgentRole::Judge {
                return Err(ConfigError::JudgeRole(judge.agent_id.clone()));
            }
            validate_agent(judge)?;
        }

        Ok(())
    }

    /// Ids of all debaters, in speaking order
    pub fn debater_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.agent_id.as_str()).collect()
    }
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    let fail = |detail: &str| ConfigError::InvalidAgent {
        agent_id: agent.agent_id.clone(),
        detail: detail.to_string(),
    };
    if agent.agent_id.trim().is_empty() {
        return Err(fail("agent_id must not be empty"));
    }
    if agent.name.trim().is_empty() {
        return Err(fail("name must not be empty"));
    }
    if !(0.0..=2.0).contains(&agent.temperature) {
        return Err(fail("temperature must be within 0.0–2.0"));
    }
    if agent.max_tokens < 1 {
        return Err(fail("max_tokens must be at least 1"));
    }
    if agent.model.model_name.trim().is_empty() {
        return Err(fail("model_name must not be empty"));
    }
    Ok(())
}

/// The authoritative record of one debate
///
/// Owned by the store; mutated only by the executing manager task while
/// `InProgress`. All other accessors observe deep-copied snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateState {
    /// Unique debate id
    pub debate_id: Uuid,
    /// The configuration this debate was created from
    pub config: DebateConfig,
    /// Lifecycle status
    pub status: DebateStatus,
    /// Round currently executing, 1-indexed; 0 before the first round
    pub current_round: u32,
    /// Turn currently executing within the round, 0-indexed
    pub current_turn: u32,
    /// Committed messages, ordered by (round_number, turn_number)
    pub history: Vec<Message>,
    /// Present only once the debate completed with a judge configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_result: Option<JudgeResult>,
    /// Present only when the debate failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DebateState {
    /// Fresh record in `Created` status with a new id
    pub fn new(config: DebateConfig) -> Self {
        Self {
            debate_id: Uuid::new_v4(),
            config,
            status: DebateStatus::Created,
            current_round: 0,
            current_turn: 0,
            history: Vec::new(),
            judge_result: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Look up a debater by id
    pub fn agent_by_id(&self, agent_id: &str) -> Option<&AgentConfig> {
        self.config.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Number of committed messages
    pub fn message_count(&self) -> usize {
        self.history.len()
    }
}
