//! Event envelope broadcast to debate subscribers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debate::DebateStatus;
use crate::judge::JudgeResult;
use crate::message::Message;

/// Typed event payloads, tagged on the wire as `{"type": …, "payload": …}`
///
/// Round numbers are 1-indexed and turn numbers 0-indexed in every payload,
/// matching the committed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    /// Synthesized per subscriber at attach time; never part of the log
    ConnectionEstablished {
        status: DebateStatus,
        current_round: u32,
        current_turn: u32,
        message_count: usize,
    },
    DebateStarted {
        topic: String,
        num_rounds: u32,
        num_agents: usize,
    },
    RoundStarted {
        round_number: u32,
        total_rounds: u32,
    },
    AgentThinking {
        agent_id: String,
        agent_name: String,
        round_number: u32,
        turn_number: u32,
    },
    MessageReceived {
        message: Message,
    },
    TurnComplete {
        round_number: u32,
        turn_number: u32,
    },
    RoundComplete {
        round_number: u32,
    },
    JudgingStarted {
        message_count: usize,
    },
    JudgeResult {
        result: JudgeResult,
    },
    DebateComplete {
        winner_id: Option<String>,
        winner_name: Option<String>,
        total_messages: usize,
    },
    Error {
        error_kind: String,
        error_message: String,
    },
}

impl EventKind {
    /// Wire name of the event type
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ConnectionEstablished { .. } => "connection_established",
            EventKind::DebateStarted { .. } => "debate_started",
            EventKind::RoundStarted { .. } => "round_started",
            EventKind::AgentThinking { .. } => "agent_thinking",
            EventKind::MessageReceived { .. } => "message_received",
            EventKind::TurnComplete { .. } => "turn_complete",
            EventKind::RoundComplete { .. } => "round_complete",
            EventKind::JudgingStarted { .. } => "judging_started",
            EventKind::JudgeResult { .. } => "judge_result",
            EventKind::DebateComplete { .. } => "debate_complete",
            EventKind::Error { .. } => "error",
        }
    }
}

/// One event on a debate's topic
///
/// Serializes to `{type, payload, debate_id, timestamp}` with an ISO-8601
/// UTC timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateEvent {
    #[serde(flatten)]
    pub kind: EventKind,
    pub debate_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl DebateEvent {
    /// Stamp an event with the current time
    pub fn new(debate_id: Uuid, kind: EventKind) -> Self {
        Self {
            kind,
            debate_id,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_type_payload_and_id() {
        let debate_id = Uuid::new_v4();
        let event = DebateEvent::new(
            debate_id,
            EventKind::RoundStarted {
                round_number: 1,
                total_rounds: 3,
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "round_started");
        assert_eq!(value["payload"]["round_number"], 1);
        assert_eq!(value["payload"]["total_rounds"], 3);
        assert_eq!(value["debate_id"], debate_id.to_string());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn envelope_round_trips() {
        let event = DebateEvent::new(
            Uuid::new_v4(),
            EventKind::Error {
                error_kind: "upstream_unavailable".to_string(),
                error_message: "retries exhausted".to_string(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: DebateEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind.name(), "error");
    }
}
