//! Committed debate messages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single committed turn in a debate
///
/// Round numbers are 1-indexed; turn numbers are 0-indexed within the round.
/// History is append-only and ordered by `(round_number, turn_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Id of the agent that produced this message
    pub agent_id: String,
    /// Display name of the agent at commit time
    pub agent_name: String,
    /// Stance the agent argued
    pub stance: String,
    /// Generated text
    pub content: String,
    /// Round this turn belongs to, 1-indexed
    pub round_number: u32,
    /// Position within the round, 0-indexed
    pub turn_number: u32,
    /// Server-assigned commit time
    pub timestamp: DateTime<Utc>,
}
