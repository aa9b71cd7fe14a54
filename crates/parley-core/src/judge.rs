//! Judge verdict and per-agent scoring

use serde::{Deserialize, Serialize};

/// Score assigned to one debater by the judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentScore {
    /// Id of the scored debater
    pub agent_id: String,
    /// Display name of the scored debater
    pub agent_name: String,
    /// Score in 0.0–10.0
    pub score: f64,
    /// Why the judge arrived at this score
    pub reasoning: String,
}

/// The judge's evaluation of a completed debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    /// Overall analysis of the debate
    pub summary: String,
    /// One score per debater
    pub agent_scores: Vec<AgentScore>,
    /// Id of the winning debater
    pub winner_id: String,
    /// Display name of the winning debater
    pub winner_name: String,
    /// Notable arguments the judge identified
    #[serde(default)]
    pub key_arguments: Vec<String>,
}

impl JudgeResult {
    /// Score for a specific debater, or 0.0 if the judge did not score them
    pub fn score_for(&self, agent_id: &str) -> f64 {
        self.agent_scores
            .iter()
            .find(|s| s.agent_id == agent_id)
            .map(|s| s.score)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_lookup() {
        let result = JudgeResult {
            summary: "Close match".to_string(),
            agent_scores: vec![
                AgentScore {
                    agent_id: "a1".to_string(),
                    agent_name: "Alice".to_string(),
                    score: 7.5,
                    reasoning: "Strong evidence".to_string(),
                },
                AgentScore {
                    agent_id: "a2".to_string(),
                    agent_name: "Bob".to_string(),
                    score: 6.0,
                    reasoning: "Weaker rebuttals".to_string(),
                },
            ],
            winner_id: "a1".to_string(),
            winner_name: "Alice".to_string(),
            key_arguments: vec![],
        };
        assert_eq!(result.score_for("a1"), 7.5);
        assert_eq!(result.score_for("missing"), 0.0);
    }
}
