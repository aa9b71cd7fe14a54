//! Single-turn execution: prompt → gateway → commit → events

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use parley_core::{AgentConfig, DebateEvent, EventKind, Message};
use parley_llm::{ChatMessage, GatewayError, ModelGateway};

use crate::broadcast::EventBroadcaster;
use crate::error::EngineError;
use crate::prompts;
use crate::store::DebateStore;

/// Executes one debater's turn as a single logical unit.
///
/// The manager runs turns strictly sequentially, so between the
/// `agent_thinking` and `turn_complete` events no other mutation touches
/// the debate. A turn that fails or is cancelled commits nothing and emits
/// no `message_received`.
#[derive(Debug, Clone)]
pub struct TurnExecutor {
    store: Arc<DebateStore>,
    broadcaster: Arc<EventBroadcaster>,
    gateway: Arc<ModelGateway>,
}

impl TurnExecutor {
    pub fn new(
        store: Arc<DebateStore>,
        broadcaster: Arc<EventBroadcaster>,
        gateway: Arc<ModelGateway>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            gateway,
        }
    }

    /// Run one turn for `agent` at `(round_number, turn_number)`.
    ///
    /// On success the message is committed to history and returned; the
    /// store's `current_round`/`current_turn` track the committed position.
    pub async fn run_turn(
        &self,
        debate_id: Uuid,
        agent: &AgentConfig,
        round_number: u32,
        turn_number: u32,
        cancel: &CancellationToken,
    ) -> Result<Message, EngineError> {
        self.broadcaster.publish(DebateEvent::new(
            debate_id,
            EventKind::AgentThinking {
                agent_id: agent.agent_id.clone(),
                agent_name: agent.name.clone(),
                round_number,
                turn_number,
            },
        ));

        let snapshot = self.store.get(debate_id)?;
        let total_rounds = snapshot.config.num_rounds;
        let system_prompt =
            prompts::build_debater_prompt(agent, &snapshot.config.topic, round_number, total_rounds);
        let context = prompts::build_history_context(
            &snapshot.history,
            &snapshot.config.topic,
            round_number,
            total_rounds,
        );

        tracing::info!(
            debate_id = %debate_id,
            agent_id = %agent.agent_id,
            round = round_number,
            turn = turn_number,
            "executing turn"
        );

        let content = self
            .gateway
            .generate(
                &agent.model,
                &system_prompt,
                &[ChatMessage::user(context)],
                agent.temperature,
                agent.max_tokens,
                cancel,
            )
            .await
            .map_err(|source| match source {
                GatewayError::Cancelled => EngineError::Cancelled,
                source => EngineError::TurnFailed {
                    agent_id: agent.agent_id.clone(),
                    source,
                },
            })?;

        let message = Message {
            agent_id: agent.agent_id.clone(),
            agent_name: agent.name.clone(),
            stance: agent.stance.clone(),
            content,
            round_number,
            turn_number,
            timestamp: Utc::now(),
        };

        self.store.update(debate_id, |state| {
            state.history.push(message.clone());
            state.current_round = round_number;
            state.current_turn = turn_number;
        })?;

        self.broadcaster.publish(DebateEvent::new(
            debate_id,
            EventKind::MessageReceived {
                message: message.clone(),
            },
        ));
        self.broadcaster.publish(DebateEvent::new(
            debate_id,
            EventKind::TurnComplete {
                round_number,
                turn_number,
            },
        ));

        Ok(message)
    }
}
