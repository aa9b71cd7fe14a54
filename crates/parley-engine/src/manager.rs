//! Debate lifecycle state machine and background execution

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use parley_core::{
    AgentConfig, DebateConfig, DebateEvent, DebateState, DebateStatus, EventKind, JudgeResult,
};
use parley_llm::{ChatMessage, GatewayError, ModelGateway};

use crate::broadcast::{EventBroadcaster, Subscription};
use crate::error::EngineError;
use crate::executor::TurnExecutor;
use crate::prompts;
use crate::store::DebateStore;

/// Fixed pause between turns to smooth provider rate limits
pub const TURN_DELAY: Duration = Duration::from_secs(1);

struct RunningDebate {
    cancel: CancellationToken,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

/// Lifecycle manager: validates configurations, owns the one background
/// task per running debate, and is the sole writer to a record while it is
/// `InProgress`.
///
/// `start` transitions `Created → InProgress`, spawns the execution task
/// and returns immediately; the task drives rounds, turns and the judge,
/// commits the terminal transition and closes the event topic before it
/// exits. Deleting a running debate cancels the task at its next
/// suspension point.
pub struct DebateManager {
    store: Arc<DebateStore>,
    broadcaster: Arc<EventBroadcaster>,
    gateway: Arc<ModelGateway>,
    executor: TurnExecutor,
    running: Arc<Mutex<HashMap<Uuid, RunningDebate>>>,
}

impl DebateManager {
    pub fn new(
        store: Arc<DebateStore>,
        broadcaster: Arc<EventBroadcaster>,
        gateway: Arc<ModelGateway>,
    ) -> Self {
        let executor = TurnExecutor::new(store.clone(), broadcaster.clone(), gateway.clone());
        Self {
            store,
            broadcaster,
            gateway,
            executor,
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The store backing this manager
    pub fn store(&self) -> Arc<DebateStore> {
        self.store.clone()
    }

    /// Validate a configuration and persist a fresh `Created` record
    pub fn create(&self, config: DebateConfig) -> Result<DebateState, EngineError> {
        config.validate()?;
        let state = DebateState::new(config);
        tracing::info!(
            debate_id = %state.debate_id,
            topic = %state.config.topic,
            agents = state.config.agents.len(),
            rounds = state.config.num_rounds,
            "debate created"
        );
        self.store.insert(state.clone());
        Ok(state)
    }

    /// Start executing a debate in the background.
    ///
    /// Only a debate in `Created` status starts; anything else is an
    /// `InvalidTransition`. At most one task ever runs per debate id — the
    /// status check runs under the store's entry lock, so concurrent start
    /// requests race for a single `Created → InProgress` edge.
    pub fn start(&self, debate_id: Uuid) -> Result<(), EngineError> {
        self.store.update(debate_id, |state| {
            if state.status != DebateStatus::Created {
                return Err(EngineError::InvalidTransition(format!(
                    "cannot start debate in status '{}'",
                    state.status.as_str()
                )));
            }
            state.status = DebateStatus::InProgress;
            state.started_at = Some(Utc::now());
            Ok(())
        })??;

        let cancel = CancellationToken::new();
        let run = DebateRun {
            store: self.store.clone(),
            broadcaster: self.broadcaster.clone(),
            gateway: self.gateway.clone(),
            executor: self.executor.clone(),
            debate_id,
            cancel: cancel.clone(),
        };

        // Holding the registry lock across the spawn keeps the task's
        // cleanup from observing the map before this entry lands.
        let mut running = self.running.lock().expect("running map lock poisoned");
        let registry = self.running.clone();
        let handle = tokio::spawn(async move {
            run.execute().await;
            registry
                .lock()
                .expect("running map lock poisoned")
                .remove(&debate_id);
        });
        running.insert(debate_id, RunningDebate { cancel, handle });

        tracing::info!(debate_id = %debate_id, "debate execution started");
        Ok(())
    }

    /// Remove a debate, cancelling its task first if one is running.
    ///
    /// The task observes the cancel signal at its next suspension point and
    /// exits without committing further state.
    pub fn delete(&self, debate_id: Uuid) -> Result<(), EngineError> {
        let active = self
            .running
            .lock()
            .expect("running map lock poisoned")
            .remove(&debate_id);
        if let Some(run) = active {
            run.cancel.cancel();
            tracing::info!(debate_id = %debate_id, "cancelled running debate");
        }

        self.store.remove(debate_id)?;
        self.broadcaster.remove(debate_id);
        tracing::info!(debate_id = %debate_id, "debate deleted");
        Ok(())
    }

    /// Attach a subscriber: a state snapshot plus the event stream.
    ///
    /// The subscription's backlog replays the retained log from offset
    /// zero; combined with the live channel every event is seen exactly
    /// once, in publish order.
    pub fn subscribe(&self, debate_id: Uuid) -> Result<(DebateState, Subscription), EngineError> {
        let snapshot = self.store.get(debate_id)?;
        let subscription = self.broadcaster.subscribe(debate_id);
        Ok((snapshot, subscription))
    }

    /// Whether an execution task is currently registered for this debate
    pub fn is_running(&self, debate_id: Uuid) -> bool {
        self.running
            .lock()
            .expect("running map lock poisoned")
            .contains_key(&debate_id)
    }
}

/// One background execution of a debate
struct DebateRun {
    store: Arc<DebateStore>,
    broadcaster: Arc<EventBroadcaster>,
    gateway: Arc<ModelGateway>,
    executor: TurnExecutor,
    debate_id: Uuid,
    cancel: CancellationToken,
}

impl DebateRun {
    async fn execute(self) {
        let debate_id = self.debate_id;
        match self.drive().await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => {
                tracing::info!(debate_id = %debate_id, "debate task cancelled");
            }
            Err(err) => {
                let kind = err.kind();
                let message = format!("{kind}: {err}");
                tracing::error!(debate_id = %debate_id, error = %err, "debate failed");

                let committed = self.store.update(debate_id, |state| {
                    state.status = DebateStatus::Failed;
                    state.error_message = Some(message.clone());
                    state.completed_at = Some(Utc::now());
                });
                if committed.is_err() {
                    // Deleted while failing; nothing left to record.
                    return;
                }

                self.broadcaster.publish(DebateEvent::new(
                    debate_id,
                    EventKind::Error {
                        error_kind: kind.to_string(),
                        error_message: message,
                    },
                ));
                self.broadcaster.close(debate_id);
            }
        }
    }

    async fn drive(&self) -> Result<(), EngineError> {
        let debate_id = self.debate_id;
        let config = self.store.get(debate_id)?.config;
        let total_rounds = config.num_rounds;

        self.broadcaster.publish(DebateEvent::new(
            debate_id,
            EventKind::DebateStarted {
                topic: config.topic.clone(),
                num_rounds: total_rounds,
                num_agents: config.agents.len(),
            },
        ));

        for round in 1..=total_rounds {
            self.broadcaster.publish(DebateEvent::new(
                debate_id,
                EventKind::RoundStarted {
                    round_number: round,
                    total_rounds,
                },
            ));
            tracing::info!(debate_id = %debate_id, round, total_rounds, "round started");

            for (turn, agent) in config.agents.iter().enumerate() {
                let turn = turn as u32;
                self.executor
                    .run_turn(debate_id, agent, round, turn, &self.cancel)
                    .await?;

                let last_turn =
                    round == total_rounds && turn as usize == config.agents.len() - 1;
                if !last_turn {
                    self.pause_between_turns().await?;
                }
            }

            self.broadcaster.publish(DebateEvent::new(
                debate_id,
                EventKind::RoundComplete {
                    round_number: round,
                },
            ));
        }

        let mut judge_outcome: Option<JudgeResult> = None;
        if let Some(judge) = &config.judge {
            let message_count = self.store.get(debate_id)?.message_count();
            self.broadcaster.publish(DebateEvent::new(
                debate_id,
                EventKind::JudgingStarted { message_count },
            ));
            judge_outcome = Some(self.invoke_judge(judge, &config).await?);
        }

        // Judge result and terminal status land in one commit so no
        // snapshot ever shows a judged debate that is still in progress.
        let total_messages = self.store.update(debate_id, |state| {
            state.judge_result = judge_outcome.clone();
            state.status = DebateStatus::Completed;
            state.completed_at = Some(Utc::now());
            state.history.len()
        })?;

        if let Some(result) = &judge_outcome {
            self.broadcaster.publish(DebateEvent::new(
                debate_id,
                EventKind::JudgeResult {
                    result: result.clone(),
                },
            ));
        }
        self.broadcaster.publish(DebateEvent::new(
            debate_id,
            EventKind::DebateComplete {
                winner_id: judge_outcome.as_ref().map(|r| r.winner_id.clone()),
                winner_name: judge_outcome.as_ref().map(|r| r.winner_name.clone()),
                total_messages,
            },
        ));
        self.broadcaster.close(debate_id);

        tracing::info!(
            debate_id = %debate_id,
            total_messages,
            winner = judge_outcome.as_ref().map(|r| r.winner_name.as_str()).unwrap_or("n/a"),
            "debate completed"
        );
        Ok(())
    }

    async fn invoke_judge(
        &self,
        judge: &AgentConfig,
        config: &DebateConfig,
    ) -> Result<JudgeResult, EngineError> {
        let debate_id = self.debate_id;
        let snapshot = self.store.get(debate_id)?;

        let system_prompt = prompts::build_judge_prompt(judge, &config.topic, &config.agents);
        let context = prompts::build_judge_context(&snapshot.history, &config.topic);

        tracing::info!(debate_id = %debate_id, judge = %judge.agent_id, "invoking judge");

        let reply = self
            .gateway
            .generate(
                &judge.model,
                &system_prompt,
                &[ChatMessage::user(context)],
                judge.temperature,
                judge.max_tokens,
                &self.cancel,
            )
            .await
            .map_err(|source| match source {
                GatewayError::Cancelled => EngineError::Cancelled,
                source => EngineError::JudgeFailed(source),
            })?;

        prompts::parse_judge_response(&reply, &config.agents)
            .map_err(|e| EngineError::JudgeUnparseable(e.to_string()))
    }

    async fn pause_between_turns(&self) -> Result<(), EngineError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled),
            _ = tokio::time::sleep(TURN_DELAY) => Ok(()),
        }
    }
}
