//! End-to-end engine tests over a scripted mock backend
//!
//! Each test drives a full debate through the manager and observes it the
//! way a client would: a subscription taken before (or after) start, then
//! the event stream to end-of-stream.

use std::sync::Arc;

use parley_core::{
    AgentConfig, AgentRole, DebateConfig, DebateEvent, DebateStatus, EventKind, ModelBinding,
    ProviderTag,
};
use parley_engine::{DebateManager, DebateStore, EngineError, EventBroadcaster, Subscription};
use parley_llm::{CallError, MockBackend, MockOutcome, ModelGateway};

fn debater(id: &str, name: &str, stance: &str) -> AgentConfig {
    AgentConfig {
        agent_id: id.to_string(),
        name: name.to_string(),
        stance: stance.to_string(),
        role: AgentRole::Debater,
        system_prompt: format!("You are {name}."),
        temperature: 1.0,
        max_tokens: 512,
        model: ModelBinding {
            provider: ProviderTag::Ollama,
            model_name: "llama3.1".to_string(),
            api_key_env_var: None,
            endpoint: None,
        },
    }
}

fn judge() -> AgentConfig {
    AgentConfig {
        role: AgentRole::Judge,
        ..debater("judge", "Judge", "Neutral")
    }
}

fn two_agent_config(num_rounds: u32, with_judge: bool) -> DebateConfig {
    DebateConfig {
        topic: "T".to_string(),
        num_rounds,
        agents: vec![debater("a1", "A", "Pro"), debater("a2", "B", "Con")],
        judge: with_judge.then(judge),
    }
}

fn manager_with(outcomes: Vec<MockOutcome>) -> DebateManager {
    let mock = Arc::new(MockBackend::scripted(outcomes));
    DebateManager::new(
        Arc::new(DebateStore::new()),
        Arc::new(EventBroadcaster::new()),
        Arc::new(ModelGateway::with_backend(mock)),
    )
}

fn judge_reply(a1: f64, a2: f64, winner: &str) -> String {
    serde_json::json!({
        "summary": "Overall analysis",
        "agent_scores": [
            {"agent_id": "a1", "agent_name": "A", "score": a1, "reasoning": "r1"},
            {"agent_id": "a2", "agent_name": "B", "score": a2, "reasoning": "r2"}
        ],
        "winner_id": winner,
        "winner_name": if winner == "a1" { "A" } else { "B" },
        "key_arguments": ["k1", "k2"]
    })
    .to_string()
}

/// Backlog plus live stream, drained to end-of-stream
async fn collect(subscription: Subscription) -> Vec<DebateEvent> {
    let Subscription {
        backlog,
        mut receiver,
    } = subscription;
    let mut events = backlog;
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }
    events
}

fn count(events: &[DebateEvent], name: &str) -> usize {
    events.iter().filter(|e| e.kind.name() == name).count()
}

#[tokio::test(start_paused = true)]
async fn two_agents_two_rounds_with_judge() {
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok("t_A2".to_string()),
        Ok("t_B2".to_string()),
        Ok(judge_reply(7.5, 6.0, "a1")),
    ]);
    let state = manager.create(two_agent_config(2, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let events = collect(subscription).await;

    // Committed history: 4 messages in (round, turn) order
    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Completed);
    assert_eq!(finished.history.len(), 4);
    let positions: Vec<_> = finished
        .history
        .iter()
        .map(|m| (m.round_number, m.turn_number, m.agent_id.as_str()))
        .collect();
    assert_eq!(
        positions,
        vec![(1, 0, "a1"), (1, 1, "a2"), (2, 0, "a1"), (2, 1, "a2")]
    );
    let contents: Vec<_> = finished.history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["t_A1", "t_B1", "t_A2", "t_B2"]);

    let result = finished.judge_result.as_ref().unwrap();
    assert_eq!(result.winner_id, "a1");
    assert_eq!(result.score_for("a1"), 7.5);
    assert_eq!(result.score_for("a2"), 6.0);

    // Exact event-log shape
    assert_eq!(count(&events, "debate_started"), 1);
    assert_eq!(count(&events, "round_started"), 2);
    assert_eq!(count(&events, "agent_thinking"), 4);
    assert_eq!(count(&events, "message_received"), 4);
    assert_eq!(count(&events, "turn_complete"), 4);
    assert_eq!(count(&events, "round_complete"), 2);
    assert_eq!(count(&events, "judging_started"), 1);
    assert_eq!(count(&events, "judge_result"), 1);
    assert_eq!(count(&events, "debate_complete"), 1);
    assert_eq!(count(&events, "error"), 0);

    // message_received events arrive in commit order
    let streamed: Vec<_> = events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::MessageReceived { message } => Some(message.content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(streamed, vec!["t_A1", "t_B1", "t_A2", "t_B2"]);
    assert_eq!(events.last().unwrap().kind.name(), "debate_complete");
}

#[tokio::test(start_paused = true)]
async fn three_agents_speak_in_configured_order() {
    let mock = Arc::new(MockBackend::constant("statement"));
    let manager = DebateManager::new(
        Arc::new(DebateStore::new()),
        Arc::new(EventBroadcaster::new()),
        Arc::new(ModelGateway::with_backend(mock)),
    );
    let config = DebateConfig {
        topic: "T".to_string(),
        num_rounds: 1,
        agents: vec![
            debater("x", "X", "Pro"),
            debater("y", "Y", "Con"),
            debater("z", "Z", "Neutral"),
        ],
        judge: None,
    };
    let state = manager.create(config).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Completed);
    assert!(finished.judge_result.is_none());
    let positions: Vec<_> = finished
        .history
        .iter()
        .map(|m| (m.round_number, m.turn_number, m.agent_id.as_str()))
        .collect();
    assert_eq!(positions, vec![(1, 0, "x"), (1, 1, "y"), (1, 2, "z")]);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_recover_without_duplicates() {
    let manager = manager_with(vec![
        Err(CallError::Transient("status 429".to_string())),
        Err(CallError::Transient("status 429".to_string())),
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok("t_A2".to_string()),
        Ok("t_B2".to_string()),
        Ok(judge_reply(7.5, 6.0, "a1")),
    ]);
    let state = manager.create(two_agent_config(2, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let events = collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Completed);
    assert_eq!(finished.history.len(), 4);

    // Same log shape as the failure-free run: retries are invisible
    assert_eq!(count(&events, "agent_thinking"), 4);
    assert_eq!(count(&events, "message_received"), 4);
    assert_eq!(count(&events, "turn_complete"), 4);
    assert_eq!(count(&events, "error"), 0);
}

#[tokio::test(start_paused = true)]
async fn permanent_failure_preserves_partial_history() {
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Err(CallError::Transient("status 503".to_string())),
        Err(CallError::Transient("status 503".to_string())),
        Err(CallError::Transient("status 503".to_string())),
    ]);
    let state = manager.create(two_agent_config(2, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let events = collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Failed);
    assert_eq!(finished.history.len(), 1);
    assert!(finished.judge_result.is_none());
    let error_message = finished.error_message.as_deref().unwrap();
    assert!(error_message.starts_with("upstream_unavailable"));

    assert_eq!(count(&events, "message_received"), 1);
    assert_eq!(count(&events, "round_complete"), 0);
    assert_eq!(count(&events, "judge_result"), 0);
    let last = events.last().unwrap();
    assert!(matches!(
        &last.kind,
        EventKind::Error { error_kind, .. } if error_kind == "upstream_unavailable"
    ));
}

#[tokio::test(start_paused = true)]
async fn judge_partial_output_is_salvaged() {
    let partial = serde_json::json!({
        "agent_scores": [
            {"agent_id": "a1", "agent_name": "A", "score": 8.2, "reasoning": "strong"},
            {"agent_id": "a2", "agent_name": "B", "score": 8.1, "reasoning": "close"}
        ]
    })
    .to_string();
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok(partial),
    ]);
    let state = manager.create(two_agent_config(1, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Completed);
    let result = finished.judge_result.as_ref().unwrap();
    assert_eq!(result.winner_id, "a1");
    assert_eq!(result.winner_name, "A");
    assert_eq!(result.summary, "");
    assert!(result.key_arguments.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unsalvageable_judge_output_fails_the_debate() {
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok("I refuse to answer in the requested format.".to_string()),
    ]);
    let state = manager.create(two_agent_config(1, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let events = collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Failed);
    assert_eq!(finished.history.len(), 2);
    assert!(finished
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("judge_unparseable"));
    assert_eq!(count(&events, "judging_started"), 1);
    assert_eq!(count(&events, "judge_result"), 0);
    assert_eq!(count(&events, "error"), 1);
}

#[tokio::test(start_paused = true)]
async fn late_subscriber_replays_the_full_log() {
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok("t_A2".to_string()),
        Ok("t_B2".to_string()),
        Ok(judge_reply(7.5, 6.0, "a1")),
    ]);
    let state = manager.create(two_agent_config(2, true)).unwrap();
    let id = state.debate_id;

    let (_, live) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let live_events = collect(live).await;

    // Attach after terminal state
    let (snapshot, late) = manager.subscribe(id).unwrap();
    assert_eq!(snapshot.status, DebateStatus::Completed);
    assert!(snapshot.judge_result.is_some());
    assert_eq!(late.offset(), live_events.len());

    let late_events = collect(late).await;
    assert_eq!(late_events.len(), live_events.len());
    let live_names: Vec<_> = live_events.iter().map(|e| e.kind.name()).collect();
    let late_names: Vec<_> = late_events.iter().map(|e| e.kind.name()).collect();
    assert_eq!(late_names, live_names);
}

#[tokio::test(start_paused = true)]
async fn ten_agents_one_round_completes() {
    let mock = Arc::new(MockBackend::constant("statement"));
    let manager = DebateManager::new(
        Arc::new(DebateStore::new()),
        Arc::new(EventBroadcaster::new()),
        Arc::new(ModelGateway::with_backend(mock)),
    );
    let agents: Vec<_> = (0..10)
        .map(|i| debater(&format!("agent{i}"), &format!("Agent {i}"), "Pro"))
        .collect();
    let state = manager
        .create(DebateConfig {
            topic: "T".to_string(),
            num_rounds: 1,
            agents,
            judge: None,
        })
        .unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    let events = collect(subscription).await;

    let finished = manager.store().get(id).unwrap();
    assert_eq!(finished.status, DebateStatus::Completed);
    assert_eq!(finished.history.len(), 10);
    assert_eq!(count(&events, "message_received"), 10);
}

#[tokio::test(start_paused = true)]
async fn terminal_snapshots_are_stable_and_restart_is_rejected() {
    let manager = manager_with(vec![
        Ok("t_A1".to_string()),
        Ok("t_B1".to_string()),
        Ok(judge_reply(9.0, 4.0, "a1")),
    ]);
    let state = manager.create(two_agent_config(1, true)).unwrap();
    let id = state.debate_id;

    let (_, subscription) = manager.subscribe(id).unwrap();
    manager.start(id).unwrap();
    collect(subscription).await;

    let first = manager.store().get(id).unwrap();
    let second = manager.store().get(id).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.status, DebateStatus::Completed);

    // Restarting a terminal debate has no effect
    assert!(matches!(
        manager.start(id),
        Err(EngineError::InvalidTransition(_))
    ));
    assert_eq!(manager.store().get(id).unwrap(), first);
}

#[tokio::test(start_paused = true)]
async fn deleting_a_running_debate_cancels_it() {
    let mock = Arc::new(
        MockBackend::constant("slow").with_latency(std::time::Duration::from_secs(3600)),
    );
    let manager = DebateManager::new(
        Arc::new(DebateStore::new()),
        Arc::new(EventBroadcaster::new()),
        Arc::new(ModelGateway::with_backend(mock)),
    );
    let state = manager.create(two_agent_config(2, false)).unwrap();
    let id = state.debate_id;

    manager.start(id).unwrap();
    assert!(manager.is_running(id));

    manager.delete(id).unwrap();
    assert!(!manager.store().contains(id));
    assert!(matches!(
        manager.subscribe(id),
        Err(EngineError::Store(_))
    ));
}
