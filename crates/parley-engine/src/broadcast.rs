//! Per-debate event topics with ordered fan-out and late-join catch-up

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use parley_core::DebateEvent;

/// Bounded buffer per subscriber; a subscriber that falls this far behind
/// is disconnected rather than allowed to stall the publisher
pub const SUBSCRIBER_BUFFER: usize = 64;

/// A subscriber's view of a topic
///
/// `backlog` is the retained event log up to the subscription offset;
/// `receiver` yields everything published after it, gap-free and in order.
/// The receiver ends (yields `None`) once the topic closes at terminal
/// state.
pub struct Subscription {
    /// Events already on the log at subscribe time, in publish order
    pub backlog: Vec<DebateEvent>,
    /// Live events from the subscription offset onwards
    pub receiver: mpsc::Receiver<DebateEvent>,
}

impl Subscription {
    /// Log offset at which the live stream begins
    pub fn offset(&self) -> usize {
        self.backlog.len()
    }
}

#[derive(Debug, Default)]
struct Topic {
    log: Vec<DebateEvent>,
    subscribers: Vec<mpsc::Sender<DebateEvent>>,
    closed: bool,
}

/// Publish/subscribe hub, one independent topic per debate.
///
/// Publishing appends to the topic's retained log, then delivers to every
/// active subscriber without blocking: each subscriber owns a bounded
/// channel, and one whose buffer is full is dropped alone. Subscribing
/// atomically snapshots the log and registers the new channel, so the
/// backlog plus live stream contains every event exactly once.
#[derive(Debug, Default)]
pub struct EventBroadcaster {
    topics: Mutex<HashMap<Uuid, Topic>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to its debate's log and fan it out.
    ///
    /// Lagging or disconnected subscribers are removed; neither the
    /// publisher nor other subscribers are affected.
    pub fn publish(&self, event: DebateEvent) {
        let mut topics = self.topics.lock().expect("topic map lock poisoned");
        let topic = topics.entry(event.debate_id).or_default();

        topic.log.push(event.clone());

        topic.subscribers.retain(|sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        debate_id = %event.debate_id,
                        "subscriber lagging, disconnecting"
                    );
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Attach a subscriber to a debate's topic.
    ///
    /// Returns the full retained log as backlog plus a live channel starting
    /// at that offset. On a closed (terminal) topic the live channel ends
    /// immediately after the backlog.
    pub fn subscribe(&self, debate_id: Uuid) -> Subscription {
        let mut topics = self.topics.lock().expect("topic map lock poisoned");
        let topic = topics.entry(debate_id).or_default();

        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        if !topic.closed {
            topic.subscribers.push(sender);
        }
        // A closed topic drops the sender here, ending the stream at once.

        Subscription {
            backlog: topic.log.clone(),
            receiver,
        }
    }

    /// Mark a debate's topic terminal, ending every live stream once
    /// buffered events drain. The log is retained for late subscribers.
    pub fn close(&self, debate_id: Uuid) {
        let mut topics = self.topics.lock().expect("topic map lock poisoned");
        if let Some(topic) = topics.get_mut(&debate_id) {
            topic.closed = true;
            topic.subscribers.clear();
        }
    }

    /// Drop a debate's topic entirely (on delete)
    pub fn remove(&self, debate_id: Uuid) {
        let mut topics = self.topics.lock().expect("topic map lock poisoned");
        topics.remove(&debate_id);
    }

    /// Number of events retained for a debate
    pub fn log_len(&self, debate_id: Uuid) -> usize {
        let topics = self.topics.lock().expect("topic map lock poisoned");
        topics.get(&debate_id).map(|t| t.log.len()).unwrap_or(0)
    }

    /// Number of live subscribers on a debate's topic
    pub fn subscriber_count(&self, debate_id: Uuid) -> usize {
        let topics = self.topics.lock().expect("topic map lock poisoned");
        topics
            .get(&debate_id)
            .map(|t| t.subscribers.len())
            .unwrap_or(0)
    }
}
