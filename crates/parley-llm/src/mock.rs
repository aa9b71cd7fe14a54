//! Mock backend for testing without upstream providers

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::backend::{CallError, ChatBackend, ChatRequest};

/// Scripted outcome for one mock call
pub type MockOutcome = Result<String, CallError>;

/// A mock chat backend driven by a script of outcomes
///
/// Each call pops the next scripted outcome; once the script is exhausted
/// the mock echoes a canned line so open-ended tests keep working. Failure
/// outcomes let tests exercise the gateway's retry discipline without a
/// network.
#[derive(Debug)]
pub struct MockBackend {
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: String,
    calls: AtomicUsize,
    latency: Duration,
}

impl MockBackend {
    /// Mock with no script: every call succeeds with the fallback text
    pub fn constant(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Mock that plays back the given outcomes in order
    pub fn scripted(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: "mock response".to_string(),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Simulate per-call latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Append another outcome to the script
    pub fn push(&self, outcome: MockOutcome) {
        self.script
            .lock()
            .expect("mock script lock poisoned")
            .push_back(outcome);
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _request: ChatRequest) -> Result<String, CallError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let next = self
            .script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();

        match next {
            Some(outcome) => outcome,
            None => Ok(self.fallback.clone()),
        }
    }
}
