//! Application state shared across handlers

use std::sync::Arc;

use parley_engine::{DebateManager, DebateStore, EventBroadcaster};
use parley_llm::ModelGateway;

/// Shared handle to the engine, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    manager: Arc<DebateManager>,
    store: Arc<DebateStore>,
}

impl AppState {
    /// Wire a complete engine around the given gateway
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        let store = Arc::new(DebateStore::new());
        let broadcaster = Arc::new(EventBroadcaster::new());
        let manager = Arc::new(DebateManager::new(
            store.clone(),
            broadcaster,
            gateway,
        ));
        Self { manager, store }
    }

    /// The lifecycle manager
    pub fn manager(&self) -> &DebateManager {
        &self.manager
    }

    /// Read access to debate snapshots
    pub fn store(&self) -> &DebateStore {
        &self.store
    }
}
