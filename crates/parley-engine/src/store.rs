//! Thread-safe in-memory debate repository with snapshot semantics

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use parley_core::DebateState;

/// Storage failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("debate {0} not found")]
    NotFound(Uuid),
}

/// In-memory repository of debate records.
///
/// A global `RwLock` guards the id→record map; each record sits behind its
/// own `Mutex` so mutations are serialized per debate without blocking
/// readers of other debates. Every read hands out a deep clone, so callers
/// observe immutable snapshots. Mutators run synchronously under the entry
/// lock and must not perform I/O.
#[derive(Debug, Default)]
pub struct DebateStore {
    debates: RwLock<HashMap<Uuid, Arc<Mutex<DebateState>>>>,
}

impl DebateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a freshly created record
    pub fn insert(&self, state: DebateState) {
        let mut debates = self.debates.write().expect("debate map lock poisoned");
        debates.insert(state.debate_id, Arc::new(Mutex::new(state)));
    }

    /// Snapshot of one debate
    pub fn get(&self, debate_id: Uuid) -> Result<DebateState, StoreError> {
        let entry = self.entry(debate_id)?;
        let state = entry.lock().expect("debate entry lock poisoned");
        Ok(state.clone())
    }

    /// Snapshots of all debates, oldest first
    pub fn list(&self) -> Vec<DebateState> {
        let entries: Vec<_> = {
            let debates = self.debates.read().expect("debate map lock poisoned");
            debates.values().cloned().collect()
        };
        let mut snapshots: Vec<DebateState> = entries
            .iter()
            .map(|e| e.lock().expect("debate entry lock poisoned").clone())
            .collect();
        snapshots.sort_by_key(|s| s.created_at);
        snapshots
    }

    /// Run a mutator under the per-entry lock and return its result.
    ///
    /// The mutator must be pure state manipulation: no blocking I/O, no
    /// access to other debates.
    pub fn update<T>(
        &self,
        debate_id: Uuid,
        mutate: impl FnOnce(&mut DebateState) -> T,
    ) -> Result<T, StoreError> {
        let entry = self.entry(debate_id)?;
        let mut state = entry.lock().expect("debate entry lock poisoned");
        Ok(mutate(&mut state))
    }

    /// Remove a record
    pub fn remove(&self, debate_id: Uuid) -> Result<(), StoreError> {
        let mut debates = self.debates.write().expect("debate map lock poisoned");
        debates
            .remove(&debate_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(debate_id))
    }

    /// Whether a record exists
    pub fn contains(&self, debate_id: Uuid) -> bool {
        let debates = self.debates.read().expect("debate map lock poisoned");
        debates.contains_key(&debate_id)
    }

    fn entry(&self, debate_id: Uuid) -> Result<Arc<Mutex<DebateState>>, StoreError> {
        let debates = self.debates.read().expect("debate map lock poisoned");
        debates
            .get(&debate_id)
            .cloned()
            .ok_or(StoreError::NotFound(debate_id))
    }
}
