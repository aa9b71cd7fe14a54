//! # Parley Engine
//!
//! The debate execution engine: everything between the transport shell and
//! the model gateway.
//!
//! - [`DebateStore`] — concurrency-safe in-memory repository with snapshot
//!   semantics
//! - [`EventBroadcaster`] — per-debate topics with ordered delivery and
//!   late-subscriber catch-up
//! - [`TurnExecutor`] — one agent turn as a single logical unit
//! - [`DebateManager`] — the lifecycle state machine and sole writer while
//!   a debate runs
//! - prompt construction, judge-response parsing, provider/persona catalogs
//!   and transcript exporters

pub mod broadcast;
pub mod catalog;
pub mod error;
pub mod executor;
pub mod export;
pub mod manager;
pub mod personas;
pub mod prompts;
pub mod store;

pub use broadcast::{EventBroadcaster, Subscription, SUBSCRIBER_BUFFER};
pub use catalog::{provider_by_id, provider_catalog, ModelInfo, ProviderInfo};
pub use error::EngineError;
pub use executor::TurnExecutor;
pub use export::{export_debate, ExportFormat};
pub use manager::{DebateManager, TURN_DELAY};
pub use personas::{persona_by_id, persona_catalog, PersonaStyle, PersonaTemplate};
pub use store::{DebateStore, StoreError};
