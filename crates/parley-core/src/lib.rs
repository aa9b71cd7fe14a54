//! # Parley Core
//!
//! Domain types for the Parley debate orchestration engine.
//!
//! A debate is a turn-based conversation between N≥2 model-backed agents
//! arguing a proposition over a fixed number of rounds, optionally scored
//! by a judge agent at the end. Everything that crosses a component
//! boundary lives here as a closed, serde-tagged schema:
//!
//! - [`DebateConfig`] / [`AgentConfig`] — immutable setup submitted by clients
//! - [`Message`] — one committed agent turn
//! - [`JudgeResult`] — scores, winner and summary from the judge
//! - [`DebateState`] — the mutable record owned by the store
//! - [`DebateEvent`] — the wire envelope broadcast to subscribers

pub mod agent;
pub mod debate;
pub mod event;
pub mod judge;
pub mod message;

pub use agent::{AgentConfig, AgentRole, ModelBinding, ProviderTag};
pub use debate::{ConfigError, DebateConfig, DebateState, DebateStatus};
pub use event::{DebateEvent, EventKind};
pub use judge::{AgentScore, JudgeResult};
pub use message::Message;
