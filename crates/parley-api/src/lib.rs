//! # Parley API
//!
//! JSON-over-HTTP and WebSocket shell around the debate engine.
//!
//! The shell stays thin: request parsing, error→status mapping, CORS and
//! graceful shutdown live here; every debate semantic lives in
//! `parley-engine`. Subscribers attach over `/api/ws/{id}` and receive a
//! `connection_established` snapshot, the retained event backlog, then the
//! live stream to end-of-stream.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use server::{init_tracing, run, ServerConfig};
pub use state::AppState;
