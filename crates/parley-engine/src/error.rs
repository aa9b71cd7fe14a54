//! Engine error kinds

use parley_core::ConfigError;
use parley_llm::GatewayError;

use crate::store::StoreError;

/// Failures surfaced by the debate engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected at creation
    #[error("invalid debate configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Unknown debate id
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Lifecycle edge taken out of order, e.g. starting a running debate
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A turn's gateway call failed terminally
    #[error("turn failed for agent '{agent_id}': {source}")]
    TurnFailed {
        agent_id: String,
        #[source]
        source: GatewayError,
    },

    /// Judge call failed terminally
    #[error("judge call failed: {0}")]
    JudgeFailed(#[source] GatewayError),

    /// Judge output had no salvageable scores
    #[error("judge response could not be parsed: {0}")]
    JudgeUnparseable(String),

    /// The debate task was cancelled
    #[error("debate cancelled")]
    Cancelled,

    /// Unknown export format requested
    #[error("unsupported export format '{0}'")]
    UnsupportedFormat(String),
}

impl EngineError {
    /// Stable kind label used in error events and `error_message` records
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidConfig(_) => "invalid_config",
            EngineError::Store(StoreError::NotFound(_)) => "not_found",
            EngineError::InvalidTransition(_) => "invalid_transition",
            EngineError::TurnFailed { source, .. } => source.kind(),
            EngineError::JudgeFailed(source) => source.kind(),
            EngineError::JudgeUnparseable(_) => "judge_unparseable",
            EngineError::Cancelled => "cancelled",
            EngineError::UnsupportedFormat(_) => "unsupported_format",
        }
    }

    /// Whether this error is the task observing cancellation rather than a
    /// real failure
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            EngineError::Cancelled
                | EngineError::TurnFailed {
                    source: GatewayError::Cancelled,
                    ..
                }
                | EngineError::JudgeFailed(GatewayError::Cancelled)
        )
    }
}
