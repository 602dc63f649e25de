//! Orchestrator error type.
//!
//! Assignment and negotiation are total over well-formed input, so this
//! exists for configuration-time validation only (e.g. a station list with
//! duplicate ids).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator configuration error: {0}")]
    Config(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
