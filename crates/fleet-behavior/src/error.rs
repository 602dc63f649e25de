//! Behavior-layer error type.
//!
//! Decision dispatch itself is total (every `BehaviorKind` has a defined
//! response), so this exists for configuration-time validation only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior configuration error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
