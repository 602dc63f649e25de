//! Scenario and stepping errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid scenario: {0}")]
    Config(String),

    #[error(transparent)]
    Grid(#[from] fleet_grid::GridError),

    #[error("{what}: expected {expected}, got {got}")]
    CountMismatch {
        expected: usize,
        got: usize,
        what: &'static str,
    },
}

pub type SimResult<T> = Result<T, SimError>;
