//! Vehicle-subsystem error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error(transparent)]
    Grid(#[from] fleet_grid::GridError),
}

pub type VehicleResult<T> = Result<T, VehicleError>;
