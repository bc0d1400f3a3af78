use crate::form::FormError;
use crate::types::{Coords, WorkoutId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("The map is not available without a position (set --home or MAPTY_HOME)")]
    MapUnavailable,

    #[error("Not a map location: {0}")]
    InvalidLocation(Coords),

    #[error("Click the map to choose a location first")]
    NoPendingLocation,

    #[error("No workout with id {0}")]
    NotFound(WorkoutId),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}
