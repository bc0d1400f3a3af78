//! Where the user is. The request is bounded by a timeout so a silent
//! provider cannot stall startup.

use crate::types::Coords;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeoError {
    #[error("position unavailable")]
    Unavailable,
    #[error("no position after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coords, GeoError>;
}

/// A configured position, e.g. from `--home`.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coords);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Coords, GeoError> {
        Ok(self.0)
    }
}

/// No provider at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl Geolocator for Unavailable {
    async fn current_position(&self) -> Result<Coords, GeoError> {
        Err(GeoError::Unavailable)
    }
}

pub async fn locate<G>(geo: &G, timeout: Duration) -> Result<Coords, GeoError>
where
    G: Geolocator + ?Sized,
{
    tokio::time::timeout(timeout, geo.current_position())
        .await
        .unwrap_or(Err(GeoError::Timeout(timeout)))
}
