//! Physicalization failure modes.

use bitgrid_router::RouteError;
use thiserror::Error;

/// Failure modes surfaced while converting a logical program into an
/// edge-driven one.
#[derive(Debug, Error)]
pub enum PhysicalizeError {
    /// Routing a logical input or output to its physical edge failed.
    #[error(transparent)]
    Route(#[from] RouteError),
}
