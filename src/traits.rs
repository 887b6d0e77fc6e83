//! Seams between the dispatch core and its collaborators.
//!
//! The selector only needs a distance metric and the ingress only needs a
//! store; concrete adapters live in their own modules.

use crate::error::StoreError;
use crate::model::{Coordinates, Driver};

/// Result of a point update against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// False when no record carries the requested id.
    pub matched: bool,
}

/// The external record keeper for drivers.
///
/// Implementations must not create records from `update_location`.
pub trait DriverStore: Send + Sync {
    /// A point-in-time snapshot of every driver, in listing order.
    fn list_all(&self) -> Result<Vec<Driver>, StoreError>;

    /// Overwrite the `location` of one driver, leaving every other field alone.
    fn update_location(&self, id: &str, location: Coordinates) -> Result<UpdateOutcome, StoreError>;
}

/// Straight-line distance between two coordinates.
pub trait DistanceProvider: Sync {
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64;
}
