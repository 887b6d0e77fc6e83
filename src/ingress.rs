//! Inbound driver location reports.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::model::Coordinates;
use crate::traits::DriverStore;

/// A location report as received, every field optional until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub driver_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A report that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidLocation {
    pub driver_id: String,
    pub location: Coordinates,
}

impl LocationReport {
    /// Every field must be present and non-empty. A coordinate of exactly 0
    /// (or NaN) counts as empty, so a report sitting on the equator or the
    /// prime meridian is rejected.
    pub fn validate(self) -> Result<ValidLocation, DispatchError> {
        let driver_id = self.driver_id.filter(|id| !id.is_empty());
        let latitude = self.latitude.filter(|&value| is_set(value));
        let longitude = self.longitude.filter(|&value| is_set(value));
        match (driver_id, latitude, longitude) {
            (Some(driver_id), Some(latitude), Some(longitude)) => Ok(ValidLocation {
                driver_id,
                location: Coordinates::new(latitude, longitude),
            }),
            _ => Err(DispatchError::InvalidRequest("Invalid request data".to_string())),
        }
    }
}

fn is_set(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Validate a report and write the new position to the store.
///
/// Unknown drivers are reported as NotFound; nothing is created.
pub fn apply_location_report<S>(store: &S, report: LocationReport) -> Result<(), DispatchError>
where
    S: DriverStore + ?Sized,
{
    let ValidLocation { driver_id, location } = report.validate()?;

    let outcome = store.update_location(&driver_id, location)?;
    if !outcome.matched {
        warn!(driver = %driver_id, "location report for unknown driver");
        return Err(DispatchError::NotFound(
            "Driver not found or location not updated".to_string(),
        ));
    }

    debug!(driver = %driver_id, lat = location.latitude, lng = location.longitude, "location updated");
    Ok(())
}
