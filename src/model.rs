//! Driver records and the shipment they are matched against.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees. Values are passed through unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A driver as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(alias = "_id")]
    pub id: String,
    /// Last reported position. None until the driver first reports.
    #[serde(default)]
    pub location: Option<Coordinates>,
    pub max_weight: f64,
    /// Environmental impact, lower is better.
    pub environment_score: f64,
}

impl Driver {
    /// Spare carrying capacity once `weight` is loaded. May be negative.
    pub fn headroom(&self, weight: f64) -> f64 {
        self.max_weight - weight
    }
}

/// The delivery leg every dispatch query is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipmentContext {
    pub supplier: Coordinates,
    pub retailer: Coordinates,
    /// Weight of the shipment to be carried.
    pub current_weight: f64,
}

impl Default for ShipmentContext {
    fn default() -> Self {
        Self {
            supplier: Coordinates::new(45.6139, 43.2090),
            retailer: Coordinates::new(25.0827, 43.2707),
            current_weight: 1200.0,
        }
    }
}
