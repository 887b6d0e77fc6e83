//! Driver fleet fixtures around the reference leg.

use std::sync::atomic::{AtomicUsize, Ordering};

use driver_dispatch::error::StoreError;
use driver_dispatch::model::{Coordinates, Driver, ShipmentContext};
use driver_dispatch::traits::{DriverStore, UpdateOutcome};

pub const SUPPLIER: Coordinates = Coordinates {
    latitude: 45.6139,
    longitude: 43.2090,
};

pub const RETAILER: Coordinates = Coordinates {
    latitude: 25.0827,
    longitude: 43.2707,
};

pub fn reference_shipment() -> ShipmentContext {
    ShipmentContext {
        supplier: SUPPLIER,
        retailer: RETAILER,
        current_weight: 1200.0,
    }
}

/// Builder for test drivers. Defaults to an eligible, unlocated driver.
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    driver: Driver,
}

pub fn driver(id: &str) -> DriverBuilder {
    DriverBuilder {
        driver: Driver {
            id: id.to_string(),
            location: None,
            max_weight: 1200.0,
            environment_score: 0.0,
        },
    }
}

impl DriverBuilder {
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.driver.location = Some(Coordinates::new(latitude, longitude));
        self
    }

    pub fn max_weight(mut self, max_weight: f64) -> Self {
        self.driver.max_weight = max_weight;
        self
    }

    pub fn env(mut self, score: f64) -> Self {
        self.driver.environment_score = score;
        self
    }

    pub fn build(self) -> Driver {
        self.driver
    }
}

/// The two-driver fleet from the reference scenario: only A is eligible.
pub fn reference_fleet() -> Vec<Driver> {
    vec![
        driver("A").max_weight(1600.0).env(2.0).at(46.0, 43.0).build(),
        driver("B").max_weight(2000.0).env(5.0).at(26.0, 43.0).build(),
    ]
}

/// A store whose every call fails, counting how often it was asked.
#[derive(Debug, Default)]
pub struct BrokenStore {
    pub calls: AtomicUsize,
}

impl BrokenStore {
    fn fail(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::Status {
            status: 503,
            body: "database offline".to_string(),
        }
    }
}

impl DriverStore for BrokenStore {
    fn list_all(&self) -> Result<Vec<Driver>, StoreError> {
        Err(self.fail())
    }

    fn update_location(&self, _id: &str, _location: Coordinates) -> Result<UpdateOutcome, StoreError> {
        Err(self.fail())
    }
}
