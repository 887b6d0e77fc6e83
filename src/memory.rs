//! In-process driver store for local runs and tests.

use std::path::Path;
use std::sync::RwLock;

use crate::error::{ConfigError, StoreError};
use crate::model::{Coordinates, Driver};
use crate::traits::{DriverStore, UpdateOutcome};

#[derive(Debug, Default)]
pub struct MemoryStore {
    drivers: RwLock<Vec<Driver>>,
}

impl MemoryStore {
    pub fn new(drivers: Vec<Driver>) -> Self {
        Self {
            drivers: RwLock::new(drivers),
        }
    }

    /// Load drivers from a JSON array.
    pub fn from_seed_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Seed {
            path: path.display().to_string(),
            source,
        })?;
        let drivers: Vec<Driver> = serde_json::from_str(&raw).map_err(|source| ConfigError::SeedFormat {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(drivers))
    }

    fn poisoned() -> StoreError {
        StoreError::Worker("driver table lock poisoned".to_string())
    }
}

impl DriverStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Driver>, StoreError> {
        let drivers = self.drivers.read().map_err(|_| Self::poisoned())?;
        Ok(drivers.clone())
    }

    fn update_location(&self, id: &str, location: Coordinates) -> Result<UpdateOutcome, StoreError> {
        let mut drivers = self.drivers.write().map_err(|_| Self::poisoned())?;
        let matched = match drivers.iter_mut().find(|driver| driver.id == id) {
            Some(driver) => {
                driver.location = Some(location);
                true
            }
            None => false,
        };
        Ok(UpdateOutcome { matched })
    }
}
