//! Service configuration, read from `DISPATCH_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::couchdb::CouchDbConfig;
use crate::error::ConfigError;
use crate::model::{Coordinates, ShipmentContext};
use crate::selector::SelectOptions;

/// Which driver store backs the service.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    CouchDb(CouchDbConfig),
    /// In-process store, optionally seeded from a JSON driver list.
    Memory { seed_file: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub store: StoreKind,
    pub shipment: ShipmentContext,
    pub select: SelectOptions,
    /// Directory served for any path the API does not claim.
    pub static_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3006)),
            store: StoreKind::CouchDb(CouchDbConfig::default()),
            shipment: ShipmentContext::default(),
            select: SelectOptions::default(),
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind = parse_or(&var, "DISPATCH_BIND", defaults.bind)?;

        let store = match var("DISPATCH_STORE").as_deref() {
            None | Some("couchdb") => {
                let base = CouchDbConfig::default();
                StoreKind::CouchDb(CouchDbConfig {
                    base_url: var("DISPATCH_STORE_URL").unwrap_or(base.base_url),
                    database: var("DISPATCH_STORE_DB").unwrap_or(base.database),
                    username: var("DISPATCH_STORE_USER"),
                    password: var("DISPATCH_STORE_PASSWORD"),
                    timeout_secs: parse_or(&var, "DISPATCH_STORE_TIMEOUT_SECS", base.timeout_secs)?,
                })
            }
            Some("memory") => StoreKind::Memory {
                seed_file: var("DISPATCH_SEED_FILE").map(PathBuf::from),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "DISPATCH_STORE",
                    value: other.to_string(),
                    reason: "expected `couchdb` or `memory`".to_string(),
                });
            }
        };

        let shipment = ShipmentContext {
            supplier: Coordinates::new(
                parse_or(&var, "DISPATCH_SUPPLIER_LAT", defaults.shipment.supplier.latitude)?,
                parse_or(&var, "DISPATCH_SUPPLIER_LON", defaults.shipment.supplier.longitude)?,
            ),
            retailer: Coordinates::new(
                parse_or(&var, "DISPATCH_RETAILER_LAT", defaults.shipment.retailer.latitude)?,
                parse_or(&var, "DISPATCH_RETAILER_LON", defaults.shipment.retailer.longitude)?,
            ),
            current_weight: parse_or(&var, "DISPATCH_CURRENT_WEIGHT", defaults.shipment.current_weight)?,
        };

        let select = SelectOptions {
            max_headroom: parse_or(&var, "DISPATCH_MAX_HEADROOM", defaults.select.max_headroom)?,
            ..defaults.select
        };

        let static_dir = var("DISPATCH_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        Ok(Self {
            bind,
            store,
            shipment,
            select,
            static_dir,
        })
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&'static str) -> Option<String>,
{
    let Some(value) = var(name) else {
        return Ok(default);
    };
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
        value,
    })
}
