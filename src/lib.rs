//! driver-dispatch core
//!
//! Picks the driver to dispatch for a fixed supplier to retailer leg and keeps
//! driver positions current in an external document store.

pub mod traits;
pub mod model;
pub mod haversine;
pub mod selector;
pub mod ingress;
pub mod error;
pub mod config;
pub mod couchdb;
pub mod memory;
pub mod server;
