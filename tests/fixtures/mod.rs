//! Test fixtures for driver-dispatch.
//!
//! Provides:
//! - The reference supplier / retailer leg and positions around it
//! - A small driver builder
//! - Stores that fail on demand

pub mod fleet;

pub use fleet::*;
