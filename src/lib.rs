//! Occupancy combination and pricing rule engine.
//!
//! From a room's bed setups and a catalog of age categories, derive the
//! occupancy variants, expand the allowed ones into concrete bed assignments
//! and price them through discounts, surcharges or a pricing matrix.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod store;
