//! Core library for the vital health tracker.
//!
//! Everything lives client-side in a flat key-value store partitioned per
//! profile; the service layer derives daily calorie balance and chart
//! series from the raw entry collections.

pub mod aggregate;
pub mod error;
pub mod estimate;
pub mod models;
pub mod reminders;
pub mod service;
pub mod stats;
pub mod store;
