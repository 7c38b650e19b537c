//! Rehab cost estimation and acquisition offer analysis for single-family
//! properties.

pub mod config;
pub mod error;
pub mod estimation;
pub mod formatting;
pub mod input;
pub mod lookup;
pub mod property;
pub mod session;
pub mod telemetry;
