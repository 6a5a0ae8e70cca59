//! Utils Module - Shared constants and telemetry

pub mod constants;
pub mod telemetry;

pub use constants::*;
pub use telemetry::*;
