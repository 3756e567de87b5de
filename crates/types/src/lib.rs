//! Brew Types
//!
//! Shared monetary units, identifiers and fixed-point helpers used by the
//! emission, treasury and farm crates.

pub mod amount_serde;
pub mod ids;
pub mod units;

pub use ids::*;
pub use units::*;
