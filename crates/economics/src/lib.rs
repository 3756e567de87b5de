//! Brew Economics Module
//!
//! Implements the farm's emission side:
//! - Per-block emission rate with a fixed ceiling and a start block
//! - Lifetime hard cap with a permanent, one-way shutoff
//! - Fee splitting of gross emission (operator cut) and of harvests (burn cut)

pub mod distribution;
pub mod emission;
pub mod errors;
pub mod params;

pub use distribution::*;
pub use emission::*;
pub use errors::EconomicsError;
pub use params::*;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
