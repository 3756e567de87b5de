use brew_types::{Amount, BasisPoints};
use thiserror::Error;

/// Errors that can occur while computing emissions and fee splits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomicsError {
    #[error("invalid economics parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("emission rate {rate} exceeds ceiling {max} per block")]
    InvalidRate { rate: Amount, max: Amount },

    #[error("burn fee {bps} bps exceeds ceiling {max} bps")]
    InvalidBurnFee { bps: BasisPoints, max: BasisPoints },

    #[error("arithmetic fault while performing economics calculation: {0}")]
    ArithmeticFault(&'static str),
}
