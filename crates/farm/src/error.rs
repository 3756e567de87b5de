use brew_economics::EconomicsError;
use brew_treasury::LedgerError;
use brew_types::{AccountId, Amount, AssetId, BasisPoints, PoolId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FarmError>;

/// Errors returned by farm operations. Every error aborts the whole call;
/// nothing it did before failing is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FarmError {
    #[error("a pool for asset {0} already exists")]
    DuplicatePool(AssetId),

    #[error("pool {0} does not exist")]
    PoolNotFound(PoolId),

    #[error("deposit fee {bps} bps exceeds ceiling {max} bps")]
    InvalidDepositFee { bps: BasisPoints, max: BasisPoints },

    #[error("burn fee {bps} bps exceeds ceiling {max} bps")]
    InvalidBurnFee { bps: BasisPoints, max: BasisPoints },

    #[error("emission rate {rate} exceeds ceiling {max}")]
    InvalidRate { rate: Amount, max: Amount },

    #[error("withdraw of {requested} exceeds staked {staked}")]
    InsufficientStake { requested: Amount, staked: Amount },

    #[error("{caller} may not {action}")]
    Unauthorized {
        action: &'static str,
        caller: AccountId,
    },

    #[error("arithmetic fault: {0}")]
    ArithmeticFault(&'static str),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl From<EconomicsError> for FarmError {
    fn from(err: EconomicsError) -> Self {
        match err {
            EconomicsError::InvalidRate { rate, max } => FarmError::InvalidRate { rate, max },
            EconomicsError::InvalidBurnFee { bps, max } => FarmError::InvalidBurnFee { bps, max },
            EconomicsError::ArithmeticFault(what) => FarmError::ArithmeticFault(what),
            EconomicsError::InvalidParameter(what) => FarmError::Config(what.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_economics_errors_keep_their_names() {
        let err: FarmError = EconomicsError::InvalidRate { rate: 2, max: 1 }.into();
        assert_eq!(err, FarmError::InvalidRate { rate: 2, max: 1 });

        let err: FarmError = EconomicsError::InvalidBurnFee { bps: 600, max: 500 }.into();
        assert!(matches!(err, FarmError::InvalidBurnFee { bps: 600, .. }));
    }

    #[test]
    fn test_display_names_the_caller() {
        let err = FarmError::Unauthorized {
            action: "add a pool",
            caller: AccountId::from("bob"),
        };
        assert_eq!(err.to_string(), "bob may not add a pool");
    }
}
