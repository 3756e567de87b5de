use brew_types::{AccountId, Amount, AssetId};
use thiserror::Error;

/// Errors raised by the asset ledger. A failed call leaves no partial effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("asset {0} is already registered")]
    AssetExists(AssetId),

    #[error("{caller} is not authorized to manage {asset}")]
    Unauthorized { asset: AssetId, caller: AccountId },

    #[error("minting {amount} of {asset} would exceed hard cap {cap}")]
    HardCapExceeded {
        asset: AssetId,
        cap: Amount,
        amount: Amount,
    },

    #[error("{account} holds {balance} of {asset}, needs {requested}")]
    InsufficientBalance {
        asset: AssetId,
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    #[error("invalid token policy: {0}")]
    InvalidPolicy(&'static str),

    #[error("ledger arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("no open checkpoint")]
    NoCheckpoint,
}
