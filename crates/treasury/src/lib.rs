//! Brew Treasury Module
//!
//! Fungible asset accounting for the farm: the reward token and every
//! staked asset live in one journaled, in-memory ledger. Each asset is
//! governed by a `TokenPolicy` (minter, hard cap, transfer fee, whitelist).

pub mod account_ledger;
pub mod errors;
pub mod token;

pub use account_ledger::{AssetLedger, InMemoryAssetLedger};
pub use errors::LedgerError;
pub use token::{AssetBook, TokenPolicy, TransferFee, TransferQuote};
