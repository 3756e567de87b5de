//! Brew Farm
//!
//! Multi-pool staking rewards distributor. Each pool keeps a lazy
//! reward-per-share accumulator that is brought current only when someone
//! touches the pool; positions reconcile against it on their own next
//! interaction, so no operation ever walks the set of depositors.
//!
//! Emission and fee splitting come from `brew-economics`; balances of the
//! reward token and of every staked asset live behind the `AssetLedger`
//! trait from `brew-treasury`.

pub mod accrual;
pub mod config;
pub mod error;
pub mod farm;
pub mod pool;
pub mod position;
pub mod shared;
pub mod snapshot;

pub use accrual::Settlement;
pub use config::FarmConfig;
pub use error::{FarmError, Result};
pub use farm::{DepositReceipt, Farm, Roles, WithdrawReceipt};
pub use pool::{Pool, PoolRegistry};
pub use position::{Position, PositionLedger};
pub use shared::SharedFarm;
pub use snapshot::FarmSnapshot;
