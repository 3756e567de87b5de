//! Persisted farm state: pool table, positions, emission state and roles.
//! Ledger balances belong to the asset ledger and are not part of it.

use crate::error::{FarmError, Result};
use crate::farm::{Farm, Roles};
use crate::pool::{Pool, PoolRegistry};
use crate::position::{Position, PositionLedger};
use brew_economics::EmissionController;
use brew_treasury::AssetLedger;
use brew_types::{AccountId, Amount, AssetId, PoolId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub custody: AccountId,
    pub reward_asset: AssetId,
    pub roles: Roles,
    pub pools: Vec<Pool>,
    pub max_deposit_fee_bps: u16,
    pub positions: HashMap<PoolId, HashMap<AccountId, Position>>,
    pub emission: EmissionController,
}

impl FarmSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FarmError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FarmError::Snapshot(e.to_string()))
    }
}

impl<L: AssetLedger> Farm<L> {
    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            custody: self.custody.clone(),
            reward_asset: self.reward_asset.clone(),
            roles: self.roles.clone(),
            pools: self.registry.pools().to_vec(),
            max_deposit_fee_bps: self.registry.max_deposit_fee_bps(),
            positions: self.positions.all().clone(),
            emission: self.emission.clone(),
        }
    }

    /// Rebuild a farm from `snapshot` over `ledger`. Rejects snapshots with
    /// out-of-range emission parameters or whose positions do not add up to
    /// their pool totals.
    pub fn restore(snapshot: FarmSnapshot, ledger: L) -> Result<Self> {
        snapshot.emission.params().validate()?;
        for (id, accounts) in &snapshot.positions {
            let pool = snapshot.pools.get(*id).ok_or(FarmError::PoolNotFound(*id))?;
            let staked = accounts
                .values()
                .try_fold(0 as Amount, |sum, p| sum.checked_add(p.amount))
                .ok_or(FarmError::ArithmeticFault("snapshot stake overflow"))?;
            if staked != pool.total_staked {
                return Err(FarmError::Snapshot(format!(
                    "pool {id} positions sum to {staked}, pool records {}",
                    pool.total_staked
                )));
            }
        }
        for (id, pool) in snapshot.pools.iter().enumerate() {
            if pool.total_staked > 0 && !snapshot.positions.contains_key(&id) {
                return Err(FarmError::Snapshot(format!(
                    "pool {id} records stake but has no positions"
                )));
            }
        }

        let registry = PoolRegistry::from_pools(snapshot.pools, snapshot.max_deposit_fee_bps)?;
        info!(
            target: "farm",
            "Farm restored with {} pools, {} emitted",
            registry.len(),
            snapshot.emission.total_emitted()
        );

        Ok(Self {
            custody: snapshot.custody,
            reward_asset: snapshot.reward_asset,
            roles: snapshot.roles,
            registry,
            positions: PositionLedger::from_positions(snapshot.positions),
            emission: snapshot.emission,
            ledger,
        })
    }
}
