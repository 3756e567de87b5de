//! Pool registry
//!
//! Pools are appended, reweighted, never removed. A pool's index in the
//! registry is its permanent identity.

use crate::error::{FarmError, Result};
use brew_types::{Amount, AssetId, BasisPoints, BlockHeight, PoolId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub staked_asset: AssetId,
    pub allocation_weight: u64,
    pub deposit_fee_bps: BasisPoints,
    pub last_accrual_block: BlockHeight,
    /// Cumulative net reward per staked unit, scaled by `ACC_PRECISION`.
    /// Never decreases.
    #[serde(with = "brew_types::amount_serde")]
    pub acc_reward_per_share: u128,
    #[serde(with = "brew_types::amount_serde")]
    pub total_staked: Amount,
}

impl Pool {
    pub fn new(
        staked_asset: AssetId,
        allocation_weight: u64,
        deposit_fee_bps: BasisPoints,
        created_at: BlockHeight,
    ) -> Self {
        Self {
            staked_asset,
            allocation_weight,
            deposit_fee_bps,
            last_accrual_block: created_at,
            acc_reward_per_share: 0,
            total_staked: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    total_weight: u64,
    max_deposit_fee_bps: BasisPoints,
}

impl PoolRegistry {
    pub fn new(max_deposit_fee_bps: BasisPoints) -> Self {
        Self {
            pools: Vec::new(),
            total_weight: 0,
            max_deposit_fee_bps,
        }
    }

    /// Rebuild from a stored pool table.
    pub fn from_pools(pools: Vec<Pool>, max_deposit_fee_bps: BasisPoints) -> Result<Self> {
        let mut registry = Self::new(max_deposit_fee_bps);
        for pool in pools {
            registry.check_new(&pool.staked_asset, pool.deposit_fee_bps)?;
            registry.push(pool)?;
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn total_allocation_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn max_deposit_fee_bps(&self) -> BasisPoints {
        self.max_deposit_fee_bps
    }

    pub fn get(&self, id: PoolId) -> Result<&Pool> {
        self.pools.get(id).ok_or(FarmError::PoolNotFound(id))
    }

    pub fn get_mut(&mut self, id: PoolId) -> Result<&mut Pool> {
        self.pools.get_mut(id).ok_or(FarmError::PoolNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &Pool)> {
        self.pools.iter().enumerate()
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    pub fn contains_asset(&self, asset: &AssetId) -> bool {
        self.pools.iter().any(|pool| &pool.staked_asset == asset)
    }

    pub fn check_deposit_fee(&self, bps: BasisPoints) -> Result<()> {
        if bps > self.max_deposit_fee_bps {
            return Err(FarmError::InvalidDepositFee {
                bps,
                max: self.max_deposit_fee_bps,
            });
        }
        Ok(())
    }

    /// Preconditions of `add`, checked before any pool is settled.
    pub fn check_new(&self, asset: &AssetId, deposit_fee_bps: BasisPoints) -> Result<()> {
        if self.contains_asset(asset) {
            return Err(FarmError::DuplicatePool(asset.clone()));
        }
        self.check_deposit_fee(deposit_fee_bps)
    }

    /// Append a pool. Callers settle every existing pool first.
    pub fn push(&mut self, pool: Pool) -> Result<PoolId> {
        if self.contains_asset(&pool.staked_asset) {
            return Err(FarmError::DuplicatePool(pool.staked_asset));
        }
        self.total_weight = self
            .total_weight
            .checked_add(pool.allocation_weight)
            .ok_or(FarmError::ArithmeticFault("total allocation weight overflow"))?;
        self.pools.push(pool);
        Ok(self.pools.len() - 1)
    }

    /// Change a pool's weight and deposit fee. Callers settle every pool first.
    pub fn reweight(
        &mut self,
        id: PoolId,
        allocation_weight: u64,
        deposit_fee_bps: BasisPoints,
    ) -> Result<()> {
        self.check_deposit_fee(deposit_fee_bps)?;
        let previous = self.get(id)?.allocation_weight;
        let total = self
            .total_weight
            .checked_sub(previous)
            .and_then(|w| w.checked_add(allocation_weight))
            .ok_or(FarmError::ArithmeticFault("total allocation weight overflow"))?;

        let pool = self.get_mut(id)?;
        pool.allocation_weight = allocation_weight;
        pool.deposit_fee_bps = deposit_fee_bps;
        self.total_weight = total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_lp1() -> PoolRegistry {
        let mut registry = PoolRegistry::new(500);
        registry.push(Pool::new("LP1".into(), 100, 0, 10)).unwrap();
        registry
    }

    #[test]
    fn test_push_tracks_total_weight() {
        let mut registry = registry_with_lp1();
        let id = registry.push(Pool::new("LP2".into(), 20, 0, 12)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(registry.total_allocation_weight(), 120);
        assert_eq!(registry.get(1).unwrap().last_accrual_block, 12);
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let mut registry = registry_with_lp1();
        assert_eq!(
            registry.check_new(&"LP1".into(), 0),
            Err(FarmError::DuplicatePool("LP1".into()))
        );
        assert!(registry.push(Pool::new("LP1".into(), 1, 0, 0)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deposit_fee_ceiling() {
        let registry = registry_with_lp1();
        assert_eq!(
            registry.check_new(&"LP2".into(), 600),
            Err(FarmError::InvalidDepositFee { bps: 600, max: 500 })
        );
        assert!(registry.check_new(&"LP2".into(), 500).is_ok());
    }

    #[test]
    fn test_reweight() {
        let mut registry = registry_with_lp1();
        registry.reweight(0, 1000, 50).unwrap();
        assert_eq!(registry.total_allocation_weight(), 1000);
        assert_eq!(registry.get(0).unwrap().deposit_fee_bps, 50);

        assert_eq!(registry.reweight(1, 100, 0), Err(FarmError::PoolNotFound(1)));
        assert!(registry.reweight(0, 100, 600).is_err());
        assert_eq!(registry.get(0).unwrap().allocation_weight, 1000);
    }

    #[test]
    fn test_from_pools_recomputes_weight() {
        let pools = vec![
            Pool::new("LP1".into(), 10, 0, 0),
            Pool::new("LP2".into(), 20, 100, 0),
        ];
        let registry = PoolRegistry::from_pools(pools, 500).unwrap();
        assert_eq!(registry.total_allocation_weight(), 30);
    }
}
