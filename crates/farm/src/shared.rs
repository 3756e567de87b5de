//! Thread-safe farm handle
//!
//! One global lock serializes every mutating call; each call settles the
//! target pool inside its own write section. Previews and views share the
//! read side.

use crate::error::Result;
use crate::farm::{DepositReceipt, Farm, WithdrawReceipt};
use crate::pool::Pool;
use crate::position::Position;
use brew_economics::HarvestSplit;
use brew_treasury::AssetLedger;
use brew_types::{AccountId, Amount, AssetId, BasisPoints, BlockHeight, PoolId};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

pub struct SharedFarm<L: AssetLedger> {
    inner: Arc<RwLock<Farm<L>>>,
}

impl<L: AssetLedger> Clone for SharedFarm<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: AssetLedger> SharedFarm<L> {
    pub fn new(farm: Farm<L>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(farm)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Farm<L>> {
        self.inner.read()
    }

    /// Exclusive access for multi-step administration.
    pub fn write(&self) -> RwLockWriteGuard<'_, Farm<L>> {
        self.inner.write()
    }

    pub fn add_pool(
        &self,
        caller: &AccountId,
        allocation_weight: u64,
        asset: AssetId,
        deposit_fee_bps: BasisPoints,
        at: BlockHeight,
    ) -> Result<PoolId> {
        self.inner
            .write()
            .add_pool(caller, allocation_weight, asset, deposit_fee_bps, at)
    }

    pub fn set_pool(
        &self,
        caller: &AccountId,
        id: PoolId,
        allocation_weight: u64,
        deposit_fee_bps: BasisPoints,
        at: BlockHeight,
    ) -> Result<()> {
        self.inner
            .write()
            .set_pool(caller, id, allocation_weight, deposit_fee_bps, at)
    }

    pub fn deposit(
        &self,
        account: &AccountId,
        id: PoolId,
        amount: Amount,
        at: BlockHeight,
    ) -> Result<DepositReceipt> {
        self.inner.write().deposit(account, id, amount, at)
    }

    pub fn withdraw(
        &self,
        account: &AccountId,
        id: PoolId,
        amount: Amount,
        at: BlockHeight,
    ) -> Result<WithdrawReceipt> {
        self.inner.write().withdraw(account, id, amount, at)
    }

    pub fn harvest(&self, account: &AccountId, id: PoolId, at: BlockHeight) -> Result<HarvestSplit> {
        self.inner.write().harvest(account, id, at)
    }

    pub fn emergency_withdraw(&self, account: &AccountId, id: PoolId) -> Result<Amount> {
        self.inner.write().emergency_withdraw(account, id)
    }

    pub fn update_emission_rate(
        &self,
        caller: &AccountId,
        rate_per_block: Amount,
        at: BlockHeight,
    ) -> Result<()> {
        self.inner
            .write()
            .update_emission_rate(caller, rate_per_block, at)
    }

    pub fn pending_reward(&self, id: PoolId, account: &AccountId, at: BlockHeight) -> Result<Amount> {
        self.inner.read().pending_reward(id, account, at)
    }

    pub fn pool(&self, id: PoolId) -> Result<Pool> {
        self.inner.read().pool(id).cloned()
    }

    pub fn position(&self, id: PoolId, account: &AccountId) -> Position {
        self.inner.read().position(id, account)
    }

    pub fn total_emitted(&self) -> Amount {
        self.inner.read().total_emitted()
    }
}
