//! Farm orchestrator
//!
//! Every mutating call runs inside a checkpoint: the pool table, emission
//! state and roles are copied, position and ledger writes are journaled.
//! A failing call restores all of it, including any reward already minted
//! during the call.
//!
//! Control flow of a user call: settle the target pool, harvest the
//! position's pending reward, apply the stake delta, reset the reward debt.

use crate::accrual::{self, Settlement};
use crate::config::FarmConfig;
use crate::error::{FarmError, Result};
use crate::pool::{Pool, PoolRegistry};
use crate::position::{Position, PositionLedger};
use brew_economics::{EmissionController, EmissionPhase, HarvestSplit};
use brew_treasury::AssetLedger;
use brew_types::{bps_of, AccountId, Amount, AssetId, BasisPoints, BlockHeight, PoolId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Accounts holding administrative rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub owner: AccountId,
    /// Receives the operator cut; only the current operator may reassign it.
    pub operator: AccountId,
    /// Receives deposit fees; only the current collector may reassign it.
    pub fee_collector: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepositReceipt {
    pub harvested: HarvestSplit,
    /// Staked asset actually received by the farm
    pub received: Amount,
    pub deposit_fee: Amount,
    /// Added to the position: `received - deposit_fee`
    pub credited: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawReceipt {
    pub harvested: HarvestSplit,
    pub withdrawn: Amount,
    /// Staked asset actually received by the account
    pub returned: Amount,
}

pub struct Farm<L: AssetLedger> {
    pub(crate) custody: AccountId,
    pub(crate) reward_asset: AssetId,
    pub(crate) roles: Roles,
    pub(crate) registry: PoolRegistry,
    pub(crate) positions: PositionLedger,
    pub(crate) emission: EmissionController,
    pub(crate) ledger: L,
}

impl<L: AssetLedger> Farm<L> {
    /// Create a farm over `ledger`. The custody account must already be the
    /// reward asset's minter for harvests to succeed.
    pub fn new(config: FarmConfig, ledger: L) -> Result<Self> {
        config.validate()?;
        let emission =
            EmissionController::new(config.emission.clone(), config.rate_per_block, config.start_block)?;

        info!(
            target: "farm",
            "Farm created: rate {} per block from block {}, hard cap {}",
            config.rate_per_block,
            config.start_block,
            config.emission.hard_cap
        );

        Ok(Self {
            custody: config.custody,
            reward_asset: config.reward_asset,
            roles: Roles {
                owner: config.owner,
                operator: config.operator,
                fee_collector: config.fee_collector,
            },
            registry: PoolRegistry::new(config.emission.max_deposit_fee_bps),
            positions: PositionLedger::new(),
            emission,
            ledger,
        })
    }

    // =========================================================================
    // Pool administration
    // =========================================================================

    /// Register a pool for `asset`. Owner only.
    pub fn add_pool(
        &mut self,
        caller: &AccountId,
        allocation_weight: u64,
        asset: AssetId,
        deposit_fee_bps: BasisPoints,
        at: BlockHeight,
    ) -> Result<PoolId> {
        self.atomically(|farm| {
            farm.require_owner(caller, "add a pool")?;
            farm.registry.check_new(&asset, deposit_fee_bps)?;
            farm.settle_all_inner(at)?;
            let id = farm
                .registry
                .push(Pool::new(asset.clone(), allocation_weight, deposit_fee_bps, at))?;
            info!(
                target: "farm",
                "Pool {} added for {} (weight {}, deposit fee {} bps)",
                id, asset, allocation_weight, deposit_fee_bps
            );
            Ok(id)
        })
    }

    /// Change a pool's weight and deposit fee. Owner only.
    pub fn set_pool(
        &mut self,
        caller: &AccountId,
        id: PoolId,
        allocation_weight: u64,
        deposit_fee_bps: BasisPoints,
        at: BlockHeight,
    ) -> Result<()> {
        self.atomically(|farm| {
            farm.require_owner(caller, "reconfigure a pool")?;
            farm.registry.get(id)?;
            farm.registry.check_deposit_fee(deposit_fee_bps)?;
            farm.settle_all_inner(at)?;
            farm.registry.reweight(id, allocation_weight, deposit_fee_bps)?;
            info!(
                target: "farm",
                "Pool {} reweighted to {} (deposit fee {} bps)",
                id, allocation_weight, deposit_fee_bps
            );
            Ok(())
        })
    }

    // =========================================================================
    // Emission administration
    // =========================================================================

    /// Change the emission rate. Owner only; every pool is settled under
    /// the old rate first.
    pub fn update_emission_rate(
        &mut self,
        caller: &AccountId,
        rate_per_block: Amount,
        at: BlockHeight,
    ) -> Result<()> {
        self.atomically(|farm| {
            farm.require_owner(caller, "update the emission rate")?;
            farm.settle_all_inner(at)?;
            farm.emission.update_rate(rate_per_block)?;
            Ok(())
        })
    }

    pub fn set_burn_fee(&mut self, caller: &AccountId, bps: BasisPoints) -> Result<()> {
        self.atomically(|farm| {
            farm.require_owner(caller, "set the burn fee")?;
            farm.emission.set_burn_fee(bps)?;
            Ok(())
        })
    }

    pub fn set_operator(&mut self, caller: &AccountId, operator: AccountId) -> Result<()> {
        if caller != &self.roles.operator {
            return Err(unauthorized("reassign the operator", caller));
        }
        info!(target: "farm", "Operator moved from {} to {}", self.roles.operator, operator);
        self.roles.operator = operator;
        Ok(())
    }

    pub fn set_fee_collector(&mut self, caller: &AccountId, fee_collector: AccountId) -> Result<()> {
        if caller != &self.roles.fee_collector {
            return Err(unauthorized("reassign the fee collector", caller));
        }
        info!(
            target: "farm",
            "Fee collector moved from {} to {}",
            self.roles.fee_collector, fee_collector
        );
        self.roles.fee_collector = fee_collector;
        Ok(())
    }

    // =========================================================================
    // Settlement
    // =========================================================================

    pub fn settle_pool(&mut self, id: PoolId, at: BlockHeight) -> Result<Settlement> {
        self.atomically(|farm| farm.settle_inner(id, at))
    }

    /// Settle every pool at `at`.
    pub fn settle_all(&mut self, at: BlockHeight) -> Result<()> {
        self.atomically(|farm| farm.settle_all_inner(at))
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Stake `amount` of the pool's asset, harvesting pending reward first.
    /// A zero amount is a plain harvest.
    pub fn deposit(
        &mut self,
        account: &AccountId,
        id: PoolId,
        amount: Amount,
        at: BlockHeight,
    ) -> Result<DepositReceipt> {
        self.atomically(|farm| {
            farm.settle_inner(id, at)?;
            let existed = farm.positions.contains(id, account);
            let mut position = farm.positions.get(id, account);
            let acc = farm.registry.get(id)?.acc_reward_per_share;
            let harvested = farm.harvest_position(account, &position, acc)?;

            let mut receipt = DepositReceipt {
                harvested,
                ..Default::default()
            };

            if amount > 0 {
                let (asset, fee_bps) = {
                    let pool = farm.registry.get(id)?;
                    (pool.staked_asset.clone(), pool.deposit_fee_bps)
                };
                let custody = farm.custody.clone();
                receipt.received = farm.ledger.transfer(&asset, account, &custody, amount)?;
                receipt.deposit_fee = bps_of(receipt.received, fee_bps)
                    .ok_or(FarmError::ArithmeticFault("deposit fee overflow"))?;
                if receipt.deposit_fee > 0 {
                    let collector = farm.roles.fee_collector.clone();
                    farm.ledger
                        .transfer(&asset, &custody, &collector, receipt.deposit_fee)?;
                }
                receipt.credited = receipt.received - receipt.deposit_fee;

                position.amount = position
                    .amount
                    .checked_add(receipt.credited)
                    .ok_or(FarmError::ArithmeticFault("position amount overflow"))?;
                let pool = farm.registry.get_mut(id)?;
                pool.total_staked = pool
                    .total_staked
                    .checked_add(receipt.credited)
                    .ok_or(FarmError::ArithmeticFault("pool total_staked overflow"))?;
            }

            // Positions are created by the first credited deposit only.
            if existed || receipt.credited > 0 {
                position.reset_debt(acc)?;
                farm.positions.put(id, account, position);
            }

            debug!(
                target: "farm",
                "Deposit {} into pool {} by {} at {}: credited {}, fee {}, harvested {}",
                amount, id, account, at, receipt.credited, receipt.deposit_fee, harvested.payout
            );
            Ok(receipt)
        })
    }

    /// Claim pending reward without changing stake.
    pub fn harvest(&mut self, account: &AccountId, id: PoolId, at: BlockHeight) -> Result<HarvestSplit> {
        Ok(self.deposit(account, id, 0, at)?.harvested)
    }

    /// Unstake `amount`, harvesting pending reward first.
    pub fn withdraw(
        &mut self,
        account: &AccountId,
        id: PoolId,
        amount: Amount,
        at: BlockHeight,
    ) -> Result<WithdrawReceipt> {
        self.atomically(|farm| {
            farm.registry.get(id)?;
            let mut position = farm.positions.get(id, account);
            if amount > position.amount {
                return Err(FarmError::InsufficientStake {
                    requested: amount,
                    staked: position.amount,
                });
            }

            farm.settle_inner(id, at)?;
            let acc = farm.registry.get(id)?.acc_reward_per_share;
            let harvested = farm.harvest_position(account, &position, acc)?;

            let mut receipt = WithdrawReceipt {
                harvested,
                withdrawn: amount,
                returned: 0,
            };

            if amount > 0 {
                position.amount -= amount;
                let pool = farm.registry.get_mut(id)?;
                pool.total_staked = pool
                    .total_staked
                    .checked_sub(amount)
                    .ok_or(FarmError::ArithmeticFault("pool total_staked underflow"))?;
                let asset = pool.staked_asset.clone();
                let custody = farm.custody.clone();
                receipt.returned = farm.ledger.transfer(&asset, &custody, account, amount)?;
            }

            position.reset_debt(acc)?;
            farm.positions.put(id, account, position);

            debug!(
                target: "farm",
                "Withdraw {} from pool {} by {} at {}: harvested {}",
                amount, id, account, at, harvested.payout
            );
            Ok(receipt)
        })
    }

    /// Return the whole stake without settling or harvesting. Unclaimed
    /// reward is forfeited.
    pub fn emergency_withdraw(&mut self, account: &AccountId, id: PoolId) -> Result<Amount> {
        self.atomically(|farm| {
            farm.registry.get(id)?;
            if !farm.positions.contains(id, account) {
                return Ok(0);
            }
            let position = farm.positions.get(id, account);
            let pool = farm.registry.get_mut(id)?;
            pool.total_staked = pool
                .total_staked
                .checked_sub(position.amount)
                .ok_or(FarmError::ArithmeticFault("pool total_staked underflow"))?;
            let asset = pool.staked_asset.clone();

            farm.positions.put(id, account, Position::default());

            let returned = if position.amount > 0 {
                let custody = farm.custody.clone();
                farm.ledger
                    .transfer(&asset, &custody, account, position.amount)?
            } else {
                0
            };

            warn!(
                target: "farm",
                "Emergency withdraw of {} from pool {} by {}",
                position.amount, id, account
            );
            Ok(returned)
        })
    }

    /// Unclaimed reward `account` would have if `id` were settled at `at`.
    ///
    /// Reported before the harvest burn, so a harvest at the same block pays
    /// this amount minus the burn cut.
    pub fn pending_reward(&self, id: PoolId, account: &AccountId, at: BlockHeight) -> Result<Amount> {
        let pool = self.registry.get(id)?;
        let acc = accrual::preview_acc_reward_per_share(
            pool,
            &self.emission,
            self.registry.total_allocation_weight(),
            at,
        )?;
        self.positions.get(id, account).pending(acc)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn pool(&self, id: PoolId) -> Result<&Pool> {
        self.registry.get(id)
    }

    pub fn pool_count(&self) -> usize {
        self.registry.len()
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn position(&self, id: PoolId, account: &AccountId) -> Position {
        self.positions.get(id, account)
    }

    pub fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    pub fn total_allocation_weight(&self) -> u64 {
        self.registry.total_allocation_weight()
    }

    pub fn total_emitted(&self) -> Amount {
        self.emission.total_emitted()
    }

    pub fn rate_per_block(&self) -> Amount {
        self.emission.rate_per_block()
    }

    pub fn burn_fee_bps(&self) -> BasisPoints {
        self.emission.burn_fee_bps()
    }

    pub fn is_capped(&self) -> bool {
        self.emission.is_capped()
    }

    pub fn emission_phase(&self) -> EmissionPhase {
        self.emission.phase()
    }

    pub fn emission(&self) -> &EmissionController {
        &self.emission
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    pub fn reward_asset(&self) -> &AssetId {
        &self.reward_asset
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn atomically<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let registry = self.registry.clone();
        let emission = self.emission.clone();
        let roles = self.roles.clone();
        self.positions.checkpoint();
        self.ledger.checkpoint();

        match op(self) {
            Ok(value) => {
                self.positions.commit();
                self.ledger.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.registry = registry;
                self.emission = emission;
                self.roles = roles;
                self.positions.rollback();
                self.ledger.rollback()?;
                debug!(target: "farm", "Call reverted: {}", err);
                Err(err)
            }
        }
    }

    fn require_owner(&self, caller: &AccountId, action: &'static str) -> Result<()> {
        if caller != &self.roles.owner {
            return Err(unauthorized(action, caller));
        }
        Ok(())
    }

    fn settle_inner(&mut self, id: PoolId, at: BlockHeight) -> Result<Settlement> {
        let total_weight = self.registry.total_allocation_weight();
        let pool = self.registry.get_mut(id)?;
        let settlement = accrual::settle(id, pool, &mut self.emission, total_weight, at)?;

        if settlement.split.operator_cut > 0 {
            let operator = self.roles.operator.clone();
            self.ledger.mint(
                &self.reward_asset,
                &self.custody,
                &operator,
                settlement.split.operator_cut,
            )?;
        }
        Ok(settlement)
    }

    fn settle_all_inner(&mut self, at: BlockHeight) -> Result<()> {
        for id in 0..self.registry.len() {
            self.settle_inner(id, at)?;
        }
        Ok(())
    }

    /// Pay out `position`'s pending reward at accumulator `acc`, net of the
    /// burn cut. The burn cut is never minted.
    fn harvest_position(
        &mut self,
        account: &AccountId,
        position: &Position,
        acc: u128,
    ) -> Result<HarvestSplit> {
        if position.amount == 0 {
            return Ok(HarvestSplit::default());
        }
        let pending = position.pending(acc)?;
        let split = self.emission.splitter().split_harvest(pending)?;
        if split.payout > 0 {
            self.ledger
                .mint(&self.reward_asset, &self.custody, account, split.payout)?;
        }
        Ok(split)
    }
}

fn unauthorized(action: &'static str, caller: &AccountId) -> FarmError {
    FarmError::Unauthorized {
        action,
        caller: caller.clone(),
    }
}
