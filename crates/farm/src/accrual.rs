//! Lazy per-pool accrual
//!
//! A pool's accumulator only moves when the pool is settled. Settling asks
//! the emission controller for the pool's weighted share of emission since
//! the last settlement, splits off the operator cut and folds the rest into
//! `acc_reward_per_share`. Positions read the accumulator on their own next
//! interaction.

use crate::error::{FarmError, Result};
use crate::pool::Pool;
use brew_economics::{EmissionController, RewardSplit};
use brew_types::{BlockHeight, PoolId, ACC_PRECISION};
use tracing::debug;

/// Outcome of settling one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    pub pool: PoolId,
    pub from_block: BlockHeight,
    pub to_block: BlockHeight,
    pub split: RewardSplit,
}

/// Bring `pool` current at block `at`.
///
/// The operator cut in the returned split is still to be minted by the caller.
pub fn settle(
    id: PoolId,
    pool: &mut Pool,
    emission: &mut EmissionController,
    total_weight: u64,
    at: BlockHeight,
) -> Result<Settlement> {
    let from_block = pool.last_accrual_block;
    let mut settlement = Settlement {
        pool: id,
        from_block,
        to_block: from_block,
        split: RewardSplit::default(),
    };

    if at <= from_block {
        return Ok(settlement);
    }
    settlement.to_block = at;

    // Unstaked intervals earn nothing, now or later.
    if pool.total_staked == 0 {
        pool.last_accrual_block = at;
        return Ok(settlement);
    }

    let elapsed = emission.elapsed(from_block, at);
    let requested = emission.scheduled_emission(elapsed, pool.allocation_weight, total_weight)?;
    let granted = if requested > 0 {
        emission.claim(requested, at)?
    } else {
        0
    };

    let split = emission.splitter().split_emission(granted)?;
    pool.acc_reward_per_share = advance(pool.acc_reward_per_share, split.user_accrual, pool.total_staked)?;
    pool.last_accrual_block = at;
    settlement.split = split;

    debug!(
        target: "farm",
        pool = id,
        from_block,
        to_block = at,
        gross = split.gross,
        operator_cut = split.operator_cut,
        acc_reward_per_share = pool.acc_reward_per_share,
        "pool settled"
    );
    Ok(settlement)
}

/// Accumulator value `pool` would reach if settled at `at`. Read-only.
pub fn preview_acc_reward_per_share(
    pool: &Pool,
    emission: &EmissionController,
    total_weight: u64,
    at: BlockHeight,
) -> Result<u128> {
    if at <= pool.last_accrual_block || pool.total_staked == 0 {
        return Ok(pool.acc_reward_per_share);
    }

    let elapsed = emission.elapsed(pool.last_accrual_block, at);
    let requested = emission.scheduled_emission(elapsed, pool.allocation_weight, total_weight)?;
    let granted = emission.peek_available(requested);
    let split = emission.splitter().split_emission(granted)?;
    advance(pool.acc_reward_per_share, split.user_accrual, pool.total_staked)
}

fn advance(acc: u128, user_accrual: u128, total_staked: u128) -> Result<u128> {
    let increment = user_accrual
        .checked_mul(ACC_PRECISION)
        .ok_or(FarmError::ArithmeticFault("accumulator increment overflow"))?
        .checked_div(total_staked)
        .ok_or(FarmError::ArithmeticFault("accumulator division by zero"))?;
    acc.checked_add(increment)
        .ok_or(FarmError::ArithmeticFault("accumulator overflow"))
}
