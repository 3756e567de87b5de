//! Fee splitting for settlements and harvests
//!
//! Gross emission granted to a pool is split once at settlement: the
//! operator cut is minted right away and the remainder accrues to stakers.
//! The burn cut is taken later, from each harvest, and is never minted.

use crate::errors::EconomicsError;
use brew_types::{mul_div, Amount, BasisPoints, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Split of one settlement's gross emission.
/// Invariant: `gross == operator_cut + user_accrual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardSplit {
    pub gross: Amount,
    pub operator_cut: Amount,
    pub user_accrual: Amount,
}

/// Split of one harvest.
/// Invariant: `pending == burned + payout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HarvestSplit {
    pub pending: Amount,
    pub burned: Amount,
    pub payout: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplitter {
    operator_cut_bps: BasisPoints,
    burn_fee_bps: BasisPoints,
}

impl FeeSplitter {
    pub fn new(operator_cut_bps: BasisPoints, burn_fee_bps: BasisPoints) -> Self {
        Self {
            operator_cut_bps,
            burn_fee_bps,
        }
    }

    pub fn operator_cut_bps(&self) -> BasisPoints {
        self.operator_cut_bps
    }

    pub fn burn_fee_bps(&self) -> BasisPoints {
        self.burn_fee_bps
    }

    pub fn split_emission(&self, gross: Amount) -> Result<RewardSplit, EconomicsError> {
        let operator_cut = cut(gross, self.operator_cut_bps, "operator cut overflow")?;
        let user_accrual = gross
            .checked_sub(operator_cut)
            .ok_or(EconomicsError::ArithmeticFault("operator cut exceeds gross"))?;
        Ok(RewardSplit {
            gross,
            operator_cut,
            user_accrual,
        })
    }

    pub fn split_harvest(&self, pending: Amount) -> Result<HarvestSplit, EconomicsError> {
        let burned = cut(pending, self.burn_fee_bps, "burn cut overflow")?;
        let payout = pending
            .checked_sub(burned)
            .ok_or(EconomicsError::ArithmeticFault("burn cut exceeds pending"))?;
        Ok(HarvestSplit {
            pending,
            burned,
            payout,
        })
    }
}

fn cut(amount: Amount, bps: BasisPoints, what: &'static str) -> Result<Amount, EconomicsError> {
    if bps as u128 > BPS_DENOMINATOR {
        return Err(EconomicsError::InvalidParameter("basis points above 10000"));
    }
    mul_div(amount, bps as u128, BPS_DENOMINATOR).ok_or(EconomicsError::ArithmeticFault(what))
}
