//! Emission parameters

use crate::errors::EconomicsError;
use brew_types::{tokens, Amount, BasisPoints, ONE_TOKEN};
use serde::{Deserialize, Serialize};

/// Ceiling on a pool's deposit fee (5%)
pub const MAX_DEPOSIT_FEE_BPS: BasisPoints = 500;

/// Ceiling on the harvest burn fee (5%)
pub const MAX_BURN_FEE_BPS: BasisPoints = 500;

/// Emission parameters fixed at deployment, except `burn_fee_bps`
/// which the owner may adjust within `max_burn_fee_bps`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmissionParams {
    /// Maximum lifetime emission in reward base units
    #[serde(with = "brew_types::amount_serde")]
    pub hard_cap: Amount,
    /// Highest rate an admin update may set (one token per block)
    #[serde(with = "brew_types::amount_serde")]
    pub max_rate_per_block: Amount,
    /// Share of gross emission minted to the operator at settlement
    pub operator_cut_bps: BasisPoints,
    /// Share of every harvest that is never minted
    pub burn_fee_bps: BasisPoints,
    pub max_burn_fee_bps: BasisPoints,
    pub max_deposit_fee_bps: BasisPoints,
}

impl Default for EmissionParams {
    fn default() -> Self {
        Self {
            // 460k tokens lifetime
            hard_cap: tokens(460_000),
            max_rate_per_block: ONE_TOKEN,
            // 10% operator cut
            operator_cut_bps: 1_000,
            // 5% burn on harvest
            burn_fee_bps: 500,
            max_burn_fee_bps: MAX_BURN_FEE_BPS,
            max_deposit_fee_bps: MAX_DEPOSIT_FEE_BPS,
        }
    }
}

impl EmissionParams {
    /// Reject parameter sets that can never settle correctly.
    pub fn validate(&self) -> Result<(), EconomicsError> {
        if self.hard_cap == 0 {
            return Err(EconomicsError::InvalidParameter("hard_cap must be non-zero"));
        }
        if self.operator_cut_bps > 10_000 {
            return Err(EconomicsError::InvalidParameter(
                "operator_cut_bps must not exceed 10000",
            ));
        }
        if self.max_burn_fee_bps > 10_000 || self.max_deposit_fee_bps > 10_000 {
            return Err(EconomicsError::InvalidParameter(
                "fee ceilings must not exceed 10000 bps",
            ));
        }
        if self.burn_fee_bps > self.max_burn_fee_bps {
            return Err(EconomicsError::InvalidBurnFee {
                bps: self.burn_fee_bps,
                max: self.max_burn_fee_bps,
            });
        }
        Ok(())
    }
}
