//! Brew Monetary Units
//!
//! All balances, emissions and fees are integer base units (`Amount`).
//! The reward token carries 18 decimals, so `ONE_TOKEN` base units make one
//! whole token. Percentages are basis points (10_000 = 100%).
//!
//! NO floating point is used anywhere in reward or fee computation.

/// Amount in base units of any fungible asset
pub type Amount = u128;

/// Block height reported by the external clock
pub type BlockHeight = u64;

/// Basis points (1 bp = 0.01%)
pub type BasisPoints = u16;

/// Number of decimal places of the reward token
pub const REWARD_DECIMALS: u32 = 18;

/// One whole reward token in base units
pub const ONE_TOKEN: Amount = 10u128.pow(REWARD_DECIMALS);

/// Basis points denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Fixed-point scale of the reward-per-share accumulator
pub const ACC_PRECISION: u128 = 1_000_000_000_000; // 10^12

/// Convert whole tokens to base units (saturating)
#[inline]
pub const fn tokens(whole: u128) -> Amount {
    whole.saturating_mul(ONE_TOKEN)
}

/// Safe multiplication followed by division.
/// Returns None on overflow or when the divisor is zero.
#[inline]
pub fn mul_div(n: u128, mul: u128, div: u128) -> Option<u128> {
    if div == 0 {
        return None;
    }
    n.checked_mul(mul).map(|product| product / div)
}

/// Apply a basis-point rate to an amount, rounding down.
#[inline]
pub fn bps_of(amount: Amount, bps: BasisPoints) -> Option<Amount> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}
