//! Token policies
//!
//! A policy decides who may mint, how much may ever be in supply, and what
//! a transfer costs. Transfer fees are flat basis points of the amount sent:
//! the fee share is credited to `fee_recipient`, the burn share leaves
//! supply. A whitelisted sender or receiver pays neither.

use crate::errors::LedgerError;
use brew_types::{bps_of, AccountId, Amount, AssetId, BasisPoints, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFee {
    pub fee_bps: BasisPoints,
    pub burn_bps: BasisPoints,
    pub fee_recipient: AccountId,
}

impl TransferFee {
    /// 0.1% to the fee recipient plus 0.9% burned.
    pub fn reward_token_default(fee_recipient: AccountId) -> Self {
        Self {
            fee_bps: 10,
            burn_bps: 90,
            fee_recipient,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPolicy {
    /// Manages the whitelist and the fee recipient
    pub admin: AccountId,
    /// Sole account allowed to mint
    pub minter: AccountId,
    pub hard_cap: Option<Amount>,
    pub transfer_fee: Option<TransferFee>,
    pub whitelist: BTreeSet<AccountId>,
}

impl TokenPolicy {
    /// Uncapped, fee-free asset administered and minted by `minter`.
    pub fn new(minter: AccountId) -> Self {
        Self {
            admin: minter.clone(),
            minter,
            hard_cap: None,
            transfer_fee: None,
            whitelist: BTreeSet::new(),
        }
    }

    pub fn with_hard_cap(mut self, cap: Amount) -> Self {
        self.hard_cap = Some(cap);
        self
    }

    pub fn with_transfer_fee(mut self, fee: TransferFee) -> Self {
        self.transfer_fee = Some(fee);
        self
    }

    pub fn with_whitelisted(mut self, account: AccountId) -> Self {
        self.whitelist.insert(account);
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(fee) = &self.transfer_fee {
            let total = fee.fee_bps as u128 + fee.burn_bps as u128;
            if total > BPS_DENOMINATOR {
                return Err(LedgerError::InvalidPolicy("transfer fee above 100%"));
            }
            if fee.fee_recipient.as_str().is_empty() {
                return Err(LedgerError::InvalidPolicy("empty fee recipient"));
            }
        }
        if self.minter.as_str().is_empty() {
            return Err(LedgerError::InvalidPolicy("empty minter"));
        }
        Ok(())
    }

    pub fn is_whitelisted(&self, account: &AccountId) -> bool {
        self.whitelist.contains(account)
    }

    /// Price a transfer without touching balances.
    pub fn quote(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<TransferQuote, LedgerError> {
        let fee = match &self.transfer_fee {
            Some(fee) if !self.is_whitelisted(from) && !self.is_whitelisted(to) => fee,
            _ => return Ok(TransferQuote::free(amount)),
        };

        let fee_amount =
            bps_of(amount, fee.fee_bps).ok_or(LedgerError::Overflow("transfer fee"))?;
        let burned = bps_of(amount, fee.burn_bps).ok_or(LedgerError::Overflow("transfer burn"))?;
        let received = amount
            .checked_sub(fee_amount)
            .and_then(|v| v.checked_sub(burned))
            .ok_or(LedgerError::Overflow("transfer fee exceeds amount"))?;

        Ok(TransferQuote {
            sent: amount,
            fee: fee_amount,
            burned,
            received,
        })
    }
}

/// Breakdown of one transfer. `sent == fee + burned + received`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferQuote {
    pub sent: Amount,
    pub fee: Amount,
    pub burned: Amount,
    pub received: Amount,
}

impl TransferQuote {
    fn free(amount: Amount) -> Self {
        Self {
            sent: amount,
            fee: 0,
            burned: 0,
            received: amount,
        }
    }
}

/// Balances and supply of one asset under its policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBook {
    pub asset: AssetId,
    pub policy: TokenPolicy,
    pub balances: HashMap<AccountId, Amount>,
    pub total_supply: Amount,
}

impl AssetBook {
    pub fn new(asset: AssetId, policy: TokenPolicy) -> Self {
        Self {
            asset,
            policy,
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Headroom left under the hard cap, if any.
    pub fn mintable(&self) -> Option<Amount> {
        self.policy
            .hard_cap
            .map(|cap| cap.saturating_sub(self.total_supply))
    }
}
