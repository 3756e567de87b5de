//! Asset ledger interface for the farm
//!
//! Provides a deterministic interface for minting, transferring and
//! reading balances of every asset the farm touches, plus a write journal
//! so a failed farm call can revert every ledger write it made.

use crate::errors::LedgerError;
use crate::token::{AssetBook, TokenPolicy, TransferQuote};
use brew_types::{AccountId, Amount, AssetId};
use std::collections::HashMap;
use tracing::{debug, info};

/// Interface for fungible asset operations.
pub trait AssetLedger: Send + Sync {
    /// Mint `amount` of `asset` to `to`. Only the asset's minter may call.
    fn mint(
        &mut self,
        asset: &AssetId,
        minter: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`; returns what `to` actually received.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError>;

    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Result<Amount, LedgerError>;

    fn total_supply(&self, asset: &AssetId) -> Result<Amount, LedgerError>;

    /// Open a checkpoint. Checkpoints nest.
    fn checkpoint(&mut self);

    /// Keep every write since the innermost checkpoint.
    fn commit(&mut self) -> Result<(), LedgerError>;

    /// Undo every write since the innermost checkpoint.
    fn rollback(&mut self) -> Result<(), LedgerError>;
}

// -----------------------------------------------------------------------------
// In-memory implementation
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum JournalEntry {
    Balance {
        asset: AssetId,
        account: AccountId,
        prior: Option<Amount>,
    },
    Supply {
        asset: AssetId,
        prior: Amount,
    },
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetLedger {
    books: HashMap<AssetId, AssetBook>,
    journal: Vec<JournalEntry>,
    checkpoints: Vec<usize>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new asset under `policy`.
    pub fn create_asset(&mut self, asset: AssetId, policy: TokenPolicy) -> Result<(), LedgerError> {
        if self.books.contains_key(&asset) {
            return Err(LedgerError::AssetExists(asset));
        }
        policy.validate()?;
        info!(target: "treasury", "Registered asset {} (minter {})", asset, policy.minter);
        self.books.insert(asset.clone(), AssetBook::new(asset, policy));
        Ok(())
    }

    pub fn book(&self, asset: &AssetId) -> Result<&AssetBook, LedgerError> {
        self.books
            .get(asset)
            .ok_or_else(|| LedgerError::UnknownAsset(asset.clone()))
    }

    pub fn policy(&self, asset: &AssetId) -> Result<&TokenPolicy, LedgerError> {
        Ok(&self.book(asset)?.policy)
    }

    /// Hand minting rights to `new_minter`. Only the current minter may call.
    pub fn set_minter(
        &mut self,
        asset: &AssetId,
        caller: &AccountId,
        new_minter: AccountId,
    ) -> Result<(), LedgerError> {
        let book = self.book_mut(asset)?;
        if &book.policy.minter != caller {
            return Err(unauthorized(asset, caller));
        }
        info!(target: "treasury", "Minter of {} moved to {}", asset, new_minter);
        book.policy.minter = new_minter;
        Ok(())
    }

    /// Add or remove a fee-exempt account. Only the asset admin may call.
    pub fn set_whitelisted(
        &mut self,
        asset: &AssetId,
        caller: &AccountId,
        account: AccountId,
        whitelisted: bool,
    ) -> Result<(), LedgerError> {
        let book = self.book_mut(asset)?;
        if &book.policy.admin != caller {
            return Err(unauthorized(asset, caller));
        }
        debug!(target: "treasury", "Whitelist {} on {}: {}", account, asset, whitelisted);
        if whitelisted {
            book.policy.whitelist.insert(account);
        } else {
            book.policy.whitelist.remove(&account);
        }
        Ok(())
    }

    /// Point the transfer fee at `recipient`. Only the asset admin may call.
    pub fn set_fee_recipient(
        &mut self,
        asset: &AssetId,
        caller: &AccountId,
        recipient: AccountId,
    ) -> Result<(), LedgerError> {
        if recipient.as_str().is_empty() {
            return Err(LedgerError::InvalidPolicy("empty fee recipient"));
        }
        let book = self.book_mut(asset)?;
        if &book.policy.admin != caller {
            return Err(unauthorized(asset, caller));
        }
        let fee = book
            .policy
            .transfer_fee
            .as_mut()
            .ok_or(LedgerError::InvalidPolicy("asset charges no transfer fee"))?;
        info!(target: "treasury", "Fee recipient of {} moved to {}", asset, recipient);
        fee.fee_recipient = recipient;
        Ok(())
    }

    /// Destroy `amount` held by `account`. Only the asset admin may call.
    pub fn burn(
        &mut self,
        asset: &AssetId,
        caller: &AccountId,
        account: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let book = self.book(asset)?;
        if &book.policy.admin != caller {
            return Err(unauthorized(asset, caller));
        }
        let balance = book.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.clone(),
                account: account.clone(),
                balance,
                requested: amount,
            });
        }
        let supply = book.total_supply.saturating_sub(amount);

        self.set_balance(asset, account, balance - amount);
        self.set_supply(asset, supply);
        debug!(target: "treasury", "Burned {} {} from {}", amount, asset, account);
        Ok(())
    }

    pub fn quote_transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<TransferQuote, LedgerError> {
        self.book(asset)?.policy.quote(from, to, amount)
    }

    pub fn open_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    fn book_mut(&mut self, asset: &AssetId) -> Result<&mut AssetBook, LedgerError> {
        self.books
            .get_mut(asset)
            .ok_or_else(|| LedgerError::UnknownAsset(asset.clone()))
    }

    fn set_balance(&mut self, asset: &AssetId, account: &AccountId, value: Amount) {
        let journaling = !self.checkpoints.is_empty();
        let Some(book) = self.books.get_mut(asset) else {
            return;
        };
        let prior = book.balances.insert(account.clone(), value);
        if journaling {
            self.journal.push(JournalEntry::Balance {
                asset: asset.clone(),
                account: account.clone(),
                prior,
            });
        }
    }

    fn set_supply(&mut self, asset: &AssetId, value: Amount) {
        let journaling = !self.checkpoints.is_empty();
        let Some(book) = self.books.get_mut(asset) else {
            return;
        };
        let prior = std::mem::replace(&mut book.total_supply, value);
        if journaling {
            self.journal.push(JournalEntry::Supply {
                asset: asset.clone(),
                prior,
            });
        }
    }
}

fn unauthorized(asset: &AssetId, caller: &AccountId) -> LedgerError {
    LedgerError::Unauthorized {
        asset: asset.clone(),
        caller: caller.clone(),
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn mint(
        &mut self,
        asset: &AssetId,
        minter: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let book = self.book(asset)?;
        if &book.policy.minter != minter {
            return Err(unauthorized(asset, minter));
        }

        if let (Some(cap), Some(headroom)) = (book.policy.hard_cap, book.mintable()) {
            if amount > headroom {
                return Err(LedgerError::HardCapExceeded {
                    asset: asset.clone(),
                    cap,
                    amount,
                });
            }
        }
        let new_supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total supply"))?;
        let new_balance = book
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("balance"))?;

        self.set_balance(asset, to, new_balance);
        self.set_supply(asset, new_supply);

        debug!(target: "treasury", "Minted {} {} to {}", amount, asset, to);
        Ok(())
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let book = self.book(asset)?;
        let balance = book.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.clone(),
                account: from.clone(),
                balance,
                requested: amount,
            });
        }

        let quote = self.quote_transfer(asset, from, to, amount)?;
        let fee_recipient = book
            .policy
            .transfer_fee
            .as_ref()
            .map(|fee| fee.fee_recipient.clone());
        let supply = book.total_supply;

        // Debit first so a self-transfer nets out correctly.
        self.set_balance(asset, from, balance - amount);

        let to_balance = self.book(asset)?.balance_of(to);
        let credited = to_balance
            .checked_add(quote.received)
            .ok_or(LedgerError::Overflow("balance"))?;
        self.set_balance(asset, to, credited);

        if quote.fee > 0 {
            if let Some(recipient) = fee_recipient {
                let fee_balance = self.book(asset)?.balance_of(&recipient);
                let credited = fee_balance
                    .checked_add(quote.fee)
                    .ok_or(LedgerError::Overflow("balance"))?;
                self.set_balance(asset, &recipient, credited);
            }
        }
        if quote.burned > 0 {
            self.set_supply(asset, supply.saturating_sub(quote.burned));
        }

        debug!(
            target: "treasury",
            "Transfer {} {}: {} -> {} (received {}, fee {}, burned {})",
            amount, asset, from, to, quote.received, quote.fee, quote.burned
        );
        Ok(quote.received)
    }

    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Result<Amount, LedgerError> {
        Ok(self.book(asset)?.balance_of(account))
    }

    fn total_supply(&self, asset: &AssetId) -> Result<Amount, LedgerError> {
        Ok(self.book(asset)?.total_supply)
    }

    fn checkpoint(&mut self) {
        self.checkpoints.push(self.journal.len());
    }

    fn commit(&mut self) -> Result<(), LedgerError> {
        self.checkpoints.pop().ok_or(LedgerError::NoCheckpoint)?;
        if self.checkpoints.is_empty() {
            self.journal.clear();
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), LedgerError> {
        let mark = self.checkpoints.pop().ok_or(LedgerError::NoCheckpoint)?;
        while self.journal.len() > mark {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry {
                JournalEntry::Balance {
                    asset,
                    account,
                    prior,
                } => {
                    if let Some(book) = self.books.get_mut(&asset) {
                        match prior {
                            Some(value) => {
                                book.balances.insert(account, value);
                            }
                            None => {
                                book.balances.remove(&account);
                            }
                        }
                    }
                }
                JournalEntry::Supply { asset, prior } => {
                    if let Some(book) = self.books.get_mut(&asset) {
                        book.total_supply = prior;
                    }
                }
            }
        }
        debug!(target: "treasury", "Rolled back ledger to journal mark {}", mark);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(asset: &str, minter: &str) -> InMemoryAssetLedger {
        let mut ledger = InMemoryAssetLedger::new();
        ledger
            .create_asset(asset.into(), TokenPolicy::new(minter.into()))
            .unwrap();
        ledger
    }

    #[test]
    fn test_mint_and_transfer() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");

        ledger.mint(&lp, &"owner".into(), &"alice".into(), 1_000).unwrap();
        let received = ledger
            .transfer(&lp, &"alice".into(), &"bob".into(), 300)
            .unwrap();

        assert_eq!(received, 300);
        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 700);
        assert_eq!(ledger.balance_of(&lp, &"bob".into()).unwrap(), 300);
        assert_eq!(ledger.total_supply(&lp).unwrap(), 1_000);
    }

    #[test]
    fn test_only_minter_mints() {
        let mut ledger = ledger_with("LP", "owner");
        let result = ledger.mint(&"LP".into(), &"mallory".into(), &"mallory".into(), 1);
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert_eq!(ledger.total_supply(&"LP".into()).unwrap(), 0);
    }

    #[test]
    fn test_insufficient_balance_has_no_side_effects() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 100).unwrap();

        let result = ledger.transfer(&lp, &"alice".into(), &"carol".into(), 110);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 100);
        assert_eq!(ledger.balance_of(&lp, &"carol".into()).unwrap(), 0);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 100).unwrap();
        ledger.transfer(&lp, &"alice".into(), &"alice".into(), 60).unwrap();
        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 100);
    }

    #[test]
    fn test_rollback_restores_balances_and_supply() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 100).unwrap();

        ledger.checkpoint();
        ledger.mint(&lp, &"owner".into(), &"bob".into(), 50).unwrap();
        ledger.transfer(&lp, &"alice".into(), &"bob".into(), 40).unwrap();
        ledger.rollback().unwrap();

        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 100);
        assert_eq!(ledger.balance_of(&lp, &"bob".into()).unwrap(), 0);
        assert_eq!(ledger.total_supply(&lp).unwrap(), 100);
        assert!(!ledger.book(&lp).unwrap().balances.contains_key(&AccountId::from("bob")));
    }

    #[test]
    fn test_nested_checkpoints() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");

        ledger.checkpoint();
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 10).unwrap();
        ledger.checkpoint();
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 5).unwrap();
        ledger.rollback().unwrap();
        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 10);
        ledger.commit().unwrap();

        assert_eq!(ledger.open_checkpoints(), 0);
        assert_eq!(ledger.commit(), Err(LedgerError::NoCheckpoint));
        assert_eq!(ledger.total_supply(&lp).unwrap(), 10);
    }

    #[test]
    fn test_admin_burn() {
        let mut ledger = ledger_with("LP", "owner");
        let lp = AssetId::from("LP");
        ledger.mint(&lp, &"owner".into(), &"alice".into(), 100).unwrap();

        assert!(matches!(
            ledger.burn(&lp, &"alice".into(), &"alice".into(), 10),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(matches!(
            ledger.burn(&lp, &"owner".into(), &"alice".into(), 101),
            Err(LedgerError::InsufficientBalance { .. })
        ));

        ledger.burn(&lp, &"owner".into(), &"alice".into(), 40).unwrap();
        assert_eq!(ledger.balance_of(&lp, &"alice".into()).unwrap(), 60);
        assert_eq!(ledger.total_supply(&lp).unwrap(), 60);

        ledger.checkpoint();
        ledger.burn(&lp, &"owner".into(), &"alice".into(), 60).unwrap();
        ledger.rollback().unwrap();
        assert_eq!(ledger.total_supply(&lp).unwrap(), 60);
    }

    #[test]
    fn test_duplicate_and_unknown_assets() {
        let mut ledger = ledger_with("LP", "owner");
        assert_eq!(
            ledger.create_asset("LP".into(), TokenPolicy::new("owner".into())),
            Err(LedgerError::AssetExists("LP".into()))
        );
        assert_eq!(
            ledger.total_supply(&"NOPE".into()),
            Err(LedgerError::UnknownAsset("NOPE".into()))
        );
    }
}
