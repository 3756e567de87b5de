use crate::error::{FarmError, Result};
use brew_types::{AccountId, Amount, PoolId, ACC_PRECISION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One account's stake in one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(with = "brew_types::amount_serde")]
    pub amount: Amount,
    /// `amount × acc_reward_per_share / ACC_PRECISION` at the last settlement
    #[serde(with = "brew_types::amount_serde")]
    pub reward_debt: Amount,
}

impl Position {
    /// Reward entitlement of `amount` at accumulator `acc`.
    pub fn accrued(&self, acc: u128) -> Result<Amount> {
        self.amount
            .checked_mul(acc)
            .map(|v| v / ACC_PRECISION)
            .ok_or(FarmError::ArithmeticFault("accrued reward overflow"))
    }

    /// Unclaimed reward at accumulator `acc`.
    pub fn pending(&self, acc: u128) -> Result<Amount> {
        self.accrued(acc)?
            .checked_sub(self.reward_debt)
            .ok_or(FarmError::ArithmeticFault("reward debt exceeds accrued"))
    }

    /// Mark everything accrued at `acc` as settled.
    pub fn reset_debt(&mut self, acc: u128) -> Result<()> {
        self.reward_debt = self.accrued(acc)?;
        Ok(())
    }
}

/// Positions keyed by pool then account, with an undo journal.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: HashMap<PoolId, HashMap<AccountId, Position>>,
    journal: Vec<(PoolId, AccountId, Option<Position>)>,
    journaling: bool,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: HashMap<PoolId, HashMap<AccountId, Position>>) -> Self {
        Self {
            positions,
            ..Self::default()
        }
    }

    /// Current position, zero if the account never deposited.
    pub fn get(&self, pool: PoolId, account: &AccountId) -> Position {
        self.positions
            .get(&pool)
            .and_then(|accounts| accounts.get(account))
            .copied()
            .unwrap_or_default()
    }

    /// Whether `account` has ever deposited into `pool`.
    pub fn contains(&self, pool: PoolId, account: &AccountId) -> bool {
        self.positions
            .get(&pool)
            .is_some_and(|accounts| accounts.contains_key(account))
    }

    pub fn put(&mut self, pool: PoolId, account: &AccountId, position: Position) {
        let prior = self
            .positions
            .entry(pool)
            .or_default()
            .insert(account.clone(), position);
        if self.journaling {
            self.journal.push((pool, account.clone(), prior));
        }
    }

    /// Positions held in one pool.
    pub fn in_pool(&self, pool: PoolId) -> impl Iterator<Item = (&AccountId, &Position)> {
        self.positions.get(&pool).into_iter().flat_map(|m| m.iter())
    }

    pub fn all(&self) -> &HashMap<PoolId, HashMap<AccountId, Position>> {
        &self.positions
    }

    pub fn checkpoint(&mut self) {
        self.journal.clear();
        self.journaling = true;
    }

    pub fn commit(&mut self) {
        self.journal.clear();
        self.journaling = false;
    }

    pub fn rollback(&mut self) {
        while let Some((pool, account, prior)) = self.journal.pop() {
            let Some(accounts) = self.positions.get_mut(&pool) else {
                continue;
            };
            match prior {
                Some(position) => {
                    accounts.insert(account, position);
                }
                None => {
                    accounts.remove(&account);
                }
            }
        }
        self.positions.retain(|_, accounts| !accounts.is_empty());
        self.journaling = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_from_accumulator() {
        let mut position = Position {
            amount: 100,
            reward_debt: 0,
        };
        assert_eq!(position.pending(9 * ACC_PRECISION).unwrap(), 900);

        position.reset_debt(9 * ACC_PRECISION).unwrap();
        assert_eq!(position.reward_debt, 900);
        assert_eq!(position.pending(45 * ACC_PRECISION).unwrap(), 3_600);
    }

    #[test]
    fn test_debt_above_accrued_is_a_fault() {
        let position = Position {
            amount: 1,
            reward_debt: 10,
        };
        assert!(matches!(
            position.pending(ACC_PRECISION),
            Err(FarmError::ArithmeticFault(_))
        ));
    }

    #[test]
    fn test_missing_position_is_zero() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.get(3, &"nobody".into()), Position::default());
        assert!(!ledger.contains(3, &"nobody".into()));
    }

    #[test]
    fn test_rollback_restores_and_forgets() {
        let mut ledger = PositionLedger::new();
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        ledger.put(0, &alice, Position { amount: 10, reward_debt: 0 });

        ledger.checkpoint();
        ledger.put(0, &alice, Position { amount: 25, reward_debt: 5 });
        ledger.put(0, &bob, Position { amount: 7, reward_debt: 0 });
        ledger.put(1, &bob, Position { amount: 1, reward_debt: 0 });
        ledger.rollback();

        assert_eq!(ledger.get(0, &alice).amount, 10);
        assert_eq!(ledger.get(0, &bob), Position::default());
        assert_eq!(ledger.in_pool(0).count(), 1);
        assert!(!ledger.all().contains_key(&1));
    }

    #[test]
    fn test_commit_keeps_writes() {
        let mut ledger = PositionLedger::new();
        let alice = AccountId::from("alice");
        ledger.checkpoint();
        ledger.put(0, &alice, Position { amount: 3, reward_debt: 0 });
        ledger.commit();
        ledger.rollback();
        assert_eq!(ledger.get(0, &alice).amount, 3);
    }
}
