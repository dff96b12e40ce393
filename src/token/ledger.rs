use std::collections::HashMap;

use crate::mining::ContractError;
use crate::wallet::Address;

/// Address -> balance map in token base units.
/// Supply accounting lives with the contract; this only holds balances.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenLedger {
    balances: HashMap<Address, u64>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn balance_of(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, to: &Address, amount: u64) -> Result<(), ContractError> {
        let balance = self.balances.entry(to.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit(&mut self, from: &Address, amount: u64) -> Result<(), ContractError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(ContractError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if available == amount {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), available - amount);
        }
        Ok(())
    }

    /// Move `amount` between accounts; nothing changes on failure.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), ContractError> {
        if from == to {
            return match self.balance_of(from) {
                available if available < amount => Err(ContractError::InsufficientBalance {
                    required: amount,
                    available,
                }),
                _ => Ok(()),
            };
        }
        let receiving = self.balance_of(to);
        receiving
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Sum of all balances.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_and_debit() {
        let mut ledger = TokenLedger::new();
        let alice = Address::from("alice");
        ledger.credit(&alice, 100).unwrap();
        ledger.debit(&alice, 40).unwrap();
        assert_eq!(ledger.balance_of(&alice), 60);
        assert_eq!(
            ledger.debit(&alice, 61),
            Err(ContractError::InsufficientBalance {
                required: 61,
                available: 60
            })
        );
        ledger.debit(&alice, 60).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn transfer_moves_balance() {
        let mut ledger = TokenLedger::new();
        let (a, b) = (Address::from("a"), Address::from("b"));
        ledger.credit(&a, 10).unwrap();
        ledger.transfer(&a, &b, 4).unwrap();
        assert_eq!(ledger.balance_of(&a), 6);
        assert_eq!(ledger.balance_of(&b), 4);
        assert_eq!(ledger.total(), 10);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn failed_transfer_changes_nothing() {
        let mut ledger = TokenLedger::new();
        let (a, b) = (Address::from("a"), Address::from("b"));
        ledger.credit(&a, 1).unwrap();
        ledger.credit(&b, u64::MAX).unwrap();
        let before = ledger.clone();
        assert_eq!(ledger.transfer(&a, &b, 1), Err(ContractError::ArithmeticOverflow));
        assert!(ledger.transfer(&a, &b, 2).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn self_transfer_is_a_balance_check() {
        let mut ledger = TokenLedger::new();
        let a = Address::from("a");
        ledger.credit(&a, 5).unwrap();
        ledger.transfer(&a, &a, 5).unwrap();
        assert_eq!(ledger.balance_of(&a), 5);
        assert!(ledger.transfer(&a, &a, 6).is_err());
    }
}
