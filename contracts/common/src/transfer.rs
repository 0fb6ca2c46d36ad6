//! Native Value Transfers
//!
//! Contracts never move value themselves; they hand the payout to a
//! [`NativeTransfer`] implementation supplied by the runtime. A failed
//! transfer must leave the caller free to roll back.

#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{FundMeError, FundMeResult};
use crate::types::{Address, Amount};

/// Moves native value out of a contract
pub trait NativeTransfer {
    /// Send `amount` to `to`. Errors mean nothing was sent.
    fn send(&mut self, to: &Address, amount: Amount) -> FundMeResult<()>;
}

/// In-memory account balances
///
/// Addresses marked with [`BalanceBook::reject`] refuse incoming value,
/// like an account without a receive hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceBook {
    balances: BTreeMap<Address, Amount>,
    rejecting: BTreeSet<Address>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account directly (genesis allocation)
    pub fn credit(&mut self, account: Address, amount: Amount) -> FundMeResult<()> {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(FundMeError::Overflow)?;
        Ok(())
    }

    /// Debit an account, e.g. to attach value to a call
    pub fn debit(&mut self, account: &Address, amount: Amount) -> FundMeResult<()> {
        let balance = self.balance_of(account);
        let remaining = balance.checked_sub(amount).ok_or(FundMeError::TransferFailed {
            to: *account,
            amount,
        })?;
        self.balances.insert(*account, remaining);
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Make `account` refuse all incoming transfers
    pub fn reject(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    /// Let `account` receive transfers again
    pub fn accept(&mut self, account: &Address) {
        self.rejecting.remove(account);
    }
}

impl NativeTransfer for BalanceBook {
    fn send(&mut self, to: &Address, amount: Amount) -> FundMeResult<()> {
        if self.rejecting.contains(to) {
            return Err(FundMeError::TransferFailed { to: *to, amount });
        }
        let entry = self.balances.entry(*to).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(FundMeError::TransferFailed { to: *to, amount })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_credits_recipient() {
        let mut book = BalanceBook::new();
        book.send(&[1u8; 32], 100).unwrap();
        book.send(&[1u8; 32], 50).unwrap();
        assert_eq!(book.balance_of(&[1u8; 32]), 150);
        assert_eq!(book.balance_of(&[2u8; 32]), 0);
    }

    #[test]
    fn test_rejecting_recipient() {
        let mut book = BalanceBook::new();
        book.reject([1u8; 32]);

        let result = book.send(&[1u8; 32], 100);
        assert_eq!(result, Err(FundMeError::TransferFailed { to: [1u8; 32], amount: 100 }));
        assert_eq!(book.balance_of(&[1u8; 32]), 0);

        book.accept(&[1u8; 32]);
        assert!(book.send(&[1u8; 32], 100).is_ok());
    }

    #[test]
    fn test_debit() {
        let mut book = BalanceBook::new();
        book.credit([3u8; 32], 10).unwrap();
        book.debit(&[3u8; 32], 4).unwrap();
        assert_eq!(book.balance_of(&[3u8; 32]), 6);
        assert!(book.debit(&[3u8; 32], 7).is_err());
        assert_eq!(book.balance_of(&[3u8; 32]), 6);
    }
}
