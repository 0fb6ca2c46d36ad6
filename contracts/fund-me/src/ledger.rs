//! Contribution Ledger
//!
//! Per-funder cumulative amounts plus the ordered list of funding events.
//! A funder appears in the list once per contribution, so resetting walks
//! the list (duplicates included) rather than a set of unique funders.
//!
//! Both reset walks leave the ledger in the same state; they only differ
//! in the storage accesses recorded in [`AccessCost`].

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use fundme_common::{
    errors::{FundMeError, FundMeResult},
    types::{AccessCost, Address, Amount, WithdrawStrategy},
    validation::checked_sum,
};

/// Funder list and contribution map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Ledger {
    funders: Vec<Address>,
    contributions: BTreeMap<Address, Amount>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `funder`'s total and append a funding event.
    ///
    /// Returns the funder's new cumulative amount. Nothing changes on error.
    pub fn record(&mut self, funder: Address, amount: Amount) -> FundMeResult<Amount> {
        let total = self
            .amount_funded(&funder)
            .checked_add(amount)
            .ok_or(FundMeError::Overflow)?;

        self.contributions.insert(funder, total);
        self.funders.push(funder);
        Ok(total)
    }

    /// Cumulative amount funded by `funder` (0 if never funded)
    pub fn amount_funded(&self, funder: &Address) -> Amount {
        self.contributions.get(funder).copied().unwrap_or(0)
    }

    /// Funder of the `index`-th funding event
    pub fn funder(&self, index: usize) -> FundMeResult<Address> {
        self.funders
            .get(index)
            .copied()
            .ok_or(FundMeError::FunderIndexOutOfRange {
                index,
                len: self.funders.len(),
            })
    }

    pub fn funders(&self) -> &[Address] {
        &self.funders
    }

    pub fn len(&self) -> usize {
        self.funders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funders.is_empty()
    }

    /// Sum of all contributions
    pub fn total(&self) -> FundMeResult<Amount> {
        checked_sum(self.contributions.values())
    }

    /// Zero every listed funder's contribution and clear the list.
    ///
    /// Returns the storage accesses performed and the number of list
    /// entries walked.
    pub fn reset(&mut self, strategy: WithdrawStrategy) -> (AccessCost, u64) {
        let mut cost = AccessCost::default();

        let walked = match strategy {
            WithdrawStrategy::Direct => self.reset_direct(&mut cost),
            WithdrawStrategy::WorkingCopy => self.reset_from_copy(&mut cost),
        };

        self.funders.clear();
        cost.write();

        (cost, walked)
    }

    /// Loop bound and element are both read from storage each iteration
    fn reset_direct(&mut self, cost: &mut AccessCost) -> u64 {
        let mut index = 0usize;
        loop {
            cost.read();
            if index >= self.funders.len() {
                break;
            }

            cost.read();
            let funder = self.funders[index];

            cost.write();
            self.contributions.remove(&funder);

            index += 1;
        }
        index as u64
    }

    /// One bulk read into a working copy, then memory-only iteration
    fn reset_from_copy(&mut self, cost: &mut AccessCost) -> u64 {
        cost.read();
        let funders = self.funders.clone();
        cost.storage_reads += funders.len() as u64;

        for funder in &funders {
            cost.memory_read();
            cost.write();
            self.contributions.remove(funder);
        }
        funders.len() as u64
    }
}
