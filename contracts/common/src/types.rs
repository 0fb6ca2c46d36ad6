//! Core Types for the FundMe Protocol
//!
//! This module defines the data structures shared by the fund contract
//! and the price feed contract.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::cost;

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for app identifiers
pub type AppId = [u8; 32];

/// Native currency amount in base units (18 decimals)
pub type Amount = u128;

/// Price feed round identifier
pub type RoundId = u64;

/// Derive a deterministic address from a label
///
/// Used for fixtures and for naming well-known identities.
pub fn address_from_seed(seed: &[u8]) -> Address {
    let digest = Sha256::digest(seed);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

// ============ Oracle Types ============

/// Current rate and its precision, as reported by a price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceReading {
    /// Raw answer (e.g. 2000_00000000 for $2,000 with 8 decimals)
    pub answer: i128,
    /// Number of fractional digits in `answer`
    pub decimals: u8,
}

impl PriceReading {
    pub fn new(answer: i128, decimals: u8) -> Self {
        Self { answer, decimals }
    }
}

/// Full round data, aggregator style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RoundData {
    pub round_id: RoundId,
    pub answer: i128,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: RoundId,
}

// ============ Withdrawal Types ============

/// How a withdrawal walks the funder list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum WithdrawStrategy {
    /// Re-read the funder list from storage on every iteration
    #[default]
    Direct = 0,
    /// Copy the funder list once, then iterate the copy
    WorkingCopy = 1,
}

/// Storage accesses performed by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccessCost {
    pub storage_reads: u64,
    pub storage_writes: u64,
    pub memory_reads: u64,
}

impl AccessCost {
    pub fn read(&mut self) {
        self.storage_reads += 1;
    }

    pub fn write(&mut self) {
        self.storage_writes += 1;
    }

    pub fn memory_read(&mut self) {
        self.memory_reads += 1;
    }

    /// Weighted cost in protocol cost units
    pub fn units(&self) -> u64 {
        self.storage_reads
            .saturating_mul(cost::STORAGE_READ)
            .saturating_add(self.storage_writes.saturating_mul(cost::STORAGE_WRITE))
            .saturating_add(self.memory_reads.saturating_mul(cost::MEMORY_READ))
    }
}

/// Outcome of a successful withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct WithdrawReceipt {
    /// Amount paid to the owner
    pub amount: Amount,
    /// Funder list entries walked (duplicates included)
    pub funders_cleared: u64,
    pub strategy: WithdrawStrategy,
    pub cost: AccessCost,
}

// ============ Contract Actions ============

/// Actions for the FundMe contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FundMeAction {
    /// Create the contract with its owner and price feed
    Initialize { owner: Address, price_feed: AppId },
    /// Contribute `amount` from the signer
    Fund { amount: Amount },
    /// Owner drains the balance, direct strategy
    Withdraw,
    /// Owner drains the balance, working-copy strategy
    CheaperWithdraw,
}

impl FundMeAction {
    /// Withdrawal strategy for withdraw actions
    pub fn withdraw_strategy(&self) -> Option<WithdrawStrategy> {
        match self {
            Self::Withdraw => Some(WithdrawStrategy::Direct),
            Self::CheaperWithdraw => Some(WithdrawStrategy::WorkingCopy),
            _ => None,
        }
    }
}

/// Actions for the mock price feed contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PriceFeedAction {
    /// Create the feed with its admin, operator, precision and first answer
    Initialize {
        admin: Address,
        operator: Address,
        decimals: u8,
        initial_answer: i128,
    },
    /// Publish a new answer as the next round
    UpdateAnswer { answer: i128 },
    /// Overwrite a specific round
    UpdateRoundData {
        round_id: RoundId,
        answer: i128,
        timestamp: u64,
        started_at: u64,
    },
    /// Change the operator
    SetOperator { operator: Address },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_seed_is_deterministic() {
        assert_eq!(address_from_seed(b"owner"), address_from_seed(b"owner"));
        assert_ne!(address_from_seed(b"owner"), address_from_seed(b"funder"));
        assert_ne!(address_from_seed(b"owner"), [0u8; 32]);
    }

    #[test]
    fn test_access_cost_units() {
        let mut cost = AccessCost::default();
        cost.read();
        cost.read();
        cost.write();
        cost.memory_read();

        assert_eq!(cost.storage_reads, 2);
        assert_eq!(cost.units(), 2 * 2_100 + 5_000 + 3);
    }

    #[test]
    fn test_action_strategy() {
        assert_eq!(FundMeAction::Withdraw.withdraw_strategy(), Some(WithdrawStrategy::Direct));
        assert_eq!(
            FundMeAction::CheaperWithdraw.withdraw_strategy(),
            Some(WithdrawStrategy::WorkingCopy)
        );
        assert_eq!(FundMeAction::Fund { amount: 1 }.withdraw_strategy(), None);
    }
}
