//! Error Types for the FundMe Protocol
//!
//! Typed errors with stable codes. Every failure aborts the whole
//! operation, so an error always implies "no state changed".

use crate::types::{Address, Amount};

/// Result type alias for FundMe operations
pub type FundMeResult<T> = Result<T, FundMeError>;

/// Main error enum for all FundMe protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundMeError {
    // ============ Funding Errors ============
    /// Contribution is worth less than the minimum USD value
    InsufficientValue { usd_value: Amount, minimum: Amount },

    // ============ Authorization Errors ============
    /// Withdrawal attempted by someone other than the owner
    NotOwner { expected: Address, actual: Address },

    /// Caller is not the authorized operator
    Unauthorized { expected: Address, actual: Address },

    /// Only the feed admin can perform this action
    AdminOnly,

    /// No input of the transaction is locked to the claimed signer
    MissingSignature { signer: Address },

    // ============ Transfer Errors ============
    /// Payout of the held balance failed
    TransferFailed { to: Address, amount: Amount },

    /// Coins held by the contract do not match its recorded balance
    ValueMismatch { expected: Amount, actual: Amount },

    // ============ Read Errors ============
    /// Funder index past the end of the funder list
    FunderIndexOutOfRange { index: usize, len: usize },

    // ============ Oracle Errors ============
    /// Price feed did not answer
    OracleUnavailable,

    /// Price feed answered with an unusable value
    OracleMalformed { answer: i128, decimals: u8 },

    /// Requested round does not exist in the feed
    RoundNotFound { round_id: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    // ============ Input Validation Errors ============
    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// Invalid spell format
    InvalidSpellFormat,

    // ============ State Errors ============
    /// Invalid state transition
    InvalidStateTransition,

    /// State not found
    StateNotFound,
}

impl FundMeError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientValue { .. } => "E010_INSUFFICIENT_VALUE",
            Self::NotOwner { .. } => "E020_NOT_OWNER",
            Self::Unauthorized { .. } => "E021_UNAUTHORIZED",
            Self::AdminOnly => "E022_ADMIN_ONLY",
            Self::MissingSignature { .. } => "E023_MISSING_SIGNATURE",
            Self::TransferFailed { .. } => "E030_TRANSFER_FAILED",
            Self::ValueMismatch { .. } => "E031_VALUE_MISMATCH",
            Self::FunderIndexOutOfRange { .. } => "E040_INDEX_OUT_OF_RANGE",
            Self::OracleUnavailable => "E050_ORACLE_UNAVAILABLE",
            Self::OracleMalformed { .. } => "E051_ORACLE_MALFORMED",
            Self::RoundNotFound { .. } => "E052_ROUND_NOT_FOUND",
            Self::Overflow => "E060_OVERFLOW",
            Self::InvalidAddress { .. } => "E070_INVALID_ADDRESS",
            Self::InvalidSpellFormat => "E071_INVALID_SPELL",
            Self::InvalidStateTransition => "E080_INVALID_STATE",
            Self::StateNotFound => "E081_STATE_NOT_FOUND",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientValue { .. } => true, // Send more
            Self::OracleUnavailable => true,        // Retry later
            Self::TransferFailed { .. } => true,    // Owner must accept payouts
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            FundMeError::InsufficientValue { usd_value: 1, minimum: 2 },
            FundMeError::NotOwner { expected: [1u8; 32], actual: [2u8; 32] },
            FundMeError::Unauthorized { expected: [1u8; 32], actual: [2u8; 32] },
            FundMeError::AdminOnly,
            FundMeError::MissingSignature { signer: [1u8; 32] },
            FundMeError::TransferFailed { to: [1u8; 32], amount: 10 },
            FundMeError::ValueMismatch { expected: 1, actual: 2 },
            FundMeError::FunderIndexOutOfRange { index: 0, len: 0 },
            FundMeError::OracleUnavailable,
            FundMeError::OracleMalformed { answer: -1, decimals: 8 },
            FundMeError::RoundNotFound { round_id: 3 },
            FundMeError::Overflow,
            FundMeError::InvalidAddress { reason: "zero" },
            FundMeError::InvalidSpellFormat,
            FundMeError::InvalidStateTransition,
            FundMeError::StateNotFound,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(FundMeError::InsufficientValue { usd_value: 0, minimum: 1 }.is_recoverable());
        assert!(!FundMeError::NotOwner { expected: [0u8; 32], actual: [1u8; 32] }.is_recoverable());
    }
}
