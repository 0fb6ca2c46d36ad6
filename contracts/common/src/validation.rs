//! Validation Helpers for the FundMe Protocol
//!
//! Reusable guard clauses shared by the fund and price feed contracts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fundme_common::validation::{check, require_nonzero_address};
//!
//! check!(usd_value >= minimum, FundMeError::InsufficientValue { usd_value, minimum });
//! require_nonzero_address(&owner, "owner is zero address")?;
//! ```

use crate::{
    errors::{FundMeError, FundMeResult},
    types::{Address, Amount},
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// # Examples
///
/// ```rust,ignore
/// check!(
///     usd_value >= minimum,
///     FundMeError::InsufficientValue { usd_value, minimum }
/// );
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

// ============ Common Validation Helpers ============

/// Require an address that is not all zeroes.
pub fn require_nonzero_address(address: &Address, reason: &'static str) -> FundMeResult<()> {
    check!(*address != [0u8; 32], FundMeError::InvalidAddress { reason });
    Ok(())
}

/// Sum amounts, failing on overflow.
pub fn checked_sum<'a, I>(amounts: I) -> FundMeResult<Amount>
where
    I: IntoIterator<Item = &'a Amount>,
{
    amounts
        .into_iter()
        .try_fold(0u128, |acc, x| acc.checked_add(*x).ok_or(FundMeError::Overflow))
}
