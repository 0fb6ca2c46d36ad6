//! FundMe Contract - Charms App Entry Point
//!
//! Validates FundMe operations on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **Fund**: Contribution worth at least $50 at the referenced feed's price
//! - **Withdraw**: Owner takes the whole balance, ledger reset
//! - **CheaperWithdraw**: Same outcome as Withdraw, cheaper walk

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for FundMe operations.
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    fundme_contract::charms::validate_fundme_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
