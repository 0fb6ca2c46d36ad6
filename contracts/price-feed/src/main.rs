//! FundMe Mock Price Feed - Charms App Entry Point
//!
//! Validates price feed operations on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **UpdateAnswer**: Operator publishes a new native/USD answer
//! - **UpdateRoundData**: Operator overwrites a round
//! - **SetOperator**: Admin changes the operator
//!
//! The feed charm is read by the fund contract as a reference input,
//! so reading it never consumes it.

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for price feed operations.
///
/// # Arguments
/// * `app` - The price feed app definition
/// * `tx` - The transaction being validated
/// * `x` - Public inputs
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    fundme_price_feed::charms::validate_feed_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
