//! FundMe Common Library
//!
//! Shared types, constants, and utilities for the FundMe contracts.
//!
//! ## Contents
//!
//! - **Constants**: funding minimum, precision, mock feed defaults, network switches
//! - **Errors**: typed `FundMeError` with stable codes
//! - **Events**: indexable `FundMeEvent`s collected in an `EventLog`
//! - **Math**: integer-only price normalization and USD conversion
//! - **Access Control**: single-owner and operator guards
//! - **Oracle**: the `PriceFeed` capability consumed by the fund contract
//! - **Transfer**: the `NativeTransfer` capability used for payouts
//!
//! This crate is `no_std` compatible for WASM compilation when built
//! without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod validation;
pub mod access_control;
pub mod oracle;
pub mod transfer;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use access_control::*;
pub use oracle::*;
pub use transfer::*;
