//! Protocol Constants
//!
//! All magic numbers and configuration values for the FundMe contracts.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (live price feed only)
//! - Default (no feature) - Development values (mock price feed allowed)
//!
//! ```toml
//! # For mainnet deployment:
//! fundme-common = { path = "...", features = ["mainnet"] }
//! ```

/// Native currency metadata
pub mod native {
    /// Decimal places of the native currency (wei-style)
    pub const DECIMALS: u8 = 18;
    /// One whole unit with decimals (1 coin = 10^18 base units)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
    /// Decimal places of on-chain coin amounts (satoshis)
    pub const COIN_DECIMALS: u8 = 8;
    /// Native base units per satoshi
    pub const SAT: u128 = 10_000_000_000;
}

/// Funding rules
pub mod funding {
    use super::native::ONE;

    /// Minimum contribution, in USD with 18 decimals ($50)
    pub const MINIMUM_USD: u128 = 50 * ONE;

    /// Fixed-point precision used for USD values (1e18)
    pub const PRECISION: u128 = ONE;

    /// Decimal places every price is normalized to before comparison
    pub const PRICE_DECIMALS: u8 = 18;
}

/// Mock price feed defaults (development networks)
pub mod feed {
    /// Decimal places reported by the mock aggregator
    pub const DECIMALS: u8 = 18;

    /// Initial answer of the mock aggregator ($2,000 with 18 decimals)
    pub const INITIAL_ANSWER: i128 = 2_000_000_000_000_000_000_000;

    /// Aggregator interface version
    pub const VERSION: u64 = 0;

    /// Human readable feed description
    pub const DESCRIPTION: &str = "v0.6/tests/MockV3Aggregator.sol";

    /// Largest precision the fund contract accepts from a feed
    pub const MAX_DECIMALS: u8 = 36;
}

/// Network selection
///
/// Values differ between mainnet and development builds.
pub mod network {
    /// Development builds are expected to run against the mock price feed
    #[cfg(feature = "mainnet")]
    pub const IS_DEVELOPMENT: bool = false;
    #[cfg(not(feature = "mainnet"))]
    pub const IS_DEVELOPMENT: bool = true;
}

/// Storage access cost model used to compare withdrawal strategies
pub mod cost {
    /// Cost units charged per storage read
    pub const STORAGE_READ: u64 = 2_100;

    /// Cost units charged per storage write
    pub const STORAGE_WRITE: u64 = 5_000;

    /// Cost units charged per working-copy (memory) read
    pub const MEMORY_READ: u64 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_is_fifty_dollars() {
        assert_eq!(funding::MINIMUM_USD / native::ONE, 50);
        assert_eq!(funding::MINIMUM_USD % native::ONE, 0);
    }

    #[test]
    fn test_sat_scale_matches_decimals() {
        assert_eq!(native::SAT, 10u128.pow((native::DECIMALS - native::COIN_DECIMALS) as u32));
    }

    #[test]
    fn test_default_network_is_development() {
        if !cfg!(feature = "mainnet") {
            assert!(network::IS_DEVELOPMENT);
        }
    }

    #[test]
    fn test_mock_answer_matches_decimals() {
        assert_eq!(feed::INITIAL_ANSWER, 2_000 * 10i128.pow(feed::DECIMALS as u32));
    }
}
