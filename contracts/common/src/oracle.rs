//! Price Feed Adapter
//!
//! The fund contract only ever asks one question of a price feed: what is
//! the current rate and how many decimals does it carry. Answers are
//! trusted as given; there is no caching, retrying or staleness check.

use crate::errors::{FundMeError, FundMeResult};
use crate::types::PriceReading;

/// Source of the native/USD conversion rate
pub trait PriceFeed {
    /// Current rate and precision
    fn latest_price(&self) -> FundMeResult<PriceReading>;
}

impl<T: PriceFeed + ?Sized> PriceFeed for &T {
    fn latest_price(&self) -> FundMeResult<PriceReading> {
        (**self).latest_price()
    }
}

/// A feed that is not reachable yields `OracleUnavailable`
impl<T: PriceFeed> PriceFeed for Option<T> {
    fn latest_price(&self) -> FundMeResult<PriceReading> {
        match self {
            Some(feed) => feed.latest_price(),
            None => Err(FundMeError::OracleUnavailable),
        }
    }
}

/// Feed with a constant answer, for tests and development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrice(pub PriceReading);

impl FixedPrice {
    pub fn new(answer: i128, decimals: u8) -> Self {
        Self(PriceReading::new(answer, decimals))
    }
}

impl PriceFeed for FixedPrice {
    fn latest_price(&self) -> FundMeResult<PriceReading> {
        Ok(self.0)
    }
}
