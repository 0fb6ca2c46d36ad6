//! Mathematical Utilities for the FundMe Protocol
//!
//! Integer-only price conversion. Prices are normalized to 18 decimals
//! before they are multiplied with native amounts.

use crate::constants::{feed, funding, native};
use crate::errors::{FundMeError, FundMeResult};
use crate::types::{Amount, PriceReading};

/// Normalize a feed reading to 18 decimals
///
/// # Arguments
/// * `reading` - Raw answer plus the number of decimals it carries
///
/// # Returns
/// Price of one native unit in USD with 18 decimals
///
/// # Errors
/// `OracleMalformed` if the answer is not positive, the precision is
/// beyond `feed::MAX_DECIMALS`, or the normalized price does not fit.
pub fn normalize_price(reading: PriceReading) -> FundMeResult<u128> {
    let malformed = FundMeError::OracleMalformed {
        answer: reading.answer,
        decimals: reading.decimals,
    };

    if reading.answer <= 0 || reading.decimals > feed::MAX_DECIMALS {
        return Err(malformed);
    }

    let answer = reading.answer as u128;
    let target = funding::PRICE_DECIMALS;

    if reading.decimals <= target {
        let multiplier = 10u128.pow((target - reading.decimals) as u32);
        answer.checked_mul(multiplier).ok_or(malformed)
    } else {
        let divisor = 10u128.pow((reading.decimals - target) as u32);
        let price = answer / divisor;
        // A positive answer that rounds down to zero is unusable
        if price == 0 {
            return Err(malformed);
        }
        Ok(price)
    }
}

/// Convert a native amount into its USD value (18 decimals)
///
/// usd_value = amount * price / 1e18, rounded down
///
/// # Errors
/// `OracleMalformed` for an unusable reading, `Overflow` if the USD value
/// does not fit in a u128.
pub fn get_conversion_rate(amount: Amount, reading: PriceReading) -> FundMeResult<Amount> {
    let price = normalize_price(reading)?;
    mul_div_precision(amount, price)
}

/// `a * b / PRECISION` without an intermediate overflow
///
/// Both factors are split at `PRECISION`:
/// a * b / P = ah*bh*P + ah*bl + al*bh + al*bl/P
/// where every low part is below P, so `al * bl` always fits.
fn mul_div_precision(a: u128, b: u128) -> FundMeResult<u128> {
    let p = funding::PRECISION;
    let (ah, al) = (a / p, a % p);
    let (bh, bl) = (b / p, b % p);

    let high = ah
        .checked_mul(bh)
        .and_then(|v| v.checked_mul(p))
        .ok_or(FundMeError::Overflow)?;
    let cross_a = ah.checked_mul(bl).ok_or(FundMeError::Overflow)?;
    let cross_b = al.checked_mul(bh).ok_or(FundMeError::Overflow)?;
    let low = al * bl / p;

    high.checked_add(cross_a)
        .and_then(|v| v.checked_add(cross_b))
        .and_then(|v| v.checked_add(low))
        .ok_or(FundMeError::Overflow)
}

/// Native value of a coin amount in satoshis
pub fn sats_to_native(sats: u64) -> Amount {
    // u64::MAX * 1e10 stays far below u128::MAX
    sats as u128 * native::SAT
}

/// Check a USD value against a minimum
pub fn meets_minimum(usd_value: Amount, minimum: Amount) -> bool {
    usd_value >= minimum
}

/// Smallest native amount whose USD value reaches `minimum_usd`
///
/// Useful for callers that want to send exactly enough.
pub fn minimum_contribution(reading: PriceReading, minimum_usd: Amount) -> FundMeResult<Amount> {
    let price = normalize_price(reading)?;
    let scaled = minimum_usd
        .checked_mul(funding::PRECISION)
        .ok_or(FundMeError::Overflow)?;
    Ok(scaled.div_ceil(price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::native::ONE;

    const ETH_AT_2000: PriceReading = PriceReading { answer: 2_000_00000000, decimals: 8 };

    #[test]
    fn test_normalize_8_decimals() {
        assert_eq!(normalize_price(ETH_AT_2000).unwrap(), 2_000 * ONE);
    }

    #[test]
    fn test_normalize_18_decimals() {
        let reading = PriceReading::new(2_000 * ONE as i128, 18);
        assert_eq!(normalize_price(reading).unwrap(), 2_000 * ONE);
    }

    #[test]
    fn test_normalize_more_than_18_decimals() {
        let reading = PriceReading::new(2_000 * 10i128.pow(20), 20);
        assert_eq!(normalize_price(reading).unwrap(), 2_000 * ONE);
    }

    #[test]
    fn test_normalize_rejects_bad_answers() {
        assert!(matches!(
            normalize_price(PriceReading::new(0, 8)),
            Err(FundMeError::OracleMalformed { .. })
        ));
        assert!(matches!(
            normalize_price(PriceReading::new(-5, 8)),
            Err(FundMeError::OracleMalformed { .. })
        ));
        assert!(matches!(
            normalize_price(PriceReading::new(1, 37)),
            Err(FundMeError::OracleMalformed { .. })
        ));
        assert!(matches!(
            normalize_price(PriceReading::new(1, 30)),
            Err(FundMeError::OracleMalformed { .. })
        ));
    }

    #[test]
    fn test_conversion_one_eth() {
        let usd = get_conversion_rate(ONE, ETH_AT_2000).unwrap();
        assert_eq!(usd, 2_000 * ONE);
    }

    #[test]
    fn test_conversion_at_threshold() {
        // 0.025 ETH at $2,000 = $50.00
        let usd = get_conversion_rate(25_000_000_000_000_000, ETH_AT_2000).unwrap();
        assert_eq!(usd, 50 * ONE);
        assert!(meets_minimum(usd, funding::MINIMUM_USD));

        // 0.024995 ETH at $2,000 = $49.99
        let usd = get_conversion_rate(24_995_000_000_000_000, ETH_AT_2000).unwrap();
        assert_eq!(usd, 4_999 * ONE / 100);
        assert!(!meets_minimum(usd, funding::MINIMUM_USD));
    }

    #[test]
    fn test_conversion_large_amounts_exact() {
        // 1,000 ETH at $2,000 = $2,000,000
        let usd = get_conversion_rate(1_000 * ONE, ETH_AT_2000).unwrap();
        assert_eq!(usd, 2_000_000 * ONE);

        // 1.5 ETH at $2,000.5 keeps the fractional cents
        let reading = PriceReading::new(2_000_50000000, 8);
        let usd = get_conversion_rate(3 * ONE / 2, reading).unwrap();
        assert_eq!(usd, 3_000_750_000_000_000_000_000);
    }

    #[test]
    fn test_conversion_overflow() {
        assert_eq!(get_conversion_rate(u128::MAX, ETH_AT_2000), Err(FundMeError::Overflow));
    }

    #[test]
    fn test_sats_to_native() {
        assert_eq!(sats_to_native(100_000_000), ONE);
        assert_eq!(sats_to_native(0), 0);
    }

    #[test]
    fn test_minimum_contribution() {
        let amount = minimum_contribution(ETH_AT_2000, funding::MINIMUM_USD).unwrap();
        assert_eq!(amount, 25_000_000_000_000_000);

        let usd = get_conversion_rate(amount, ETH_AT_2000).unwrap();
        assert!(meets_minimum(usd, funding::MINIMUM_USD));
        let usd = get_conversion_rate(amount - 1, ETH_AT_2000).unwrap();
        assert!(!meets_minimum(usd, funding::MINIMUM_USD));
    }
}
