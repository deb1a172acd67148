//! Conversions between smallest-unit integer amounts and human-unit floats.

use bigdecimal::{BigDecimal, RoundingMode};
use ethers::types::U256;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

/// Smallest-unit amount as a human-unit float (e.g. wei to whole coins).
pub fn to_f64_units(amount: U256, decimals: u8) -> f64 {
    let digits = BigInt::parse_bytes(amount.to_string().as_bytes(), 10).unwrap_or_default();
    BigDecimal::new(digits, i64::from(decimals))
        .to_f64()
        .unwrap_or(0.0)
}

/// Human-unit float as a smallest-unit amount, truncating sub-unit dust
/// toward zero. Non-finite and non-positive inputs collapse to zero.
pub fn from_f64_units(amount: f64, decimals: u8) -> U256 {
    if !amount.is_finite() || amount <= 0.0 {
        return U256::zero();
    }
    let Some(value) = BigDecimal::from_f64(amount) else {
        return U256::zero();
    };
    let scaled = value * BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    let (digits, _) = scaled
        .with_scale_round(0, RoundingMode::Down)
        .into_bigint_and_exponent();
    U256::from_dec_str(&digits.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pow10(exp: u32) -> U256 {
        U256::from(10u64).pow(U256::from(exp))
    }

    #[test]
    fn one_whole_coin_to_f64() {
        assert_eq!(to_f64_units(pow10(18), 18), 1.0);
        assert_eq!(to_f64_units(pow10(6), 6), 1.0);
    }

    #[test]
    fn zero_amount_to_f64() {
        assert_eq!(to_f64_units(U256::zero(), 18), 0.0);
    }

    #[test]
    fn from_f64_scales_by_decimals() {
        assert_eq!(from_f64_units(1.5, 6), U256::from(1_500_000u64));
        assert_eq!(
            from_f64_units(2.25, 18),
            U256::from(2_250_000_000_000_000_000u128)
        );
    }

    #[test]
    fn from_f64_truncates_sub_unit_dust() {
        // 1.9 millionths of a 6-decimal token is 1 smallest unit, not 2.
        assert_eq!(from_f64_units(0.0000019, 6), U256::from(1u64));
    }

    #[test]
    fn from_f64_guards_invalid_inputs() {
        assert_eq!(from_f64_units(-1.0, 18), U256::zero());
        assert_eq!(from_f64_units(f64::NAN, 18), U256::zero());
        assert_eq!(from_f64_units(f64::INFINITY, 18), U256::zero());
    }

    #[test]
    fn round_trips_exact_values() {
        for decimals in [6u8, 18u8] {
            let raw = from_f64_units(3.75, decimals);
            assert_eq!(to_f64_units(raw, decimals), 3.75);
        }
    }
}
