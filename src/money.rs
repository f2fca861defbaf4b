//! Fixed-point money helpers
//!
//! All balances and transfer amounts live in the NUMERIC(19,4) domain:
//! up to 15 integral digits and exactly 4 fractional digits. Arithmetic is
//! `rust_decimal::Decimal` only; float semantics are not permitted anywhere
//! on the money path.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Fractional digits carried by every balance and amount.
pub const SCALE: u32 = 4;

/// Smallest transferable amount (0.0001).
pub fn min_transfer() -> Decimal {
    Decimal::new(1, SCALE)
}

/// Upper bound of the (19,4) domain: 10^15.
fn max_magnitude() -> Decimal {
    Decimal::from(1_000_000_000_000_000u64)
}

/// Parse a strictly positive transfer amount from its wire string.
///
/// Rejects anything that is not a plain decimal, is non-positive, is below
/// the minimum transferable unit, carries more than [`SCALE`] fractional
/// digits, or falls outside the (19,4) range. Checks run in that order; no
/// rounding is performed, so the caller gets the exact value or an error.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Unparseable);
    }
    let d = Decimal::from_str(s).map_err(|_| AmountError::Unparseable)?;

    if d <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    if d < min_transfer() {
        return Err(AmountError::TooSmall);
    }
    if d.scale() > SCALE && d.normalize().scale() > SCALE {
        return Err(AmountError::TooPrecise);
    }
    if d >= max_magnitude() {
        return Err(AmountError::OutOfRange);
    }
    Ok(d)
}

/// Parse a non-negative balance (admin wallet creation path).
pub fn parse_balance(s: &str) -> Result<Decimal, AmountError> {
    let d = Decimal::from_str(s.trim()).map_err(|_| AmountError::Unparseable)?;
    if d < Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    if d.scale() > SCALE && d.normalize().scale() > SCALE {
        return Err(AmountError::TooPrecise);
    }
    if d >= max_magnitude() {
        return Err(AmountError::OutOfRange);
    }
    Ok(d)
}

/// Render a value with exactly [`SCALE`] fractional digits.
///
/// Every balance string that leaves the service goes through here, so
/// clients never observe float artifacts or a drifting number of digits.
pub fn format_amount(d: Decimal) -> String {
    format!("{:.prec$}", d, prec = SCALE as usize)
}

/// Why an amount string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    Unparseable,
    NotPositive,
    TooSmall,
    TooPrecise,
    OutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::from(100));
        assert_eq!(
            parse_amount("123.4567").unwrap(),
            Decimal::from_str("123.4567").unwrap()
        );
        assert_eq!(parse_amount("0.0001").unwrap(), min_transfer());
        assert_eq!(
            parse_amount(" 5.5 ").unwrap(),
            Decimal::from_str("5.5").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_amount("").unwrap_err(), AmountError::Unparseable);
        assert_eq!(parse_amount("abc").unwrap_err(), AmountError::Unparseable);
        assert_eq!(parse_amount("1.2.3").unwrap_err(), AmountError::Unparseable);
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert_eq!(parse_amount("0").unwrap_err(), AmountError::NotPositive);
        assert_eq!(parse_amount("-10").unwrap_err(), AmountError::NotPositive);
        assert_eq!(parse_amount("0.0000").unwrap_err(), AmountError::NotPositive);
    }

    #[test]
    fn test_parse_rejects_below_minimum() {
        // "0.00001" violates both the minimum and the 4-digit precision
        // rule; the too-small check runs first and wins. The reverse order
        // would leave TooSmall unreachable, since every positive value below
        // 0.0001 needs more than 4 fractional digits.
        assert_eq!(parse_amount("0.00001").unwrap_err(), AmountError::TooSmall);
        assert_eq!(parse_amount("0.00009999").unwrap_err(), AmountError::TooSmall);
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert_eq!(parse_amount("1.12345").unwrap_err(), AmountError::TooPrecise);
        // Trailing zeros beyond scale 4 are still the same value
        assert!(parse_amount("1.12340000").is_ok());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            parse_amount("1000000000000000").unwrap_err(),
            AmountError::OutOfRange
        );
        assert!(parse_amount("999999999999999.9999").is_ok());
    }

    #[test]
    fn test_parse_balance_allows_zero() {
        assert_eq!(parse_balance("0").unwrap(), Decimal::ZERO);
        assert_eq!(parse_balance("0.0000").unwrap(), Decimal::ZERO);
        assert_eq!(parse_balance("-1").unwrap_err(), AmountError::NotPositive);
    }

    #[test]
    fn test_format_fixed_four_digits() {
        assert_eq!(format_amount(Decimal::from(900)), "900.0000");
        assert_eq!(
            format_amount(Decimal::from_str("876.5433").unwrap()),
            "876.5433"
        );
        assert_eq!(format_amount(Decimal::from_str("0.1").unwrap()), "0.1000");
    }

    #[test]
    fn test_no_float_artifacts() {
        let a = Decimal::from_str("0.1").unwrap();
        let b = Decimal::from_str("0.2").unwrap();
        assert_eq!(format_amount(a + b), "0.3000");
    }
}
