//! Input checks shared by every calculator, plus parsing of amounts typed
//! into form fields ("25,00,000", "₹ 5000").

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::types::{Money, Percent};
use crate::LoanSathiResult;

const MAX_ANNUAL_RATE: Percent = dec!(100);
const MAX_PERCENT: Percent = dec!(100);
const MAX_TENURE_YEARS: u32 = 50;

/// Largest amount any calculator accepts: ₹10^15 (one crore crore).
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000);
/// Oldest age accepted for the insured, a spouse or a child.
pub const MAX_AGE: u32 = 100;

/// How to treat text that is blank or does not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsePolicy {
    /// Blank or garbled text reads as zero, like an empty form field.
    DefaultZero,
    /// Blank or garbled text is an `InvalidInput` error.
    Strict,
}

/// Parse a user-entered amount.
///
/// Strips the rupee sign, grouping commas and surrounding whitespace.
/// Negative amounts are rejected under either policy.
pub fn parse_amount(field: &str, text: &str, policy: ParsePolicy) -> LoanSathiResult<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '₹' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return match policy {
            ParsePolicy::DefaultZero => Ok(Decimal::ZERO),
            ParsePolicy::Strict => Err(LoanSathiError::invalid(field, "a value is required")),
        };
    }

    let value = match Decimal::from_str(&cleaned) {
        Ok(v) => v,
        Err(_) => match policy {
            ParsePolicy::DefaultZero => Decimal::ZERO,
            ParsePolicy::Strict => {
                return Err(LoanSathiError::invalid(
                    field,
                    format!("'{}' is not a number", text.trim()),
                ))
            }
        },
    };

    require_amount(field, value)?;
    Ok(value)
}

pub fn require_positive(field: &str, value: Decimal) -> LoanSathiResult<()> {
    if value <= Decimal::ZERO {
        return Err(LoanSathiError::invalid(field, "must be > 0"));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: Decimal) -> LoanSathiResult<()> {
    if value < Decimal::ZERO {
        return Err(LoanSathiError::invalid(field, "must be >= 0"));
    }
    Ok(())
}

/// Amount in rupees: 0 ≤ value ≤ `MAX_AMOUNT`.
pub fn require_amount(field: &str, value: Money) -> LoanSathiResult<()> {
    require_non_negative(field, value)?;
    if value > MAX_AMOUNT {
        return Err(LoanSathiError::invalid(field, "must be <= 10^15"));
    }
    Ok(())
}

/// Amount in rupees: 0 < value ≤ `MAX_AMOUNT`.
pub fn require_positive_amount(field: &str, value: Money) -> LoanSathiResult<()> {
    require_positive(field, value)?;
    require_amount(field, value)
}

/// Plain percentage: 0 ≤ value ≤ 100.
pub fn require_percent(field: &str, value: Percent) -> LoanSathiResult<()> {
    require_non_negative(field, value)?;
    if value > MAX_PERCENT {
        return Err(LoanSathiError::invalid(field, "must be <= 100%"));
    }
    Ok(())
}

pub fn require_age(field: &str, age: u32) -> LoanSathiResult<()> {
    if age > MAX_AGE {
        return Err(LoanSathiError::invalid(
            field,
            format!("must be <= {MAX_AGE} years"),
        ));
    }
    Ok(())
}

pub fn require_periods(field: &str, value: u32) -> LoanSathiResult<()> {
    if value == 0 {
        return Err(LoanSathiError::invalid(field, "must be at least 1"));
    }
    Ok(())
}

/// Loan or investment term in whole years: 1 ≤ years ≤ 50.
pub fn require_tenure_years(field: &str, years: u32) -> LoanSathiResult<()> {
    require_periods(field, years)?;
    if years > MAX_TENURE_YEARS {
        return Err(LoanSathiError::invalid(
            field,
            format!("must be <= {MAX_TENURE_YEARS} years"),
        ));
    }
    Ok(())
}

/// Annual rate in percent: 0 ≤ rate ≤ 100.
pub fn require_annual_rate(field: &str, value: Percent) -> LoanSathiResult<()> {
    require_non_negative(field, value)?;
    if value > MAX_ANNUAL_RATE {
        return Err(LoanSathiError::invalid(field, "must be <= 100% per annum"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_indian_grouping() {
        let v = parse_amount("loan_amount", "₹ 25,00,000", ParsePolicy::Strict).unwrap();
        assert_eq!(v, dec!(2_500_000));
    }

    #[test]
    fn test_parse_blank_defaults_to_zero() {
        let v = parse_amount("existing_emis", "   ", ParsePolicy::DefaultZero).unwrap();
        assert_eq!(v, Decimal::ZERO);
        let v = parse_amount("existing_emis", "abc", ParsePolicy::DefaultZero).unwrap();
        assert_eq!(v, Decimal::ZERO);
    }

    #[test]
    fn test_parse_strict_rejects_garbage() {
        let err = parse_amount("loan_amount", "12k", ParsePolicy::Strict).unwrap_err();
        match err {
            LoanSathiError::InvalidInput { field, .. } => assert_eq!(field, "loan_amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(parse_amount("rate", "-8.5", ParsePolicy::DefaultZero).is_err());
    }

    #[test]
    fn test_parse_rejects_amount_above_cap() {
        let err = parse_amount("loan_amount", "10,00,00,00,00,00,00,001", ParsePolicy::DefaultZero);
        assert!(err.is_err());
    }

    #[test]
    fn test_amount_bounds() {
        assert!(require_amount("income", Decimal::ZERO).is_ok());
        assert!(require_amount("income", MAX_AMOUNT).is_ok());
        assert!(require_amount("income", MAX_AMOUNT + Decimal::ONE).is_err());
        assert!(require_positive_amount("principal", Decimal::ZERO).is_err());
        assert!(require_positive_amount("principal", Decimal::MAX).is_err());
    }

    #[test]
    fn test_percent_and_age_bounds() {
        assert!(require_percent("step_up_percent", dec!(100)).is_ok());
        assert!(require_percent("step_up_percent", dec!(1000)).is_err());
        assert!(require_percent("step_up_percent", dec!(-5)).is_err());
        assert!(require_age("age", MAX_AGE).is_ok());
        assert!(require_age("retirement_age", 120).is_err());
    }

    #[test]
    fn test_tenure_bounds() {
        assert!(require_tenure_years("tenure_years", 30).is_ok());
        assert!(require_tenure_years("tenure_years", 0).is_err());
        assert!(require_tenure_years("tenure_years", 51).is_err());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(require_annual_rate("rate", Decimal::ZERO).is_ok());
        assert!(require_annual_rate("rate", dec!(48)).is_ok());
        assert!(require_annual_rate("rate", dec!(-0.1)).is_err());
        assert!(require_annual_rate("rate", dec!(120)).is_err());
    }
}
