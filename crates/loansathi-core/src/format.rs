//! Display helpers for rupee amounts and tenures.
//!
//! The calculators return plain `Decimal`s; these are for presentation only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{round_currency, round_ratio, Money};

const ONE_LAKH: Decimal = dec!(100_000);
const ONE_CRORE: Decimal = dec!(10_000_000);

/// Whole-rupee amount with Indian digit grouping: `₹25,00,000`.
pub fn format_inr(amount: Money) -> String {
    let rounded = round_currency(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{}", group_indian(&rounded.abs().trunc().to_string()))
}

/// Abbreviated amount: `₹1.2Cr`, `₹25.0L`, or the fully grouped figure below a lakh.
pub fn format_inr_compact(amount: Money) -> String {
    if amount >= ONE_CRORE {
        format!("₹{:.1}Cr", round_ratio(amount / ONE_CRORE))
    } else if amount >= ONE_LAKH {
        format!("₹{:.1}L", round_ratio(amount / ONE_LAKH))
    } else {
        format_inr(amount)
    }
}

/// Tenure in months as `7 months`, `2 years` or `2y 3m`.
pub fn format_tenure(months: u32) -> String {
    let years = months / 12;
    let remaining = months % 12;
    if years == 0 {
        format!("{months} months")
    } else if remaining == 0 {
        format!("{years} years")
    } else {
        format!("{years}y {remaining}m")
    }
}

// Last three digits, then groups of two: 12345678 -> 1,23,45,678
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(dec!(2_500_000)), "₹25,00,000");
        assert_eq!(format_inr(dec!(12_345_678)), "₹1,23,45,678");
        assert_eq!(format_inr(dec!(999)), "₹999");
        assert_eq!(format_inr(dec!(1000)), "₹1,000");
        assert_eq!(format_inr(dec!(21695.58)), "₹21,696");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_inr(dec!(-150_000)), "-₹1,50,000");
    }

    #[test]
    fn test_compact_lakh_and_crore() {
        assert_eq!(format_inr_compact(dec!(2_500_000)), "₹25.0L");
        assert_eq!(format_inr_compact(dec!(12_000_000)), "₹1.2Cr");
        assert_eq!(format_inr_compact(dec!(50_000)), "₹50,000");
    }

    #[test]
    fn test_tenure_text() {
        assert_eq!(format_tenure(7), "7 months");
        assert_eq!(format_tenure(24), "2 years");
        assert_eq!(format_tenure(27), "2y 3m");
    }
}
