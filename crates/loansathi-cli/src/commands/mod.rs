pub mod cards;
pub mod insurance;
pub mod investments;
pub mod loans;

use rust_decimal::Decimal;

use loansathi_core::validation::{parse_amount, ParsePolicy};

/// Parse a required rupee amount flag such as `--principal 25,00,000`.
pub(crate) fn required_amount(
    flag: &str,
    value: Option<&str>,
) -> Result<Decimal, Box<dyn std::error::Error>> {
    let text = value.ok_or_else(|| format!("--{flag} is required (or provide --input)"))?;
    Ok(parse_amount(&field_name(flag), text, ParsePolicy::Strict)?)
}

/// Parse an optional rupee amount flag; absent or blank reads as zero.
pub(crate) fn optional_amount(
    flag: &str,
    value: Option<&str>,
) -> Result<Decimal, Box<dyn std::error::Error>> {
    match value {
        Some(text) => Ok(parse_amount(&field_name(flag), text, ParsePolicy::DefaultZero)?),
        None => Ok(Decimal::ZERO),
    }
}

fn field_name(flag: &str) -> String {
    flag.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_required_amount_accepts_grouped_rupees() {
        assert_eq!(
            required_amount("principal", Some("₹25,00,000")).unwrap(),
            dec!(2_500_000)
        );
    }

    #[test]
    fn test_required_amount_missing_names_flag() {
        let err = required_amount("monthly-income", None).unwrap_err();
        assert!(err.to_string().contains("--monthly-income"));
    }

    #[test]
    fn test_optional_amount_blank_is_zero() {
        assert_eq!(optional_amount("existing-emis", Some("")).unwrap(), Decimal::ZERO);
        assert_eq!(optional_amount("existing-emis", None).unwrap(), Decimal::ZERO);
        assert!(optional_amount("existing-emis", Some("-100")).is_err());
    }
}
