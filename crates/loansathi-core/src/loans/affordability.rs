//! Home affordability: the price band an income supports once statutory
//! charges (stamp duty, registration) and lender/legal fees are added.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::loans::capacity::Eligibility;
use crate::time_value::{monthly_rate, principal_from_emi};
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::validation::{
    require_amount, require_annual_rate, require_percent, require_positive_amount,
    require_tenure_years,
};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// FOIR ceiling lenders use for home loans.
const HOME_LOAN_FOIR: Rate = dec!(0.40);
const REGISTRATION_RATE: Rate = dec!(0.01);
const REGISTRATION_CAP: Money = dec!(30_000);
const LEGAL_RATE: Rate = dec!(0.005);
const PROCESSING_RATE: Rate = dec!(0.005);
const CONSERVATIVE_FACTOR: Decimal = dec!(0.8);
const AGGRESSIVE_FACTOR: Decimal = dec!(1.1);

/// Stamp duty by state, percent of property value.
const STAMP_DUTY_RATES: &[(&str, Decimal)] = &[
    ("maharashtra", dec!(5)),
    ("delhi", dec!(6)),
    ("karnataka", dec!(5.6)),
    ("gujarat", dec!(4.9)),
    ("tamilnadu", dec!(7)),
    ("telangana", dec!(5)),
    ("rajasthan", dec!(5)),
    ("westbengal", dec!(6.5)),
];

/// Largest down payment accepted; the price is the loan scaled by 100 / (100 − dp).
const MAX_DOWN_PAYMENT_PERCENT: Percent = dec!(95);

/// Applied to any state not in the table.
const DEFAULT_STAMP_DUTY: Percent = dec!(6);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub monthly_income: Money,
    pub existing_emis: Money,
    pub down_payment_percent: Percent,
    pub tenure_years: u32,
    pub annual_rate_percent: Percent,
    /// State key such as "maharashtra" or "other".
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub eligibility: Eligibility,
    pub max_emi: Money,
    pub max_loan_amount: Money,
    pub down_payment_amount: Money,
    pub max_home_price: Money,
    pub stamp_duty_percent: Percent,
    pub stamp_duty: Money,
    pub registration_fee: Money,
    pub legal_fees: Money,
    pub processing_fee: Money,
    pub total_additional_costs: Money,
    pub total_upfront_cost: Money,
    pub total_interest: Money,
    pub conservative_price: Money,
    pub aggressive_price: Money,
    pub remaining_income: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Stamp-duty percentage for a state key, and whether the key was recognised.
pub fn stamp_duty_rate(state: &str) -> (Percent, bool) {
    let key: String = state
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    STAMP_DUTY_RATES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rate)| (*rate, true))
        .unwrap_or((DEFAULT_STAMP_DUTY, key == "other"))
}

pub fn calculate_affordability(
    input: &AffordabilityInput,
) -> LoanSathiResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive_amount("monthly_income", input.monthly_income)?;
    require_amount("existing_emis", input.existing_emis)?;
    require_percent("down_payment_percent", input.down_payment_percent)?;
    if input.down_payment_percent > MAX_DOWN_PAYMENT_PERCENT {
        return Err(LoanSathiError::invalid(
            "down_payment_percent",
            format!("must be <= {MAX_DOWN_PAYMENT_PERCENT}"),
        ));
    }
    require_annual_rate("annual_rate_percent", input.annual_rate_percent)?;
    require_tenure_years("tenure_years", input.tenure_years)?;

    let (stamp_duty_percent, known_state) = stamp_duty_rate(&input.state);
    if !known_state {
        warnings.push(format!(
            "Unknown state '{}'; using the default stamp duty of {}%",
            input.state, DEFAULT_STAMP_DUTY
        ));
    }

    let max_emi = input.monthly_income * HOME_LOAN_FOIR - input.existing_emis;
    if max_emi <= Decimal::ZERO {
        tracing::debug!(income = %input.monthly_income, existing = %input.existing_emis, "no EMI headroom for a home loan");
        warnings.push(
            "Existing EMIs are too high; reduce them before applying for a home loan".into(),
        );
        let output = AffordabilityOutput {
            eligibility: Eligibility::ZeroEligibility,
            max_emi: Decimal::ZERO,
            max_loan_amount: Decimal::ZERO,
            down_payment_amount: Decimal::ZERO,
            max_home_price: Decimal::ZERO,
            stamp_duty_percent,
            stamp_duty: Decimal::ZERO,
            registration_fee: Decimal::ZERO,
            legal_fees: Decimal::ZERO,
            processing_fee: Decimal::ZERO,
            total_additional_costs: Decimal::ZERO,
            total_upfront_cost: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            conservative_price: Decimal::ZERO,
            aggressive_price: Decimal::ZERO,
            remaining_income: round_currency(input.monthly_income - input.existing_emis),
        };
        return Ok(finish(start, input, stamp_duty_percent, warnings, output));
    }

    let months = input.tenure_years * 12;
    let loan = principal_from_emi(max_emi, monthly_rate(input.annual_rate_percent), months)?;
    let dp = input.down_payment_percent;
    let down_payment = loan * dp / (dec!(100) - dp);
    let price = loan + down_payment;

    let stamp_duty = price * stamp_duty_percent / dec!(100);
    let registration_fee = (price * REGISTRATION_RATE).min(REGISTRATION_CAP);
    let legal_fees = price * LEGAL_RATE;
    let processing_fee = loan * PROCESSING_RATE;
    let additional = stamp_duty + registration_fee + legal_fees + processing_fee;

    let output = AffordabilityOutput {
        eligibility: Eligibility::Eligible,
        max_emi: round_currency(max_emi),
        max_loan_amount: round_currency(loan),
        down_payment_amount: round_currency(down_payment),
        max_home_price: round_currency(price),
        stamp_duty_percent,
        stamp_duty: round_currency(stamp_duty),
        registration_fee: round_currency(registration_fee),
        legal_fees: round_currency(legal_fees),
        processing_fee: round_currency(processing_fee),
        total_additional_costs: round_currency(additional),
        total_upfront_cost: round_currency(down_payment + additional),
        total_interest: round_currency(max_emi * Decimal::from(months) - loan),
        conservative_price: round_currency(price * CONSERVATIVE_FACTOR),
        aggressive_price: round_currency(price * AGGRESSIVE_FACTOR),
        remaining_income: round_currency(input.monthly_income - input.existing_emis - max_emi),
    };

    Ok(finish(start, input, stamp_duty_percent, warnings, output))
}

fn finish(
    start: Instant,
    input: &AffordabilityInput,
    stamp_duty_percent: Percent,
    warnings: Vec<String>,
    output: AffordabilityOutput,
) -> ComputationOutput<AffordabilityOutput> {
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Home affordability (40% FOIR, inverted EMI, statutory and lender charges)",
        &serde_json::json!({
            "state": input.state,
            "stamp_duty_percent": stamp_duty_percent.to_string(),
            "registration": "1% capped at 30,000",
            "legal_percent_of_price": "0.5",
            "processing_percent_of_loan": "0.5",
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> AffordabilityInput {
        AffordabilityInput {
            monthly_income: dec!(100_000),
            existing_emis: dec!(15_000),
            down_payment_percent: dec!(20),
            tenure_years: 20,
            annual_rate_percent: dec!(8.5),
            state: "maharashtra".into(),
        }
    }

    #[test]
    fn test_affordability_breakdown() {
        let out = calculate_affordability(&sample()).unwrap().result;
        assert_eq!(out.eligibility, Eligibility::Eligible);
        // 40% of 1L minus 15k
        assert_eq!(out.max_emi, dec!(25_000));
        // Down payment is 20% of the price, i.e. a quarter of the loan
        let ratio = out.down_payment_amount / out.max_home_price;
        assert!((ratio - dec!(0.2)).abs() < dec!(0.0001));
        assert_eq!(out.stamp_duty_percent, dec!(5));
        // 1% of a ~36L price is above the 30k registration cap
        assert_eq!(out.registration_fee, dec!(30_000));
        assert!(out.conservative_price < out.max_home_price);
        assert!(out.aggressive_price > out.max_home_price);
        assert_eq!(out.remaining_income, dec!(60_000));
    }

    #[test]
    fn test_upfront_cost_is_down_payment_plus_charges() {
        let out = calculate_affordability(&sample()).unwrap().result;
        let sum = out.down_payment_amount
            + out.stamp_duty
            + out.registration_fee
            + out.legal_fees
            + out.processing_fee;
        assert!((out.total_upfront_cost - sum).abs() <= dec!(3));
    }

    #[test]
    fn test_unknown_state_uses_default_rate() {
        let mut input = sample();
        input.state = "atlantis".into();
        let out = calculate_affordability(&input).unwrap();
        assert_eq!(out.result.stamp_duty_percent, dec!(6));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_other_state_is_recognised() {
        assert_eq!(stamp_duty_rate("other"), (dec!(6), true));
        assert_eq!(stamp_duty_rate("West Bengal"), (dec!(6.5), true));
    }

    #[test]
    fn test_high_existing_emis_zero_eligibility() {
        let mut input = sample();
        input.existing_emis = dec!(45_000);
        let out = calculate_affordability(&input).unwrap();
        assert_eq!(out.result.eligibility, Eligibility::ZeroEligibility);
        assert_eq!(out.result.max_home_price, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_full_down_payment_rejected() {
        let mut input = sample();
        input.down_payment_percent = dec!(100);
        assert!(calculate_affordability(&input).is_err());
    }

    #[test]
    fn test_down_payment_just_below_full_rejected() {
        // 99.999…% would scale the loan by ~1e28 and overflow the price.
        let mut input = sample();
        input.down_payment_percent = dec!(99.99999999999999999999);
        match calculate_affordability(&input) {
            Err(LoanSathiError::InvalidInput { field, .. }) => {
                assert_eq!(field, "down_payment_percent")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_largest_inputs_stay_in_range() {
        let input = AffordabilityInput {
            monthly_income: crate::validation::MAX_AMOUNT,
            existing_emis: Decimal::ZERO,
            down_payment_percent: MAX_DOWN_PAYMENT_PERCENT,
            tenure_years: 50,
            annual_rate_percent: Decimal::ZERO,
            state: "tamilnadu".into(),
        };
        let out = calculate_affordability(&input).unwrap().result;
        // Zero rate: loan = 40% of income × 600 months, price = 20 × loan
        assert_eq!(out.max_loan_amount, dec!(240_000_000_000_000_000));
        assert_eq!(out.max_home_price, dec!(4_800_000_000_000_000_000));
    }
}
