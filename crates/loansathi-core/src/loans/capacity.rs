use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::time_value::{monthly_rate, principal_from_emi};
use crate::types::{round_currency, round_ratio, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::validation::{
    require_amount, require_annual_rate, require_positive_amount, require_tenure_years,
};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Share of other monthly expenses held back from the EMI budget.
const EXPENSE_BUFFER: Rate = dec!(0.10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Salaried,
    SelfEmployed,
}

impl EmploymentType {
    /// Fixed-obligation-to-income ceiling lenders apply.
    pub fn foir_limit(&self) -> Rate {
        match self {
            EmploymentType::Salaried => dec!(0.55),
            EmploymentType::SelfEmployed => dec!(0.45),
        }
    }
}

impl FromStr for EmploymentType {
    type Err = LoanSathiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "salaried" => Ok(EmploymentType::Salaried),
            "self_employed" => Ok(EmploymentType::SelfEmployed),
            other => Err(LoanSathiError::invalid(
                "employment_type",
                format!("unknown employment type '{other}' (expected salaried or self_employed)"),
            )),
        }
    }
}

/// Whether any new EMI fits within the FOIR ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    ZeroEligibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowingCapacityInput {
    pub monthly_income: Money,
    pub existing_emis: Money,
    pub other_expenses: Money,
    pub employment_type: EmploymentType,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowingCapacityOutput {
    pub eligibility: Eligibility,
    pub foir_limit: Rate,
    pub max_allowable_emi: Money,
    pub max_emi: Money,
    pub max_loan_amount: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub foir_used_percent: Decimal,
    pub remaining_income: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Largest loan the applicant's income supports under the FOIR ceiling.
///
/// When existing EMIs and the expense buffer use up the ceiling the result is
/// `ZeroEligibility` with zero amounts, not an error.
pub fn calculate_borrowing_capacity(
    input: &BorrowingCapacityInput,
) -> LoanSathiResult<ComputationOutput<BorrowingCapacityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive_amount("monthly_income", input.monthly_income)?;
    require_amount("existing_emis", input.existing_emis)?;
    require_amount("other_expenses", input.other_expenses)?;
    require_annual_rate("annual_rate_percent", input.annual_rate_percent)?;
    require_tenure_years("tenure_years", input.tenure_years)?;

    let income = input.monthly_income;
    let foir_limit = input.employment_type.foir_limit();
    let max_allowable_emi = income * foir_limit;
    let available_for_new_emi = max_allowable_emi - input.existing_emis;
    let net_available_emi =
        (available_for_new_emi - input.other_expenses * EXPENSE_BUFFER).max(Decimal::ZERO);

    let months = input.tenure_years * 12;

    let output = if net_available_emi > Decimal::ZERO {
        let loan = principal_from_emi(
            net_available_emi,
            monthly_rate(input.annual_rate_percent),
            months,
        )?;
        let total_payment = net_available_emi * Decimal::from(months);
        let foir_used = (input.existing_emis + net_available_emi) / income * dec!(100);

        BorrowingCapacityOutput {
            eligibility: Eligibility::Eligible,
            foir_limit,
            max_allowable_emi: round_currency(max_allowable_emi),
            max_emi: round_currency(net_available_emi),
            max_loan_amount: round_currency(loan),
            total_payment: round_currency(total_payment),
            total_interest: round_currency(total_payment - loan),
            foir_used_percent: round_ratio(foir_used),
            remaining_income: round_currency(
                income - input.existing_emis - net_available_emi - input.other_expenses,
            ),
        }
    } else {
        tracing::debug!(income = %income, existing = %input.existing_emis, "no EMI headroom under FOIR");
        warnings.push(
            "Existing EMIs and expenses use up the FOIR limit; no new loan is possible".into(),
        );
        BorrowingCapacityOutput {
            eligibility: Eligibility::ZeroEligibility,
            foir_limit,
            max_allowable_emi: round_currency(max_allowable_emi),
            max_emi: Decimal::ZERO,
            max_loan_amount: Decimal::ZERO,
            total_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            foir_used_percent: Decimal::ZERO,
            remaining_income: round_currency(
                income - input.existing_emis - input.other_expenses,
            ),
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Borrowing capacity (FOIR ceiling, inverted EMI formula)",
        &serde_json::json!({
            "employment_type": input.employment_type,
            "foir_limit": foir_limit.to_string(),
            "expense_buffer": EXPENSE_BUFFER.to_string(),
            "tenure_years": input.tenure_years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
