use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::loans::schedule::{Horizon, Schedule, YearBreakdown};
use crate::time_value::{self, monthly_rate};
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent};
use crate::validation::{require_annual_rate, require_positive_amount, require_tenure_years};
use crate::LoanSathiResult;

/// Years shown in the yearly principal/interest breakdown.
const BREAKDOWN_YEARS: u32 = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan products with a typical rate and a maximum tenure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Home,
    Personal,
    Car,
    Education,
}

impl LoanType {
    pub fn default_rate(&self) -> Percent {
        match self {
            LoanType::Home => dec!(8.5),
            LoanType::Personal => dec!(12.0),
            LoanType::Car => dec!(9.5),
            LoanType::Education => dec!(10.0),
        }
    }

    pub fn max_tenure_years(&self) -> u32 {
        match self {
            LoanType::Home => 30,
            LoanType::Personal => 7,
            LoanType::Car => 7,
            LoanType::Education => 15,
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoanType::Home => "Home Loan",
            LoanType::Personal => "Personal Loan",
            LoanType::Car => "Car Loan",
            LoanType::Education => "Education Loan",
        };
        f.write_str(name)
    }
}

impl FromStr for LoanType {
    type Err = LoanSathiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(LoanType::Home),
            "personal" => Ok(LoanType::Personal),
            "car" => Ok(LoanType::Car),
            "education" => Ok(LoanType::Education),
            other => Err(LoanSathiError::invalid(
                "loan_type",
                format!("unknown loan type '{other}' (expected home, personal, car or education)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiInput {
    pub principal: Money,
    /// Annual rate in percent. Falls back to the loan type's rate when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rate_percent: Option<Percent>,
    pub tenure_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_type: Option<LoanType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiOutput {
    pub emi: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    pub yearly_breakdown: Vec<YearBreakdown>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validated EMI for a principal, annual percentage rate and tenure in years.
///
/// A zero rate gives P / n.
pub fn compute_emi(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_years: u32,
) -> LoanSathiResult<Money> {
    require_positive_amount("principal", principal)?;
    require_annual_rate("annual_rate_percent", annual_rate_percent)?;
    require_tenure_years("tenure_years", tenure_years)?;

    time_value::emi(
        principal,
        monthly_rate(annual_rate_percent),
        tenure_years * 12,
    )
}

/// EMI with totals and a yearly principal/interest split for the first ten years.
pub fn calculate_emi(input: &EmiInput) -> LoanSathiResult<ComputationOutput<EmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let rate = match (input.annual_rate_percent, input.loan_type) {
        (Some(rate), _) => rate,
        (None, Some(loan_type)) => loan_type.default_rate(),
        (None, None) => {
            return Err(LoanSathiError::invalid(
                "annual_rate_percent",
                "required when no loan_type is given",
            ))
        }
    };

    let mut tenure_years = input.tenure_years;
    if let Some(loan_type) = input.loan_type {
        let max = loan_type.max_tenure_years();
        if tenure_years > max {
            warnings.push(format!(
                "Tenure of {tenure_years} years exceeds the {max}-year maximum for a {loan_type}; using {max} years"
            ));
            tenure_years = max;
        }
    }

    let emi = compute_emi(input.principal, rate, tenure_years)?;
    let months = tenure_years * 12;
    tracing::debug!(principal = %input.principal, rate = %rate, months, emi = %emi, "computed EMI");

    let total_payment = emi * Decimal::from(months);
    let total_interest = total_payment - input.principal;

    let schedule = Schedule::new(
        input.principal,
        monthly_rate(rate),
        emi,
        Horizon::Periods(months),
    );
    let yearly_breakdown = schedule.yearly_breakdown(BREAKDOWN_YEARS);

    let output = EmiOutput {
        emi: round_currency(emi),
        total_payment: round_currency(total_payment),
        total_interest: round_currency(total_interest),
        principal: round_currency(input.principal),
        annual_rate_percent: rate,
        tenure_months: months,
        yearly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated Monthly Instalment (reducing balance, monthly compounding)",
        &serde_json::json!({
            "loan_type": input.loan_type,
            "annual_rate_percent": rate.to_string(),
            "tenure_years": tenure_years,
            "rounding": "nearest rupee",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
