use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::loans::emi::compute_emi;
use crate::loans::schedule::{Horizon, Schedule, YearBreakdown};
use crate::time_value::monthly_rate;
use crate::types::{months_to_years, round_currency, with_metadata, ComputationOutput, Money, Percent};
use crate::validation::require_amount;
use crate::LoanSathiResult;

const BREAKDOWN_YEARS: u32 = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrepaymentStrategy {
    /// One payment of `amount` at the end of `year` (after that month's EMI).
    LumpSum { amount: Money, year: u32 },
    /// `amount` added to every EMI from the first month.
    MonthlyExtra { amount: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
    pub strategy: PrepaymentStrategy,
}

/// Payment totals for one side of the comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTotals {
    pub emi: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub tenure_months: u32,
    pub tenure_years: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub original: LoanTotals,
    pub with_prepayment: LoanTotals,
    pub interest_savings: Money,
    pub payment_savings: Money,
    pub tenure_reduction_months: u32,
    pub lump_sum_applied: bool,
    pub revised_yearly: Vec<YearBreakdown>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare the original loan with a lump-sum or monthly-extra prepayment plan.
///
/// The revised schedule keeps the original EMI (plus any monthly extra) and
/// never runs past the original tenure.
pub fn calculate_prepayment(
    input: &PrepaymentInput,
) -> LoanSathiResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let emi = compute_emi(input.principal, input.annual_rate_percent, input.tenure_years)?;
    let months = input.tenure_years * 12;
    let rate = monthly_rate(input.annual_rate_percent);

    let original_payment = emi * Decimal::from(months);
    let original_interest = original_payment - input.principal;

    let base = Schedule::new(input.principal, rate, emi, Horizon::Periods(months));
    let (schedule, new_emi) = match &input.strategy {
        PrepaymentStrategy::LumpSum { amount, year } => {
            require_amount("strategy.amount", *amount)?;
            if *year == 0 || *year >= input.tenure_years {
                return Err(LoanSathiError::invalid(
                    "strategy.year",
                    "prepayment year must be between 1 and tenure_years - 1",
                ));
            }
            (base.with_lump_sum(year * 12, *amount), emi)
        }
        PrepaymentStrategy::MonthlyExtra { amount } => {
            require_amount("strategy.amount", *amount)?;
            let boosted = emi + amount;
            (Schedule { payment: boosted, ..base }, boosted)
        }
    };

    let summary = schedule.summarize_strict()?;
    tracing::debug!(
        original_months = months,
        revised_months = summary.months,
        lump_sum_applied = summary.lump_sum_applied,
        "prepayment schedule complete"
    );

    if let PrepaymentStrategy::LumpSum { year, .. } = &input.strategy {
        if !summary.lump_sum_applied {
            let reason = if summary.months < year * 12 {
                format!("the loan is repaid before the end of year {year}")
            } else {
                format!("it is not smaller than the balance outstanding at the end of year {year}")
            };
            warnings.push(format!("Lump sum not applied: {reason}"));
        }
    }

    let interest_savings = original_interest - summary.total_interest;
    let payment_savings = original_payment - summary.total_paid;

    let output = PrepaymentOutput {
        original: LoanTotals {
            emi: round_currency(emi),
            total_payment: round_currency(original_payment),
            total_interest: round_currency(original_interest),
            tenure_months: months,
            tenure_years: Decimal::from(input.tenure_years),
        },
        with_prepayment: LoanTotals {
            emi: round_currency(new_emi),
            total_payment: round_currency(summary.total_paid),
            total_interest: round_currency(summary.total_interest),
            tenure_months: summary.months,
            tenure_years: months_to_years(summary.months),
        },
        interest_savings: round_currency(interest_savings),
        payment_savings: round_currency(payment_savings),
        tenure_reduction_months: months - summary.months,
        lump_sum_applied: summary.lump_sum_applied,
        revised_yearly: schedule.yearly_breakdown(BREAKDOWN_YEARS),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment benefit (original vs revised amortization, EMI held constant)",
        &serde_json::json!({
            "strategy": input.strategy,
            "annual_rate_percent": input.annual_rate_percent.to_string(),
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
