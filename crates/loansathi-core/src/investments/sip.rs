//! Systematic investment plans: maturity of a monthly SIP (optionally stepped
//! up every year) and the SIP needed to reach a target corpus.
//!
//! Contributions are made at the start of each month. Step-up plans are valued
//! cohort by cohort: each month's contribution compounds for exactly the
//! months left until the valuation date, which keeps the result faithful to
//! when each raise takes effect. That is O(n²) in months, fine for ≤360.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::time_value::{annuity_due_payment, compound, fv_annuity_due, monthly_rate};
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::validation::{require_annual_rate, require_positive_amount};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAX_PERIOD_YEARS: u32 = 30;
/// Share of the investment assumed deductible for tax.
const TAX_SAVING_RATE: Rate = dec!(0.30);
/// Yearly ceiling on the tax saved.
const TAX_SAVING_CAP: Money = dec!(46_800);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SipMode {
    /// Invest `monthly_amount`, report the maturity value.
    Amount { monthly_amount: Money },
    /// Reach `target_amount`, report the SIP required.
    Goal { target_amount: Money },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepUpFrequency {
    #[default]
    None,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipInput {
    pub mode: SipMode,
    pub period_years: u32,
    pub expected_return_percent: Percent,
    #[serde(default)]
    pub step_up_percent: Percent,
    #[serde(default)]
    pub step_up_frequency: StepUpFrequency,
    #[serde(default)]
    pub inflation_percent: Percent,
    #[serde(default)]
    pub tax_saving: bool,
}

/// Position at the end of one year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipYear {
    pub year: u32,
    /// Cumulative amount invested.
    pub investment: Money,
    pub maturity_value: Money,
    /// Maturity value in today's money.
    pub real_value: Money,
    /// Monthly SIP paid during this year.
    pub sip_amount: Money,
    pub gains: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipOutput {
    /// First-year monthly SIP (the required SIP in goal mode).
    pub monthly_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_sip: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<Money>,
    pub total_investment: Money,
    pub maturity_amount: Money,
    pub total_gains: Money,
    pub real_value: Money,
    pub tax_savings: Money,
    pub yearly: Vec<SipYear>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Maturity of a level monthly SIP (annuity-due).
pub fn sip_maturity(
    monthly_amount: Money,
    annual_return_percent: Percent,
    years: u32,
) -> LoanSathiResult<Money> {
    fv_annuity_due(monthly_amount, monthly_rate(annual_return_percent), years * 12)
}

/// Level monthly SIP whose maturity equals `target`.
pub fn required_sip(
    target: Money,
    annual_return_percent: Percent,
    years: u32,
) -> LoanSathiResult<Money> {
    annuity_due_payment(target, monthly_rate(annual_return_percent), years * 12)
}

pub fn calculate_sip(input: &SipInput) -> LoanSathiResult<ComputationOutput<SipOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let rate = monthly_rate(input.expected_return_percent);
    let inflation = input.inflation_percent / dec!(100);
    let years = input.period_years;

    let output = match &input.mode {
        SipMode::Amount { monthly_amount } => {
            let yearly = match input.step_up_frequency {
                StepUpFrequency::None => level_series(*monthly_amount, rate, inflation, years)?,
                StepUpFrequency::Yearly => {
                    step_up_series(*monthly_amount, rate, input.step_up_percent, inflation, years)?
                }
            };
            let last = final_year(&yearly)?;
            let tax_savings = if input.tax_saving {
                (last.investment * TAX_SAVING_RATE).min(TAX_SAVING_CAP)
            } else {
                Decimal::ZERO
            };
            SipOutput {
                monthly_amount: round_currency(*monthly_amount),
                required_sip: None,
                target_amount: None,
                total_investment: last.investment,
                maturity_amount: last.maturity_value,
                total_gains: last.gains,
                real_value: last.real_value,
                tax_savings: round_currency(tax_savings),
                yearly,
            }
        }
        SipMode::Goal { target_amount } => {
            if input.step_up_frequency == StepUpFrequency::Yearly {
                warnings.push("Step-up is not applied when solving for a goal".into());
            }
            let sip = required_sip(*target_amount, input.expected_return_percent, years)?;
            let total_investment = sip * Decimal::from(years * 12);
            let yearly = level_series(sip, rate, inflation, years)?;
            let last = final_year(&yearly)?;
            let tax_savings = if input.tax_saving {
                (total_investment * TAX_SAVING_RATE).min(TAX_SAVING_CAP * Decimal::from(years))
            } else {
                Decimal::ZERO
            };
            SipOutput {
                monthly_amount: round_currency(sip),
                required_sip: Some(round_currency(sip)),
                target_amount: Some(*target_amount),
                total_investment: round_currency(total_investment),
                maturity_amount: round_currency(*target_amount),
                total_gains: round_currency(*target_amount - total_investment),
                real_value: last.real_value,
                tax_savings: round_currency(tax_savings),
                yearly,
            }
        }
    };
    tracing::debug!(years, maturity = %output.maturity_amount, "SIP projection complete");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP projection (annuity-due, monthly compounding, per-cohort step-up)",
        &serde_json::json!({
            "expected_return_percent": input.expected_return_percent.to_string(),
            "step_up_frequency": input.step_up_frequency,
            "step_up_percent": input.step_up_percent.to_string(),
            "inflation_percent": input.inflation_percent.to_string(),
            "period_years": years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate(input: &SipInput) -> LoanSathiResult<()> {
    match &input.mode {
        SipMode::Amount { monthly_amount } => {
            require_positive_amount("monthly_amount", *monthly_amount)?
        }
        SipMode::Goal { target_amount } => require_positive_amount("target_amount", *target_amount)?,
    }
    if input.period_years == 0 || input.period_years > MAX_PERIOD_YEARS {
        return Err(LoanSathiError::invalid(
            "period_years",
            format!("must be between 1 and {MAX_PERIOD_YEARS}"),
        ));
    }
    require_annual_rate("expected_return_percent", input.expected_return_percent)?;
    require_annual_rate("step_up_percent", input.step_up_percent)?;
    require_annual_rate("inflation_percent", input.inflation_percent)?;
    Ok(())
}

fn final_year(yearly: &[SipYear]) -> LoanSathiResult<SipYear> {
    yearly
        .last()
        .cloned()
        .ok_or_else(|| LoanSathiError::invalid("period_years", "must be at least 1"))
}

fn out_of_range(field: &str) -> LoanSathiError {
    LoanSathiError::invalid(field, "projection exceeds the representable range")
}

fn year_entry(
    year: u32,
    investment: Money,
    maturity: Money,
    sip: Money,
    inflation: Rate,
) -> LoanSathiResult<SipYear> {
    let real = maturity / compound(inflation, year)?;
    Ok(SipYear {
        year,
        investment: round_currency(investment),
        maturity_value: round_currency(maturity),
        real_value: round_currency(real),
        sip_amount: round_currency(sip),
        gains: round_currency(maturity - investment),
    })
}

/// Same SIP every month.
fn level_series(
    sip: Money,
    rate: Rate,
    inflation: Rate,
    years: u32,
) -> LoanSathiResult<Vec<SipYear>> {
    (1..=years)
        .map(|year| {
            let investment = sip * Decimal::from(year * 12);
            let maturity = fv_annuity_due(sip, rate, year * 12)?;
            year_entry(year, investment, maturity, sip, inflation)
        })
        .collect()
}

/// SIP raised by `step_up_percent` each year, valued per contribution cohort.
///
/// A projection that leaves the Decimal range is an `InvalidInput` on
/// `step_up_percent`.
fn step_up_series(
    first_sip: Money,
    rate: Rate,
    step_up_percent: Percent,
    inflation: Rate,
    years: u32,
) -> LoanSathiResult<Vec<SipYear>> {
    let step = Decimal::ONE + step_up_percent / dec!(100);

    // growth[k] = (1 + r)^k
    let horizon = (years * 12) as usize;
    let mut growth: Vec<Decimal> = Vec::with_capacity(horizon);
    let mut g = Decimal::ONE;
    for _ in 0..horizon {
        growth.push(g);
        g = g
            .checked_mul(Decimal::ONE + rate)
            .ok_or_else(|| out_of_range("expected_return_percent"))?;
    }

    let mut series = Vec::with_capacity(years as usize);
    let mut investment = Decimal::ZERO;
    let mut current_sip = first_sip;

    for year in 1..=years {
        investment = current_sip
            .checked_mul(dec!(12))
            .and_then(|paid| investment.checked_add(paid))
            .ok_or_else(|| out_of_range("step_up_percent"))?;

        // Nothing has stepped up yet in the first year
        let value = if year == 1 {
            fv_annuity_due(first_sip, rate, 12)?
        } else {
            cohort_value(first_sip, step, &growth, year)?
        };

        series.push(year_entry(year, investment, value, current_sip, inflation)?);
        if year < years {
            current_sip = current_sip
                .checked_mul(step)
                .ok_or_else(|| out_of_range("step_up_percent"))?;
        }
    }
    Ok(series)
}

/// Every monthly contribution made so far, compounded to the end of `year`.
fn cohort_value(
    first_sip: Money,
    step: Decimal,
    growth: &[Decimal],
    year: u32,
) -> LoanSathiResult<Money> {
    let mut value = Decimal::ZERO;
    let mut cohort_sip = first_sip;
    for invested_year in 1..=year {
        let future_months = ((year - invested_year) * 12) as usize;
        for month in 1..=12usize {
            value = cohort_sip
                .checked_mul(growth[future_months + 12 - month])
                .and_then(|grown| value.checked_add(grown))
                .ok_or_else(|| out_of_range("step_up_percent"))?;
        }
        if invested_year < year {
            cohort_sip = cohort_sip
                .checked_mul(step)
                .ok_or_else(|| out_of_range("step_up_percent"))?;
        }
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
