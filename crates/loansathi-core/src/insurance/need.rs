//! Life and health cover sizing using the human-life-value method.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::time_value::{compound, pv_annuity};
use crate::types::{round_currency, round_ratio, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::validation::{require_age, require_amount, require_annual_rate, require_positive_amount};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const EDUCATION_COST: Money = dec!(1_500_000);
const EDUCATION_AGE: u32 = 18;
const MARRIAGE_COST: Money = dec!(1_000_000);
const MARRIAGE_AGE: u32 = 25;
/// Share of the earner's income the family needs when the spouse has none.
const SPOUSE_REPLACEMENT_RATIO: Rate = dec!(0.70);

const HEALTH_COVER_PER_HEAD: Money = dec!(500_000);
const HEALTH_COVER_INCOME_SHARE: Rate = dec!(0.50);
const HEALTH_COVER_FLOOR: Money = dec!(1_000_000);

const LIFE_PREMIUM_RATE: Rate = dec!(0.008);
const HEALTH_PREMIUM_RATE: Rate = dec!(0.015);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceInput {
    pub age: u32,
    pub annual_income: Money,
    #[serde(default)]
    pub spouse_income: Money,
    pub spouse_age: Option<u32>,
    #[serde(default)]
    pub children_ages: Vec<u32>,
    #[serde(default)]
    pub current_savings: Money,
    #[serde(default)]
    pub outstanding_loans: Money,
    pub monthly_expenses: Money,
    pub inflation_percent: Percent,
    pub expected_return_percent: Percent,
    pub retirement_age: u32,
    #[serde(default)]
    pub existing_life_cover: Money,
    #[serde(default)]
    pub existing_health_cover: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceOutput {
    pub total_life_insurance_need: Money,
    pub additional_life_insurance_needed: Money,
    pub recommended_health_cover: Money,
    pub additional_health_insurance_needed: Money,
    pub life_insurance_premium: Money,
    pub health_insurance_premium: Money,
    pub total_annual_premium: Money,
    /// Premiums as a percentage of annual income, 1 dp.
    pub premium_affordability_percent: Percent,
    pub future_income_value: Money,
    pub immediate_needs: Money,
    pub children_costs: Money,
    pub spouse_income_replacement: Money,
    pub family_size: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Real return implied by a nominal return and inflation: (1+n)/(1+i) − 1.
pub fn real_return(nominal_percent: Percent, inflation_percent: Percent) -> Rate {
    (Decimal::ONE + nominal_percent / dec!(100)) / (Decimal::ONE + inflation_percent / dec!(100))
        - Decimal::ONE
}

/// Recommended family floater: the largest of a per-head amount, half the
/// income and an absolute floor.
pub fn recommended_health_cover(annual_income: Money, family_size: u32) -> Money {
    (HEALTH_COVER_PER_HEAD * Decimal::from(family_size))
        .max(annual_income * HEALTH_COVER_INCOME_SHARE)
        .max(HEALTH_COVER_FLOOR)
}

pub fn calculate_insurance_need(
    input: &InsuranceInput,
) -> LoanSathiResult<ComputationOutput<InsuranceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let inflation = input.inflation_percent / dec!(100);
    let working_years = input.retirement_age - input.age;
    let real_rate = real_return(input.expected_return_percent, input.inflation_percent);
    if real_rate < Decimal::ZERO {
        warnings.push("Inflation exceeds expected return; future income is discounted at a negative real rate".into());
    }

    let future_income_value =
        pv_annuity(input.annual_income, real_rate, working_years).map_err(|_| {
            LoanSathiError::invalid(
                "inflation_percent",
                format!(
                    "future income discounted at a real rate of {real_rate} over {working_years} years exceeds the representable range"
                ),
            )
        })?;
    let immediate_needs = input.outstanding_loans + input.monthly_expenses * dec!(12);
    let children_costs = input
        .children_ages
        .iter()
        .map(|&age| child_cost(age, inflation))
        .sum::<LoanSathiResult<Money>>()?;

    let spouse_income_replacement = match input.spouse_age {
        Some(spouse_age) if input.spouse_income.is_zero() => {
            let years = input.retirement_age.saturating_sub(spouse_age);
            input.annual_income * SPOUSE_REPLACEMENT_RATIO * Decimal::from(years)
        }
        _ => Decimal::ZERO,
    };

    let total_need = future_income_value + immediate_needs + children_costs
        + spouse_income_replacement
        - input.current_savings;
    let additional_life = (total_need - input.existing_life_cover).max(Decimal::ZERO);
    if total_need < Decimal::ZERO {
        warnings.push("Current savings exceed the assessed life cover need".into());
    }

    let family_size = 2 + input.children_ages.len() as u32;
    let health_cover = recommended_health_cover(input.annual_income, family_size);
    let additional_health = (health_cover - input.existing_health_cover).max(Decimal::ZERO);

    let life_premium = additional_life * LIFE_PREMIUM_RATE;
    let health_premium = health_cover * HEALTH_PREMIUM_RATE;
    let total_premium = life_premium + health_premium;
    let affordability = total_premium / input.annual_income * dec!(100);

    tracing::debug!(
        working_years,
        real_rate = %real_rate,
        total_need = %total_need,
        "insurance need assessed"
    );

    let output = InsuranceOutput {
        total_life_insurance_need: round_currency(total_need),
        additional_life_insurance_needed: round_currency(additional_life),
        recommended_health_cover: round_currency(health_cover),
        additional_health_insurance_needed: round_currency(additional_health),
        life_insurance_premium: round_currency(life_premium),
        health_insurance_premium: round_currency(health_premium),
        total_annual_premium: round_currency(total_premium),
        premium_affordability_percent: round_ratio(affordability),
        future_income_value: round_currency(future_income_value),
        immediate_needs: round_currency(immediate_needs),
        children_costs: round_currency(children_costs),
        spouse_income_replacement: round_currency(spouse_income_replacement),
        family_size,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Human life value (real-rate PV of income + liabilities + goals − savings)",
        &serde_json::json!({
            "inflation_percent": input.inflation_percent.to_string(),
            "expected_return_percent": input.expected_return_percent.to_string(),
            "education_cost": EDUCATION_COST.to_string(),
            "marriage_cost": MARRIAGE_COST.to_string(),
            "life_premium_rate": LIFE_PREMIUM_RATE.to_string(),
            "health_premium_rate": HEALTH_PREMIUM_RATE.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate(input: &InsuranceInput) -> LoanSathiResult<()> {
    require_positive_amount("annual_income", input.annual_income)?;
    require_amount("spouse_income", input.spouse_income)?;
    require_amount("current_savings", input.current_savings)?;
    require_amount("outstanding_loans", input.outstanding_loans)?;
    require_amount("monthly_expenses", input.monthly_expenses)?;
    require_amount("existing_life_cover", input.existing_life_cover)?;
    require_amount("existing_health_cover", input.existing_health_cover)?;
    require_annual_rate("inflation_percent", input.inflation_percent)?;
    require_annual_rate("expected_return_percent", input.expected_return_percent)?;
    require_age("age", input.age)?;
    require_age("retirement_age", input.retirement_age)?;
    if let Some(spouse_age) = input.spouse_age {
        require_age("spouse_age", spouse_age)?;
    }
    for (i, &child_age) in input.children_ages.iter().enumerate() {
        require_age(&format!("children_ages[{i}]"), child_age)?;
    }
    if input.retirement_age <= input.age {
        return Err(LoanSathiError::invalid(
            "retirement_age",
            "must be greater than current age",
        ));
    }
    Ok(())
}

/// Education inflated to age 18 plus marriage inflated to age 25 (only while
/// the child is under 25).
fn child_cost(age: u32, inflation: Rate) -> LoanSathiResult<Money> {
    let education = EDUCATION_COST * compound(inflation, EDUCATION_AGE.saturating_sub(age))?;
    let marriage = if age < MARRIAGE_AGE {
        MARRIAGE_COST * compound(inflation, MARRIAGE_AGE - age)?
    } else {
        Decimal::ZERO
    };
    Ok(education + marriage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
