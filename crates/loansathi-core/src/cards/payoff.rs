//! Credit-card payoff under minimum, chosen and aggressive payments.
//!
//! Each scenario is a fixed monthly payment run through the shared
//! amortization schedule until the balance clears. A payment at or below the
//! first month's interest never clears the card and is reported as
//! [`PayoffTime::Never`] without simulating further.

use std::str::FromStr;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::loans::schedule::{Horizon, Schedule, ScheduleOutcome, MAX_PERIODS};
use crate::time_value::monthly_rate;
use crate::types::{months_to_years, round_currency, with_metadata, ComputationOutput, Money, Percent};
use crate::validation::{
    require_amount, require_annual_rate, require_percent, require_positive,
    require_positive_amount,
};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Issuers never ask for less than this.
const MINIMUM_PAYMENT_FLOOR: Money = dec!(500);
/// Aggressive plan pays this share of the starting balance every month.
const AGGRESSIVE_SHARE: Decimal = dec!(0.10);
/// Monthly points kept per scenario for charting.
const CHART_MONTHS: usize = 60;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStrategy {
    Minimum,
    Custom,
    Aggressive,
}

impl FromStr for PaymentStrategy {
    type Err = LoanSathiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimum" => Ok(PaymentStrategy::Minimum),
            "custom" => Ok(PaymentStrategy::Custom),
            "aggressive" => Ok(PaymentStrategy::Aggressive),
            other => Err(LoanSathiError::invalid(
                "strategy",
                format!("unknown payment strategy '{other}' (expected minimum, custom or aggressive)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayoffInput {
    pub balance: Money,
    pub annual_rate_percent: Percent,
    /// Minimum due as a percent of the balance.
    pub minimum_payment_percent: Percent,
    pub custom_payment: Money,
    pub strategy: PaymentStrategy,
}

/// Time to clear the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoffTime {
    Months { months: u32 },
    /// Payment does not exceed the interest charged; the balance never falls.
    Never,
    /// Still owing after `MAX_PERIODS` months.
    BeyondHorizon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthPoint {
    pub month: u32,
    pub balance: Money,
    pub interest_paid: Money,
    pub payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardScenario {
    pub name: String,
    pub payment: Money,
    pub payoff: PayoffTime,
    pub years: Option<Decimal>,
    pub total_interest: Option<Money>,
    pub total_amount: Option<Money>,
    /// Interest saved relative to the minimum-payment scenario.
    pub interest_savings: Option<Money>,
    /// Months saved relative to the minimum-payment scenario.
    pub months_saved: Option<i64>,
    pub monthly: Vec<MonthPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayoffOutput {
    pub minimum_payment: Money,
    pub monthly_rate_percent: Percent,
    pub selected_strategy: PaymentStrategy,
    /// Minimum, selected, aggressive, in that order.
    pub scenarios: Vec<CardScenario>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Minimum due on a balance: the percentage, but never below ₹500.
pub fn minimum_payment(balance: Money, minimum_payment_percent: Percent) -> Money {
    (balance * minimum_payment_percent / dec!(100)).max(MINIMUM_PAYMENT_FLOOR)
}

pub fn calculate_card_payoff(
    input: &CardPayoffInput,
) -> LoanSathiResult<ComputationOutput<CardPayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive_amount("balance", input.balance)?;
    require_annual_rate("annual_rate_percent", input.annual_rate_percent)?;
    require_positive("minimum_payment_percent", input.minimum_payment_percent)?;
    require_percent("minimum_payment_percent", input.minimum_payment_percent)?;
    require_amount("custom_payment", input.custom_payment)?;

    let rate = monthly_rate(input.annual_rate_percent);
    let minimum = minimum_payment(input.balance, input.minimum_payment_percent);
    let aggressive = input.balance * AGGRESSIVE_SHARE;
    let selected = match input.strategy {
        PaymentStrategy::Minimum => minimum,
        PaymentStrategy::Custom => input.custom_payment.max(minimum),
        PaymentStrategy::Aggressive => aggressive,
    };

    let mut scenarios = vec![
        simulate("Minimum Payment", input.balance, rate, minimum),
        simulate("Your Payment", input.balance, rate, selected),
        simulate("Aggressive (10%)", input.balance, rate, aggressive),
    ];

    for s in &scenarios {
        match s.payoff {
            PayoffTime::Never => warnings.push(format!(
                "{}: payment of {} does not cover monthly interest; the debt will never be paid off",
                s.name,
                round_currency(s.payment)
            )),
            PayoffTime::BeyondHorizon => warnings.push(format!(
                "{}: balance still outstanding after {} months",
                s.name, MAX_PERIODS
            )),
            PayoffTime::Months { .. } => {}
        }
    }

    // Savings are only meaningful against a minimum plan that finishes
    if let (PayoffTime::Months { months: base_months }, Some(base_interest)) =
        (scenarios[0].payoff, scenarios[0].total_interest)
    {
        for s in scenarios.iter_mut().skip(1) {
            if let (PayoffTime::Months { months }, Some(interest)) = (s.payoff, s.total_interest) {
                s.interest_savings = Some(base_interest - interest);
                s.months_saved = Some(i64::from(base_months) - i64::from(months));
            }
        }
    }

    let output = CardPayoffOutput {
        minimum_payment: round_currency(minimum),
        monthly_rate_percent: rate * dec!(100),
        selected_strategy: input.strategy,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Credit card payoff (fixed monthly payment, monthly interest on outstanding balance)",
        &serde_json::json!({
            "minimum_payment_floor": MINIMUM_PAYMENT_FLOOR.to_string(),
            "aggressive_share_of_balance": AGGRESSIVE_SHARE.to_string(),
            "max_months": MAX_PERIODS,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn simulate(name: &str, balance: Money, rate: Decimal, payment: Money) -> CardScenario {
    let schedule = Schedule::new(balance, rate, payment, Horizon::UntilPayoff);
    let mut iter = schedule.iter();
    let mut monthly: Vec<MonthPoint> = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut months = 0u32;

    for entry in iter.by_ref() {
        total_interest += entry.interest;
        months = entry.period;
        if monthly.len() < CHART_MONTHS {
            monthly.push(MonthPoint {
                month: entry.period,
                balance: round_currency(entry.closing_balance),
                interest_paid: round_currency(total_interest),
                payment: round_currency(payment),
            });
        }
    }

    let payoff = match iter.outcome() {
        Some(ScheduleOutcome::NonAmortizing { .. }) => PayoffTime::Never,
        Some(ScheduleOutcome::HorizonReached) => PayoffTime::BeyondHorizon,
        _ => PayoffTime::Months { months },
    };
    tracing::debug!(scenario = name, payment = %payment, ?payoff, "card scenario simulated");

    let finite = matches!(payoff, PayoffTime::Months { .. });
    CardScenario {
        name: name.to_string(),
        payment: round_currency(payment),
        payoff,
        years: finite.then(|| months_to_years(months)),
        total_interest: finite.then(|| round_currency(total_interest)),
        total_amount: finite.then(|| round_currency(balance + total_interest)),
        interest_savings: None,
        months_saved: None,
        monthly: if finite { monthly } else { Vec::new() },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
