//! Month-by-month amortization of a fixed payment against a declining balance.
//!
//! A [`Schedule`] is a small, copyable description of a loan (balance, monthly
//! rate, payment, horizon, optional lump-sum prepayment). Calling
//! [`Schedule::iter`] produces a fresh lazy iterator each time, so callers can
//! take a prefix (the first five years for a chart) without walking the whole
//! term, and restart from period one whenever they like.
//!
//! Every schedule is bounded by [`MAX_PERIODS`]. A payment that does not cover
//! the month's interest stops the iterator at that period and is reported as
//! [`ScheduleOutcome::NonAmortizing`] instead of running up to the cap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::types::{round_currency, Money, Rate};
use crate::LoanSathiResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard cap on simulated months (50 years).
pub const MAX_PERIODS: u32 = 600;

/// A remaining balance below this is settled in the current period.
const SETTLEMENT_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How far a schedule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    /// At most this many periods (still capped at `MAX_PERIODS`).
    Periods(u32),
    /// Until the balance reaches zero or `MAX_PERIODS` elapses.
    UntilPayoff,
}

/// One-time prepayment applied after the regular payment of `period`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpSum {
    pub period: u32,
    pub amount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub payment: Money,
    pub horizon: Horizon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lump_sum: Option<LumpSum>,
}

/// A single month of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based month index.
    pub period: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    /// Lump sum applied this month (zero in all but at most one month).
    pub prepayment: Money,
    pub closing_balance: Money,
}

/// Why a schedule stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScheduleOutcome {
    PaidOff,
    /// Horizon (or the hard cap) reached with a balance still outstanding.
    HorizonReached,
    /// The payment at `period` did not exceed the interest charged.
    NonAmortizing {
        period: u32,
        payment: Money,
        interest: Money,
    },
}

/// Totals from walking a schedule to its end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub months: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_prepayment: Money,
    pub total_paid: Money,
    pub closing_balance: Money,
    pub lump_sum_applied: bool,
    pub outcome: ScheduleOutcome,
}

/// Principal and interest paid in one year of the loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearBreakdown {
    pub year: u32,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

impl Schedule {
    pub fn new(principal: Money, monthly_rate: Rate, payment: Money, horizon: Horizon) -> Self {
        Schedule {
            principal,
            monthly_rate,
            payment,
            horizon,
            lump_sum: None,
        }
    }

    pub fn with_lump_sum(mut self, period: u32, amount: Money) -> Self {
        self.lump_sum = Some(LumpSum { period, amount });
        self
    }

    /// Last period this schedule may reach.
    pub fn period_limit(&self) -> u32 {
        match self.horizon {
            Horizon::Periods(n) => n.min(MAX_PERIODS),
            Horizon::UntilPayoff => MAX_PERIODS,
        }
    }

    /// Start a new pass over the schedule from period one.
    pub fn iter(&self) -> ScheduleIter {
        ScheduleIter {
            schedule: *self,
            balance: self.principal,
            period: 0,
            outcome: None,
        }
    }

    /// Walk the full schedule and total it.
    pub fn summarize(&self) -> ScheduleSummary {
        let mut iter = self.iter();
        let mut summary = ScheduleSummary {
            months: 0,
            total_interest: Decimal::ZERO,
            total_principal: Decimal::ZERO,
            total_prepayment: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            closing_balance: self.principal,
            lump_sum_applied: false,
            outcome: ScheduleOutcome::PaidOff,
        };

        for entry in iter.by_ref() {
            summary.months = entry.period;
            summary.total_interest += entry.interest;
            summary.total_principal += entry.principal;
            summary.total_prepayment += entry.prepayment;
            summary.closing_balance = entry.closing_balance;
            if !entry.prepayment.is_zero() {
                summary.lump_sum_applied = true;
            }
        }

        summary.total_paid =
            summary.total_interest + summary.total_principal + summary.total_prepayment;
        if let Some(outcome) = iter.outcome() {
            summary.outcome = outcome;
        }
        summary
    }

    /// Like [`summarize`](Self::summarize), but a payment that cannot cover
    /// interest is an error.
    pub fn summarize_strict(&self) -> LoanSathiResult<ScheduleSummary> {
        let summary = self.summarize();
        if let ScheduleOutcome::NonAmortizing {
            period,
            payment,
            interest,
        } = summary.outcome
        {
            return Err(LoanSathiError::NonConvergent {
                context: "amortization schedule".into(),
                period,
                payment,
                interest,
            });
        }
        Ok(summary)
    }

    /// Yearly principal/interest totals for at most `max_years` years.
    ///
    /// Only the months needed are generated. Amounts are rounded to rupees.
    pub fn yearly_breakdown(&self, max_years: u32) -> Vec<YearBreakdown> {
        let mut years: Vec<YearBreakdown> = Vec::new();
        let months = (max_years as usize).saturating_mul(12);

        for entry in self.iter().take(months) {
            let year = (entry.period - 1) / 12 + 1;
            if years.last().map(|y| y.year) != Some(year) {
                years.push(YearBreakdown {
                    year,
                    principal: Decimal::ZERO,
                    interest: Decimal::ZERO,
                    closing_balance: Decimal::ZERO,
                });
            }
            if let Some(current) = years.last_mut() {
                current.principal += entry.principal;
                current.interest += entry.interest;
                current.closing_balance = entry.closing_balance;
            }
        }

        for y in years.iter_mut() {
            y.principal = round_currency(y.principal);
            y.interest = round_currency(y.interest);
            y.closing_balance = round_currency(y.closing_balance);
        }
        years
    }
}

// ---------------------------------------------------------------------------
// Iterator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: Schedule,
    balance: Money,
    period: u32,
    outcome: Option<ScheduleOutcome>,
}

impl ScheduleIter {
    /// Why the iterator stopped; `None` while it can still yield entries.
    pub fn outcome(&self) -> Option<ScheduleOutcome> {
        self.outcome
    }

    fn finish(&mut self, outcome: ScheduleOutcome) -> Option<ScheduleEntry> {
        self.outcome = Some(outcome);
        None
    }
}

impl Iterator for ScheduleIter {
    type Item = ScheduleEntry;

    fn next(&mut self) -> Option<ScheduleEntry> {
        if self.outcome.is_some() {
            return None;
        }
        if self.balance <= Decimal::ZERO {
            return self.finish(ScheduleOutcome::PaidOff);
        }
        if self.period >= self.schedule.period_limit() {
            if self.schedule.horizon == Horizon::UntilPayoff {
                tracing::warn!(
                    periods = self.period,
                    balance = %self.balance,
                    "period cap reached with balance outstanding"
                );
            }
            return self.finish(ScheduleOutcome::HorizonReached);
        }

        let period = self.period + 1;
        let opening = self.balance;
        let interest = opening * self.schedule.monthly_rate;
        let due = self.schedule.payment - interest;

        if due <= Decimal::ZERO {
            tracing::warn!(
                period,
                payment = %self.schedule.payment,
                interest = %interest,
                "payment does not cover interest; balance will not be paid off"
            );
            return self.finish(ScheduleOutcome::NonAmortizing {
                period,
                payment: self.schedule.payment,
                interest,
            });
        }

        let principal = if due + SETTLEMENT_EPSILON >= opening {
            opening
        } else {
            due
        };
        let mut closing = opening - principal;

        let mut prepayment = Decimal::ZERO;
        if let Some(lump) = self.schedule.lump_sum {
            if lump.period == period && closing > lump.amount {
                prepayment = lump.amount;
                closing -= lump.amount;
            }
        }

        self.period = period;
        self.balance = closing;

        Some(ScheduleEntry {
            period,
            opening_balance: opening,
            interest,
            principal,
            prepayment,
            closing_balance: closing,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
