use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanSathiError;
use crate::types::{Money, Percent, Rate};
use crate::LoanSathiResult;

const MONTHS_PER_YEAR_TIMES_100: Decimal = dec!(1200);

fn out_of_range(field: &str) -> LoanSathiError {
    LoanSathiError::invalid(field, "result exceeds the representable range")
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Growth past the Decimal range is an `InvalidInput` on `rate`. Decay below
/// 1e-28 rounds to zero; callers dividing by the factor must check for that.
pub fn compound(rate: Rate, n: u32) -> LoanSathiResult<Decimal> {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| out_of_range("rate"))?;
    }
    Ok(result)
}

/// Annual percentage (8.5) to a decimal monthly rate (0.0070833…).
pub fn monthly_rate(annual_percent: Percent) -> Rate {
    annual_percent / MONTHS_PER_YEAR_TIMES_100
}

/// Equated monthly instalment: EMI = P·r / (1 − (1+r)^−n)
///
/// Algebraically the same as P·r·(1+r)^n / ((1+r)^n − 1) but never forms the
/// P·(1+r)^n intermediate. A zero principal or zero periods gives 0 and a zero
/// rate falls back to straight-line P / n.
pub fn emi(principal: Money, rate: Rate, months: u32) -> LoanSathiResult<Money> {
    if principal.is_zero() || months == 0 {
        return Ok(Decimal::ZERO);
    }
    let straight_line = principal / Decimal::from(months);
    if rate.is_zero() {
        return Ok(straight_line);
    }
    let factor = compound(rate, months)?;
    let paid_down = Decimal::ONE - Decimal::ONE / factor;
    if paid_down.is_zero() {
        return Ok(straight_line);
    }
    principal
        .checked_mul(rate / paid_down)
        .ok_or_else(|| out_of_range("principal"))
}

/// Loan amount a given EMI services: P = EMI·(1 − (1+r)^−n) / r
pub fn principal_from_emi(emi: Money, rate: Rate, months: u32) -> LoanSathiResult<Money> {
    if months == 0 {
        return Ok(Decimal::ZERO);
    }
    if rate.is_zero() {
        return emi
            .checked_mul(Decimal::from(months))
            .ok_or_else(|| out_of_range("emi"));
    }
    let factor = compound(rate, months)?;
    emi.checked_mul((Decimal::ONE - Decimal::ONE / factor) / rate)
        .ok_or_else(|| out_of_range("emi"))
}

/// Future value of an annuity-due: FV = pmt·(((1+r)^n − 1)/r)·(1+r)
pub fn fv_annuity_due(payment: Money, rate: Rate, months: u32) -> LoanSathiResult<Money> {
    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(months))
            .ok_or_else(|| out_of_range("payment"));
    }
    let factor = compound(rate, months)?;
    let unit = ((factor - Decimal::ONE) / rate)
        .checked_mul(Decimal::ONE + rate)
        .ok_or_else(|| out_of_range("rate"))?;
    payment
        .checked_mul(unit)
        .ok_or_else(|| out_of_range("payment"))
}

/// Level payment whose annuity-due future value equals `target`.
pub fn annuity_due_payment(target: Money, rate: Rate, months: u32) -> LoanSathiResult<Money> {
    if months == 0 {
        return Ok(Decimal::ZERO);
    }
    let unit = fv_annuity_due(Decimal::ONE, rate, months)?;
    if unit.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(target / unit)
}

/// Present value of a level annuity paid at the end of each of `n` periods.
///
/// Discounts period by period, so a negative rate (inflation above return)
/// grows each term instead of dividing by a factor that has decayed to zero.
pub fn pv_annuity(payment: Money, rate: Rate, n: u32) -> LoanSathiResult<Money> {
    let growth = Decimal::ONE + rate;
    if growth.is_zero() {
        return Err(LoanSathiError::DivisionByZero {
            context: "present value discount factor".into(),
        });
    }
    let mut discount = Decimal::ONE;
    let mut total = Decimal::ZERO;
    for _ in 0..n {
        discount = discount
            .checked_div(growth)
            .ok_or_else(|| out_of_range("rate"))?;
        let term = payment
            .checked_mul(discount)
            .ok_or_else(|| out_of_range("payment"))?;
        total = total
            .checked_add(term)
            .ok_or_else(|| out_of_range("payment"))?;
    }
    Ok(total)
}
