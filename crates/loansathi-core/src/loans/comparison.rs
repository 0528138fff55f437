use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanSathiError;
use crate::loans::emi::compute_emi;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::validation::{require_amount, require_percent, require_positive_amount};
use crate::LoanSathiResult;

/// Share of the loan assumed to be prepaid when pricing prepayment charges.
const ASSUMED_PREPAYMENT_SHARE: Rate = dec!(0.20);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingFee {
    /// Percent of the loan amount.
    Percentage(Percent),
    Fixed(Money),
}

impl ProcessingFee {
    fn amount(&self, loan_amount: Money) -> Money {
        match self {
            ProcessingFee::Percentage(pct) => loan_amount * pct / dec!(100),
            ProcessingFee::Fixed(fee) => *fee,
        }
    }
}

/// One lender's offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOffer {
    pub lender: String,
    pub annual_rate_percent: Percent,
    pub processing_fee: ProcessingFee,
    /// Charge on prepaid principal, percent.
    pub prepayment_charge_percent: Percent,
    pub insurance: Money,
    pub legal_charges: Money,
    pub other_charges: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonInput {
    pub loan_amount: Money,
    pub tenure_years: u32,
    pub offers: Vec<LoanOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCost {
    pub rank: usize,
    pub lender: String,
    pub annual_rate_percent: Percent,
    pub emi: Money,
    pub total_amount: Money,
    pub total_interest: Money,
    pub processing_fee_amount: Money,
    pub total_upfront_costs: Money,
    pub prepayment_charges: Money,
    pub total_cost_of_loan: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparisonOutput {
    /// Cheapest first.
    pub ranked: Vec<OfferCost>,
    pub best_lender: String,
    /// Total cost of the most expensive offer minus the cheapest.
    pub savings_vs_worst: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rank lender offers by all-in cost: repayments, upfront charges and the
/// charge on an assumed 20% prepayment.
pub fn compare_loans(
    input: &LoanComparisonInput,
) -> LoanSathiResult<ComputationOutput<LoanComparisonOutput>> {
    let start = Instant::now();

    require_positive_amount("loan_amount", input.loan_amount)?;
    if input.offers.len() < 2 {
        return Err(LoanSathiError::invalid(
            "offers",
            "at least two offers are needed for a comparison",
        ));
    }

    let months = Decimal::from(input.tenure_years) * dec!(12);
    let mut costs: Vec<OfferCost> = Vec::with_capacity(input.offers.len());

    for (i, offer) in input.offers.iter().enumerate() {
        let field = |name: &str| format!("offers[{i}].{name}");
        require_percent(&field("prepayment_charge_percent"), offer.prepayment_charge_percent)?;
        require_amount(&field("insurance"), offer.insurance)?;
        require_amount(&field("legal_charges"), offer.legal_charges)?;
        require_amount(&field("other_charges"), offer.other_charges)?;
        match offer.processing_fee {
            ProcessingFee::Percentage(pct) => require_percent(&field("processing_fee"), pct)?,
            ProcessingFee::Fixed(fee) => require_amount(&field("processing_fee"), fee)?,
        }

        let emi = compute_emi(input.loan_amount, offer.annual_rate_percent, input.tenure_years)
            .map_err(|e| match e {
                LoanSathiError::InvalidInput { field: f, reason } => LoanSathiError::InvalidInput {
                    field: field(&f),
                    reason,
                },
                other => other,
            })?;

        let total_amount = emi * months;
        let processing = offer.processing_fee.amount(input.loan_amount);
        let upfront = processing + offer.insurance + offer.legal_charges + offer.other_charges;
        let prepayment_charges = input.loan_amount * ASSUMED_PREPAYMENT_SHARE
            * offer.prepayment_charge_percent
            / dec!(100);

        costs.push(OfferCost {
            rank: 0,
            lender: offer.lender.clone(),
            annual_rate_percent: offer.annual_rate_percent,
            emi: round_currency(emi),
            total_amount: round_currency(total_amount),
            total_interest: round_currency(total_amount - input.loan_amount),
            processing_fee_amount: round_currency(processing),
            total_upfront_costs: round_currency(upfront),
            prepayment_charges: round_currency(prepayment_charges),
            total_cost_of_loan: round_currency(total_amount + upfront + prepayment_charges),
        });
    }

    costs.sort_by(|a, b| a.total_cost_of_loan.cmp(&b.total_cost_of_loan));
    for (i, c) in costs.iter_mut().enumerate() {
        c.rank = i + 1;
    }

    let (best_lender, savings_vs_worst) = match (costs.first(), costs.last()) {
        (Some(best), Some(worst)) => (
            best.lender.clone(),
            worst.total_cost_of_loan - best.total_cost_of_loan,
        ),
        _ => (String::new(), Decimal::ZERO),
    };
    tracing::debug!(offers = costs.len(), best = %best_lender, "ranked loan offers");

    let output = LoanComparisonOutput {
        ranked: costs,
        best_lender,
        savings_vs_worst,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan comparison (total cost: repayments + upfront charges + prepayment charges)",
        &serde_json::json!({
            "loan_amount": input.loan_amount.to_string(),
            "tenure_years": input.tenure_years,
            "assumed_prepayment_share": ASSUMED_PREPAYMENT_SHARE.to_string(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn offer(lender: &str, rate: Decimal, fee: ProcessingFee, prepay: Decimal) -> LoanOffer {
        LoanOffer {
            lender: lender.into(),
            annual_rate_percent: rate,
            processing_fee: fee,
            prepayment_charge_percent: prepay,
            insurance: dec!(5000),
            legal_charges: dec!(15_000),
            other_charges: dec!(10_000),
        }
    }

    fn three_banks() -> LoanComparisonInput {
        LoanComparisonInput {
            loan_amount: dec!(2_500_000),
            tenure_years: 20,
            offers: vec![
                offer("Bank C", dec!(8.75), ProcessingFee::Fixed(dec!(3000)), dec!(0)),
                offer("Bank A", dec!(8.5), ProcessingFee::Percentage(dec!(0.35)), dec!(2)),
                offer("Bank B", dec!(8.65), ProcessingFee::Percentage(dec!(0.5)), dec!(1)),
            ],
        }
    }

    #[test]
    fn test_lowest_rate_wins_on_long_tenure() {
        let out = compare_loans(&three_banks()).unwrap().result;
        assert_eq!(out.best_lender, "Bank A");
        assert_eq!(out.ranked[0].rank, 1);
        assert_eq!(out.ranked[2].lender, "Bank C");
        assert!(out.savings_vs_worst > Decimal::ZERO);
    }

    #[test]
    fn test_charges_for_percentage_fee() {
        let out = compare_loans(&three_banks()).unwrap().result;
        let a = out.ranked.iter().find(|c| c.lender == "Bank A").unwrap();
        // 0.35% of 25L
        assert_eq!(a.processing_fee_amount, dec!(8750));
        assert_eq!(a.total_upfront_costs, dec!(38_750));
        // 2% on a 5L prepayment
        assert_eq!(a.prepayment_charges, dec!(10_000));
        assert_eq!(a.emi, dec!(21_696));
    }

    #[test]
    fn test_ranked_by_total_cost() {
        let out = compare_loans(&three_banks()).unwrap().result;
        for pair in out.ranked.windows(2) {
            assert!(pair[0].total_cost_of_loan <= pair[1].total_cost_of_loan);
        }
    }

    #[test]
    fn test_single_offer_rejected() {
        let mut input = three_banks();
        input.offers.truncate(1);
        assert!(compare_loans(&input).is_err());
    }

    #[test]
    fn test_invalid_offer_field_is_indexed() {
        let mut input = three_banks();
        input.offers[1].annual_rate_percent = dec!(-1);
        match compare_loans(&input).unwrap_err() {
            LoanSathiError::InvalidInput { field, .. } => {
                assert_eq!(field, "offers[1].annual_rate_percent")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_fee_percentages_are_invalid_input() {
        let mut input = three_banks();
        input.offers[0].processing_fee = ProcessingFee::Percentage(Decimal::MAX);
        match compare_loans(&input).unwrap_err() {
            LoanSathiError::InvalidInput { field, .. } => {
                assert_eq!(field, "offers[0].processing_fee")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut input = three_banks();
        input.offers[2].prepayment_charge_percent = dec!(1000);
        match compare_loans(&input).unwrap_err() {
            LoanSathiError::InvalidInput { field, .. } => {
                assert_eq!(field, "offers[2].prepayment_charge_percent")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_largest_loan_at_max_rate_and_tenure() {
        let mut input = three_banks();
        input.loan_amount = crate::validation::MAX_AMOUNT;
        input.tenure_years = 50;
        for offer in input.offers.iter_mut() {
            offer.annual_rate_percent = dec!(100);
            offer.processing_fee = ProcessingFee::Percentage(dec!(100));
            offer.prepayment_charge_percent = dec!(100);
        }
        let out = compare_loans(&input).unwrap().result;
        assert_eq!(out.ranked.len(), 3);
    }
}
