use loansathi_core::loans::schedule::{Horizon, Schedule, ScheduleOutcome};
use loansathi_core::loans::{affordability, capacity, comparison, emi, prepayment};
use loansathi_core::time_value::monthly_rate;
use loansathi_core::LoanSathiError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// EMI
// ===========================================================================

#[test]
fn test_home_loan_end_to_end() {
    let input = emi::EmiInput {
        principal: dec!(2_500_000),
        annual_rate_percent: Some(dec!(8.5)),
        tenure_years: 20,
        loan_type: None,
    };
    let out = emi::calculate_emi(&input).unwrap();
    let r = &out.result;

    assert_eq!(r.emi, dec!(21_696));
    assert_eq!(r.tenure_months, 240);
    // 21,695.58 × 240 − 25L
    assert!((r.total_interest - dec!(2_706_939)).abs() <= dec!(1));
    assert_eq!(r.yearly_breakdown.len(), 10);
    assert!(out.methodology.contains("Equated Monthly Instalment"));
}

#[test]
fn test_total_payment_never_below_principal() {
    for (p, rate, years) in [
        (dec!(100_000), dec!(0.5), 1u32),
        (dec!(2_500_000), dec!(8.5), 20),
        (dec!(750_000), dec!(24), 5),
        (dec!(10_000_000), dec!(11.25), 30),
    ] {
        let e = emi::compute_emi(p, rate, years).unwrap();
        assert!(e * Decimal::from(years * 12) >= p, "p={p} rate={rate}");
    }
}

#[test]
fn test_zero_rate_is_straight_line() {
    let e = emi::compute_emi(dec!(120_000), Decimal::ZERO, 1).unwrap();
    assert_eq!(e, dec!(10_000));
}

#[test]
fn test_loan_type_preset_and_tenure_clamp() {
    let input = emi::EmiInput {
        principal: dec!(500_000),
        annual_rate_percent: None,
        tenure_years: 10,
        loan_type: Some("personal".parse().unwrap()),
    };
    let out = emi::calculate_emi(&input).unwrap();
    assert_eq!(out.result.annual_rate_percent, dec!(12.0));
    assert_eq!(out.result.tenure_months, 84);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_emi_rejects_missing_rate() {
    let input = emi::EmiInput {
        principal: dec!(500_000),
        annual_rate_percent: None,
        tenure_years: 5,
        loan_type: None,
    };
    match emi::calculate_emi(&input) {
        Err(LoanSathiError::InvalidInput { field, .. }) => assert_eq!(field, "annual_rate_percent"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_schedule_balances_chain_and_settle() {
    let r = monthly_rate(dec!(8.5));
    let payment = emi::compute_emi(dec!(2_500_000), dec!(8.5), 20).unwrap();
    let schedule = Schedule::new(dec!(2_500_000), r, payment, Horizon::Periods(240));

    let mut iter = schedule.iter();
    let mut previous_close = dec!(2_500_000);
    let mut last_close = Decimal::ONE;
    for entry in iter.by_ref() {
        assert_eq!(entry.opening_balance, previous_close);
        assert_eq!(
            entry.closing_balance,
            entry.opening_balance - entry.principal - entry.prepayment
        );
        previous_close = entry.closing_balance;
        last_close = entry.closing_balance;
    }
    assert_eq!(iter.outcome(), Some(ScheduleOutcome::PaidOff));
    assert!(last_close.abs() < dec!(0.01));
}

#[test]
fn test_schedule_flags_non_amortizing_payment() {
    let schedule = Schedule::new(dec!(100_000), dec!(0.02), dec!(1_500), Horizon::UntilPayoff);
    let summary = schedule.summarize();
    assert!(matches!(summary.outcome, ScheduleOutcome::NonAmortizing { period: 1, .. }));
    assert!(schedule.summarize_strict().is_err());
}

// ===========================================================================
// Prepayment
// ===========================================================================

#[test]
fn test_prepayment_never_lengthens_loan() {
    let strategies = [
        prepayment::PrepaymentStrategy::LumpSum {
            amount: dec!(500_000),
            year: 5,
        },
        prepayment::PrepaymentStrategy::LumpSum {
            amount: dec!(100_000),
            year: 19,
        },
        prepayment::PrepaymentStrategy::MonthlyExtra { amount: dec!(5_000) },
        prepayment::PrepaymentStrategy::MonthlyExtra { amount: dec!(1) },
    ];
    for strategy in strategies {
        let input = prepayment::PrepaymentInput {
            principal: dec!(2_500_000),
            annual_rate_percent: dec!(8.5),
            tenure_years: 20,
            strategy: strategy.clone(),
        };
        let out = prepayment::calculate_prepayment(&input).unwrap().result;
        assert!(
            out.with_prepayment.tenure_months <= out.original.tenure_months,
            "{strategy:?}"
        );
        assert!(out.interest_savings >= Decimal::ZERO, "{strategy:?}");
    }
}

// ===========================================================================
// Borrowing capacity
// ===========================================================================

#[test]
fn test_salaried_capacity_end_to_end() {
    let input = capacity::BorrowingCapacityInput {
        monthly_income: dec!(100_000),
        existing_emis: Decimal::ZERO,
        other_expenses: dec!(30_000),
        employment_type: capacity::EmploymentType::Salaried,
        annual_rate_percent: dec!(8.5),
        tenure_years: 20,
    };
    let r = capacity::calculate_borrowing_capacity(&input).unwrap().result;
    assert_eq!(r.eligibility, capacity::Eligibility::Eligible);
    assert_eq!(r.max_allowable_emi, dec!(55_000));
    assert_eq!(r.max_emi, dec!(52_000));
}

#[test]
fn test_self_employed_lower_ceiling() {
    let input = capacity::BorrowingCapacityInput {
        monthly_income: dec!(100_000),
        existing_emis: dec!(50_000),
        other_expenses: dec!(10_000),
        employment_type: "self-employed".parse().unwrap(),
        annual_rate_percent: dec!(9),
        tenure_years: 15,
    };
    let r = capacity::calculate_borrowing_capacity(&input).unwrap().result;
    // 45,000 − 50,000 − 1,000 < 0
    assert_eq!(r.eligibility, capacity::Eligibility::ZeroEligibility);
    assert_eq!(r.max_loan_amount, Decimal::ZERO);
}

// ===========================================================================
// Affordability
// ===========================================================================

fn affordability_input(state: &str) -> affordability::AffordabilityInput {
    affordability::AffordabilityInput {
        monthly_income: dec!(150_000),
        existing_emis: dec!(10_000),
        down_payment_percent: dec!(20),
        tenure_years: 20,
        annual_rate_percent: dec!(8.5),
        state: state.to_string(),
    }
}

#[test]
fn test_affordability_statutory_charges() {
    let r = affordability::calculate_affordability(&affordability_input("maharashtra"))
        .unwrap()
        .result;
    assert_eq!(r.max_emi, dec!(50_000));
    assert_eq!(r.stamp_duty_percent, dec!(5));
    assert_eq!(r.registration_fee, dec!(30_000));
    assert!(r.conservative_price < r.max_home_price);
    assert!(r.aggressive_price > r.max_home_price);
    let parts = r.stamp_duty + r.registration_fee + r.legal_fees + r.processing_fee;
    assert!((r.total_additional_costs - parts).abs() <= dec!(2));
}

#[test]
fn test_unknown_state_uses_default_duty() {
    let out = affordability::calculate_affordability(&affordability_input("Atlantis")).unwrap();
    assert_eq!(out.result.stamp_duty_percent, dec!(6));
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Loan comparison
// ===========================================================================

fn offer(lender: &str, rate: Decimal, fee: comparison::ProcessingFee) -> comparison::LoanOffer {
    comparison::LoanOffer {
        lender: lender.to_string(),
        annual_rate_percent: rate,
        processing_fee: fee,
        prepayment_charge_percent: Decimal::ZERO,
        insurance: Decimal::ZERO,
        legal_charges: Decimal::ZERO,
        other_charges: Decimal::ZERO,
    }
}

#[test]
fn test_comparison_ranks_cheapest_first() {
    let input = comparison::LoanComparisonInput {
        loan_amount: dec!(3_000_000),
        tenure_years: 20,
        offers: vec![
            offer("Bank A", dec!(8.75), comparison::ProcessingFee::Percentage(dec!(0.5))),
            offer("Bank B", dec!(8.40), comparison::ProcessingFee::Fixed(dec!(25_000))),
            offer("Bank C", dec!(9.10), comparison::ProcessingFee::Fixed(Decimal::ZERO)),
        ],
    };
    let r = comparison::compare_loans(&input).unwrap().result;
    let order: Vec<&str> = r.ranked.iter().map(|o| o.lender.as_str()).collect();
    assert_eq!(order, vec!["Bank B", "Bank A", "Bank C"]);
    assert_eq!(r.best_lender, "Bank B");
    assert_eq!(
        r.savings_vs_worst,
        r.ranked[2].total_cost_of_loan - r.ranked[0].total_cost_of_loan
    );
}

// ===========================================================================
// Boundary grid: extreme accepted inputs give a result or InvalidInput
// ===========================================================================

const AMOUNTS: [Decimal; 3] = [dec!(1), dec!(10_000_000_000), dec!(1_000_000_000_000_000)];
const RATES: [Decimal; 4] = [Decimal::ZERO, dec!(0.01), dec!(48), dec!(100)];
const TENURES: [u32; 3] = [1, 2, 50];

fn assert_ok_or_invalid<T: std::fmt::Debug>(label: &str, result: Result<T, LoanSathiError>) {
    match result {
        Ok(_) | Err(LoanSathiError::InvalidInput { .. }) => {}
        Err(other) => panic!("{label}: expected a result or InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_emi_grid() {
    for p in AMOUNTS {
        for rate in RATES {
            for years in TENURES {
                let label = format!("emi p={p} rate={rate} years={years}");
                assert_ok_or_invalid(&label, emi::compute_emi(p, rate, years));
                let input = emi::EmiInput {
                    principal: p,
                    annual_rate_percent: Some(rate),
                    tenure_years: years,
                    loan_type: None,
                };
                assert_ok_or_invalid(&label, emi::calculate_emi(&input));
            }
        }
    }
}

#[test]
fn test_emi_outside_limits_is_invalid_input() {
    for (p, rate, years) in [
        (Decimal::MAX, dec!(8.5), 20),
        (dec!(1_000_000_000_000_001), dec!(8.5), 20),
        (dec!(100_000), dec!(100.01), 20),
        (dec!(100_000), dec!(8.5), 51),
    ] {
        assert!(
            matches!(
                emi::compute_emi(p, rate, years),
                Err(LoanSathiError::InvalidInput { .. })
            ),
            "p={p} rate={rate} years={years}"
        );
    }
}

#[test]
fn test_prepayment_grid() {
    for p in AMOUNTS {
        for rate in RATES {
            for years in TENURES {
                let mut strategies = vec![
                    prepayment::PrepaymentStrategy::MonthlyExtra { amount: Decimal::ZERO },
                    prepayment::PrepaymentStrategy::MonthlyExtra { amount: p },
                ];
                if years > 1 {
                    strategies.push(prepayment::PrepaymentStrategy::LumpSum {
                        amount: p,
                        year: years - 1,
                    });
                    strategies.push(prepayment::PrepaymentStrategy::LumpSum {
                        amount: p / dec!(2),
                        year: 1,
                    });
                }
                for strategy in strategies {
                    let label = format!("prepayment p={p} rate={rate} years={years} {strategy:?}");
                    let input = prepayment::PrepaymentInput {
                        principal: p,
                        annual_rate_percent: rate,
                        tenure_years: years,
                        strategy,
                    };
                    assert_ok_or_invalid(&label, prepayment::calculate_prepayment(&input));
                }
            }
        }
    }
}

#[test]
fn test_capacity_and_affordability_grid() {
    for income in AMOUNTS {
        for rate in RATES {
            for years in TENURES {
                for employment_type in [
                    capacity::EmploymentType::Salaried,
                    capacity::EmploymentType::SelfEmployed,
                ] {
                    let input = capacity::BorrowingCapacityInput {
                        monthly_income: income,
                        existing_emis: Decimal::ZERO,
                        other_expenses: income,
                        employment_type,
                        annual_rate_percent: rate,
                        tenure_years: years,
                    };
                    assert_ok_or_invalid(
                        &format!("capacity income={income} rate={rate} years={years}"),
                        capacity::calculate_borrowing_capacity(&input),
                    );
                }
                for dp in [Decimal::ZERO, dec!(50), dec!(95), dec!(99.9)] {
                    let input = affordability::AffordabilityInput {
                        monthly_income: income,
                        existing_emis: Decimal::ZERO,
                        down_payment_percent: dp,
                        tenure_years: years,
                        annual_rate_percent: rate,
                        state: "tamilnadu".into(),
                    };
                    assert_ok_or_invalid(
                        &format!("affordability income={income} rate={rate} years={years} dp={dp}"),
                        affordability::calculate_affordability(&input),
                    );
                }
            }
        }
    }
}

#[test]
fn test_comparison_grid() {
    for p in AMOUNTS {
        for years in TENURES {
            let mut high = offer("High", dec!(100), comparison::ProcessingFee::Percentage(dec!(100)));
            high.prepayment_charge_percent = dec!(100);
            high.insurance = dec!(1_000_000_000_000_000);
            let input = comparison::LoanComparisonInput {
                loan_amount: p,
                tenure_years: years,
                offers: vec![
                    offer("Zero", Decimal::ZERO, comparison::ProcessingFee::Fixed(Decimal::ZERO)),
                    high,
                ],
            };
            assert_ok_or_invalid(
                &format!("comparison p={p} years={years}"),
                comparison::compare_loans(&input),
            );
        }
    }
}
