use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loansathi_core::insurance::need::{self, InsuranceInput};

use super::{optional_amount, required_amount};
use crate::input;

/// Arguments for insurance need
#[derive(Args)]
pub struct InsuranceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current age
    #[arg(long)]
    pub age: Option<u32>,

    /// Annual income
    #[arg(long)]
    pub annual_income: Option<String>,

    /// Spouse's annual income (0 if not earning)
    #[arg(long)]
    pub spouse_income: Option<String>,

    /// Spouse's age
    #[arg(long)]
    pub spouse_age: Option<u32>,

    /// Children's ages, comma separated
    #[arg(long, value_delimiter = ',')]
    pub children: Vec<u32>,

    /// Savings and investments already held
    #[arg(long)]
    pub savings: Option<String>,

    /// Outstanding loans
    #[arg(long)]
    pub loans: Option<String>,

    /// Monthly household expenses
    #[arg(long)]
    pub monthly_expenses: Option<String>,

    /// Annual inflation in percent
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Expected annual return in percent
    #[arg(long, default_value = "8")]
    pub expected_return: Decimal,

    /// Retirement age
    #[arg(long, default_value_t = 60)]
    pub retirement_age: u32,

    /// Existing life cover
    #[arg(long)]
    pub life_cover: Option<String>,

    /// Existing health cover
    #[arg(long)]
    pub health_cover: Option<String>,
}

pub fn run_insurance(args: InsuranceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let insurance_input: InsuranceInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        InsuranceInput {
            age: args.age.ok_or("--age is required (or provide --input)")?,
            annual_income: required_amount("annual-income", args.annual_income.as_deref())?,
            spouse_income: optional_amount("spouse-income", args.spouse_income.as_deref())?,
            spouse_age: args.spouse_age,
            children_ages: args.children,
            current_savings: optional_amount("savings", args.savings.as_deref())?,
            outstanding_loans: optional_amount("loans", args.loans.as_deref())?,
            monthly_expenses: required_amount(
                "monthly-expenses",
                args.monthly_expenses.as_deref(),
            )?,
            inflation_percent: args.inflation,
            expected_return_percent: args.expected_return,
            retirement_age: args.retirement_age,
            existing_life_cover: optional_amount("life-cover", args.life_cover.as_deref())?,
            existing_health_cover: optional_amount("health-cover", args.health_cover.as_deref())?,
        }
    };
    let result = need::calculate_insurance_need(&insurance_input)?;
    Ok(serde_json::to_value(result)?)
}
