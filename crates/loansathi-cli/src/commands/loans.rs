use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loansathi_core::loans::affordability::{self, AffordabilityInput};
use loansathi_core::loans::capacity::{self, BorrowingCapacityInput, EmploymentType};
use loansathi_core::loans::comparison::{self, LoanComparisonInput};
use loansathi_core::loans::emi::{self, EmiInput, LoanType};
use loansathi_core::loans::prepayment::{self, PrepaymentInput, PrepaymentStrategy};

use super::{optional_amount, required_amount};
use crate::input;

/// Arguments for the EMI calculation
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount, e.g. 25,00,000
    #[arg(long)]
    pub principal: Option<String>,

    /// Annual interest rate in percent (defaults to the loan type's rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in years
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Loan type: home, personal, car or education
    #[arg(long)]
    pub loan_type: Option<String>,
}

/// Arguments for prepayment analysis
#[derive(Args)]
pub struct PrepaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<String>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in years
    #[arg(long)]
    pub tenure: Option<u32>,

    /// One-time prepayment amount
    #[arg(long, conflicts_with = "monthly_extra", requires = "lump_sum_year")]
    pub lump_sum: Option<String>,

    /// Loan year at whose end the lump sum is paid
    #[arg(long)]
    pub lump_sum_year: Option<u32>,

    /// Extra amount paid with every EMI
    #[arg(long)]
    pub monthly_extra: Option<String>,
}

/// Arguments for borrowing capacity
#[derive(Args)]
pub struct CapacityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly income
    #[arg(long)]
    pub monthly_income: Option<String>,

    /// EMIs already being paid each month
    #[arg(long)]
    pub existing_emis: Option<String>,

    /// Other monthly expenses
    #[arg(long)]
    pub other_expenses: Option<String>,

    /// salaried or self-employed
    #[arg(long, default_value = "salaried")]
    pub employment: String,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub tenure: u32,
}

/// Arguments for home affordability
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly income
    #[arg(long)]
    pub monthly_income: Option<String>,

    /// EMIs already being paid each month
    #[arg(long)]
    pub existing_emis: Option<String>,

    /// Down payment as a percent of the home price
    #[arg(long, default_value = "20")]
    pub down_payment: Decimal,

    /// Tenure in years
    #[arg(long, default_value_t = 20)]
    pub tenure: u32,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    pub rate: Decimal,

    /// State for stamp duty, e.g. maharashtra, karnataka, other
    #[arg(long, default_value = "other")]
    pub state: String,
}

/// Arguments for loan comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file with the loan amount, tenure and offers
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let emi_input: EmiInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let loan_type = args
            .loan_type
            .as_deref()
            .map(str::parse::<LoanType>)
            .transpose()?;
        EmiInput {
            principal: required_amount("principal", args.principal.as_deref())?,
            annual_rate_percent: args.rate,
            tenure_years: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            loan_type,
        }
    };
    let result = emi::calculate_emi(&emi_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_prepayment(args: PrepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prepay_input: PrepaymentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let strategy = match (args.lump_sum.as_deref(), args.monthly_extra.as_deref()) {
            (Some(amount), None) => PrepaymentStrategy::LumpSum {
                amount: required_amount("lump-sum", Some(amount))?,
                year: args
                    .lump_sum_year
                    .ok_or("--lump-sum-year is required with --lump-sum")?,
            },
            (None, Some(amount)) => PrepaymentStrategy::MonthlyExtra {
                amount: required_amount("monthly-extra", Some(amount))?,
            },
            _ => return Err("provide either --lump-sum or --monthly-extra".into()),
        };
        PrepaymentInput {
            principal: required_amount("principal", args.principal.as_deref())?,
            annual_rate_percent: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure_years: args
                .tenure
                .ok_or("--tenure is required (or provide --input)")?,
            strategy,
        }
    };
    let result = prepayment::calculate_prepayment(&prepay_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_capacity(args: CapacityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capacity_input: BorrowingCapacityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        BorrowingCapacityInput {
            monthly_income: required_amount("monthly-income", args.monthly_income.as_deref())?,
            existing_emis: optional_amount("existing-emis", args.existing_emis.as_deref())?,
            other_expenses: optional_amount("other-expenses", args.other_expenses.as_deref())?,
            employment_type: args.employment.parse::<EmploymentType>()?,
            annual_rate_percent: args.rate,
            tenure_years: args.tenure,
        }
    };
    let result = capacity::calculate_borrowing_capacity(&capacity_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        AffordabilityInput {
            monthly_income: required_amount("monthly-income", args.monthly_income.as_deref())?,
            existing_emis: optional_amount("existing-emis", args.existing_emis.as_deref())?,
            down_payment_percent: args.down_payment,
            tenure_years: args.tenure,
            annual_rate_percent: args.rate,
            state: args.state,
        }
    };
    let result = affordability::calculate_affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare_input: LoanComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file or stdin required for loan comparison".into());
    };
    let result = comparison::compare_loans(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}
