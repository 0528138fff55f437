use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loansathi_core::investments::sip::{self, SipInput, SipMode, StepUpFrequency};

use super::required_amount;
use crate::input;

/// Arguments for SIP projection
#[derive(Args)]
pub struct SipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly investment; reports the maturity value
    #[arg(long, conflicts_with = "target")]
    pub monthly: Option<String>,

    /// Target corpus; reports the monthly SIP required
    #[arg(long)]
    pub target: Option<String>,

    /// Investment period in years (1-30)
    #[arg(long, default_value_t = 10)]
    pub years: u32,

    /// Expected annual return in percent
    #[arg(long, default_value = "12")]
    pub expected_return: Decimal,

    /// Raise the SIP by this percent every year
    #[arg(long)]
    pub step_up: Option<Decimal>,

    /// Annual inflation in percent, for the real value
    #[arg(long, default_value = "6")]
    pub inflation: Decimal,

    /// Include the tax saving estimate
    #[arg(long)]
    pub tax_saving: bool,
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sip_input: SipInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let mode = match (args.monthly.as_deref(), args.target.as_deref()) {
            (Some(amount), None) => SipMode::Amount {
                monthly_amount: required_amount("monthly", Some(amount))?,
            },
            (None, Some(target)) => SipMode::Goal {
                target_amount: required_amount("target", Some(target))?,
            },
            _ => return Err("provide either --monthly or --target".into()),
        };
        let (step_up_frequency, step_up_percent) = match args.step_up {
            Some(pct) => (StepUpFrequency::Yearly, pct),
            None => (StepUpFrequency::None, Decimal::ZERO),
        };
        SipInput {
            mode,
            period_years: args.years,
            expected_return_percent: args.expected_return,
            step_up_percent,
            step_up_frequency,
            inflation_percent: args.inflation,
            tax_saving: args.tax_saving,
        }
    };
    let result = sip::calculate_sip(&sip_input)?;
    Ok(serde_json::to_value(result)?)
}
