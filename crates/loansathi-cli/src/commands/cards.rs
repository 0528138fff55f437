use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loansathi_core::cards::payoff::{self, CardPayoffInput, PaymentStrategy};

use super::{optional_amount, required_amount};
use crate::input;

/// Arguments for credit card payoff
#[derive(Args)]
pub struct CardPayoffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance
    #[arg(long)]
    pub balance: Option<String>,

    /// Annual interest rate in percent
    #[arg(long, default_value = "36")]
    pub rate: Decimal,

    /// Minimum due as a percent of the balance
    #[arg(long, default_value = "5")]
    pub minimum_percent: Decimal,

    /// Monthly payment for the custom strategy
    #[arg(long)]
    pub payment: Option<String>,

    /// minimum, custom or aggressive
    #[arg(long, default_value = "minimum")]
    pub strategy: String,
}

pub fn run_card_payoff(args: CardPayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let card_input: CardPayoffInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let strategy = args.strategy.parse::<PaymentStrategy>()?;
        if strategy == PaymentStrategy::Custom && args.payment.is_none() {
            return Err("--payment is required with --strategy custom".into());
        }
        CardPayoffInput {
            balance: required_amount("balance", args.balance.as_deref())?,
            annual_rate_percent: args.rate,
            minimum_payment_percent: args.minimum_percent,
            custom_payment: optional_amount("payment", args.payment.as_deref())?,
            strategy,
        }
    };
    let result = payoff::calculate_card_payoff(&card_input)?;
    Ok(serde_json::to_value(result)?)
}
