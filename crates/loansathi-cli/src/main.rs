mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::cards::CardPayoffArgs;
use commands::insurance::InsuranceArgs;
use commands::investments::SipArgs;
use commands::loans::{AffordabilityArgs, CapacityArgs, CompareArgs, EmiArgs, PrepaymentArgs};

/// Loan, investment and insurance calculators
#[derive(Parser)]
#[command(
    name = "loansathi",
    version,
    about = "Loan, investment and insurance calculators",
    long_about = "A CLI for personal-finance calculations with decimal precision. \
                  Supports EMI, prepayment, borrowing capacity, home affordability, \
                  loan comparison, credit-card payoff, SIP projections and \
                  insurance-need sizing."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly instalment, totals and yearly split for a loan
    Emi(EmiArgs),
    /// Effect of a lump-sum or monthly extra prepayment
    Prepayment(PrepaymentArgs),
    /// Maximum loan an income supports under FOIR limits
    Capacity(CapacityArgs),
    /// Home price you can afford, with stamp duty and fees
    Affordability(AffordabilityArgs),
    /// Rank lender offers by total cost
    Compare(CompareArgs),
    /// Credit card payoff: minimum vs chosen vs aggressive payments
    CardPayoff(CardPayoffArgs),
    /// SIP maturity, step-up projection or required SIP for a goal
    Sip(SipArgs),
    /// Life and health insurance need
    Insurance(InsuranceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("loansathi=debug,loansathi_core=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("loansathi=warn,loansathi_core=warn"))
    };

    // stdout carries the result, logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loans::run_emi(args),
        Commands::Prepayment(args) => commands::loans::run_prepayment(args),
        Commands::Capacity(args) => commands::loans::run_capacity(args),
        Commands::Affordability(args) => commands::loans::run_affordability(args),
        Commands::Compare(args) => commands::loans::run_compare(args),
        Commands::CardPayoff(args) => commands::cards::run_card_payoff(args),
        Commands::Sip(args) => commands::investments::run_sip(args),
        Commands::Insurance(args) => commands::insurance::run_insurance(args),
        Commands::Version => {
            println!("loansathi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
