use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;

use loansathi_core::format::{format_inr, format_inr_compact, format_tenure};

use super::{format_value, result_of};

/// Headline figure of each calculator, first match wins.
const PRIORITY_KEYS: [&str; 8] = [
    "emi",
    "interest_savings",
    "max_home_price",
    "max_loan_amount",
    "best_lender",
    "required_sip",
    "maturity_amount",
    "additional_life_insurance_needed",
];

/// Print just the key answer, rupee amounts in Indian grouping.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);
    println!("{}", headline(result));
}

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return format_value(result);
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return rupees_or_text(val);
        }
    }

    // Card payoff: time to clear the balance with the selected payment
    if let Some(selected) = map
        .get("scenarios")
        .and_then(Value::as_array)
        .and_then(|s| s.get(1))
    {
        return payoff_time(selected);
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_value(val)),
        None => String::new(),
    }
}

fn rupees_or_text(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(amount) if amount >= dec!(100_000) => {
                format!("{} ({})", format_inr(amount), format_inr_compact(amount))
            }
            Ok(amount) => format_inr(amount),
            Err(_) => s.clone(),
        },
        other => format_value(other),
    }
}

fn payoff_time(scenario: &Value) -> String {
    let payoff = scenario.get("payoff");
    match payoff.and_then(|p| p.get("status")).and_then(Value::as_str) {
        Some("months") => payoff
            .and_then(|p| p.get("months"))
            .and_then(Value::as_u64)
            .map(|m| format_tenure(m as u32))
            .unwrap_or_default(),
        Some("never") => "never (payment does not cover interest)".to_string(),
        Some(other) => other.replace('_', " "),
        None => format_value(scenario),
    }
}
