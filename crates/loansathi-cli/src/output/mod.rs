pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Row-per-period or row-per-option arrays, in the order they are preferred
/// as the primary tabular series of a result.
pub(crate) const SERIES_KEYS: [&str; 5] = [
    "ranked",
    "scenarios",
    "yearly",
    "yearly_breakdown",
    "revised_yearly",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` member of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten scalar and nested-object fields to `(path, value)` pairs,
/// skipping arrays of objects.
pub(crate) fn scalar_fields(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    if let Value::Object(map) = value {
        for (key, val) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match val {
                Value::Object(_) => scalar_fields(&path, val, out),
                Value::Array(items) if items.iter().any(Value::is_object) => {}
                _ => out.push((path, val.clone())),
            }
        }
    }
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalar_fields_flattens_nested_totals() {
        let result = json!({
            "interest_savings": "909075",
            "original": { "emi": "21696", "tenure_months": 240 },
            "revised_yearly": [{ "year": 1 }],
        });
        let mut fields = Vec::new();
        scalar_fields("", &result, &mut fields);
        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["interest_savings", "original.emi", "original.tenure_months"]
        );
    }

    #[test]
    fn test_result_of_unwraps_envelope() {
        let value = json!({ "result": { "emi": "21696" }, "warnings": [] });
        assert_eq!(result_of(&value), &json!({ "emi": "21696" }));
    }
}
