use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_value, result_of, scalar_fields, SERIES_KEYS};

/// Summary fields as a two-column table, then one table per series.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    if !result.is_object() {
        println!("{}", format_value(result));
        return;
    }

    let mut fields = Vec::new();
    scalar_fields("", result, &mut fields);
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.clone(), format_value(val)]);
    }
    println!("{}", Table::from(builder));

    for key in SERIES_KEYS {
        if let Some(Value::Array(rows)) = result.get(key) {
            if !rows.is_empty() {
                println!("\n{key}:");
                print_rows(rows);
            }
        }
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    // Per-month chart data is too long for a terminal table
    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_array())
        .map(|(k, _)| k.clone())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(cells);
        }
    }
    println!("{}", Table::from(builder));
}

// Tagged enums such as `{"status":"months","months":31}` read better inline
fn cell(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .values()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(" "),
        other => format_value(other),
    }
}
