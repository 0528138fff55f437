use serde_json::Value;
use std::io;

use super::{format_value, result_of, scalar_fields, SERIES_KEYS};

/// Write the primary series as CSV rows, or `field,value` pairs when the
/// result has no series.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let result = result_of(value);

    let series = SERIES_KEYS
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array))
        .filter(|rows| !rows.is_empty());

    let written = match series {
        Some(rows) => write_rows(&mut wtr, rows),
        None => write_fields(&mut wtr, result),
    };
    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write CSV output");
    }
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, result: &Value) -> csv::Result<()> {
    let mut fields = Vec::new();
    scalar_fields("", result, &mut fields);
    wtr.write_record(["field", "value"])?;
    for (key, val) in &fields {
        wtr.write_record([key.as_str(), &csv_value(val)])?;
    }
    Ok(())
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(csv_value).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
        other => format_value(other),
    }
}
