use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::fmt::Write;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

/// Scalar result fields go in a `Field | Value` table; every array of
/// records (the schedule, balance milestones) gets its own table below it.
pub fn render_table(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => render_result(result, map, &mut out),
            _ => out.push_str(&field_table(map)),
        },
        Value::Array(arr) => out.push_str(&record_table(arr)),
        _ => {
            let _ = writeln!(out, "{}", value);
        }
    }
    out
}

fn render_result(result: &Map<String, Value>, envelope: &Map<String, Value>, out: &mut String) {
    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(_, v)| !v.is_array())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    out.push_str(&field_table(&scalars));

    for (key, val) in result {
        if let Value::Array(rows) = val {
            if rows.first().is_some_and(Value::is_object) {
                let _ = write!(out, "\n{}:\n", key);
                out.push_str(&record_table(rows));
            }
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings {
                if let Value::String(s) = w {
                    let _ = writeln!(out, "  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        let _ = writeln!(out, "\nMethodology: {}", meth);
    }
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    format!("{}\n", Table::from(builder))
}

fn record_table(arr: &[Value]) -> String {
    if arr.is_empty() {
        return "(empty)\n".to_string();
    }

    let Some(Value::Object(first)) = arr.first() else {
        return arr.iter().map(|v| format_value(v) + "\n").collect();
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    format!("{}\n", Table::from(builder))
}

/// Amounts are shown to two places and rates to six; anything that is not
/// a decimal string is shown verbatim.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) if d.abs() < Decimal::ONE => d.round_dp(6).normalize().to_string(),
            Ok(d) => d.round_dp(2).to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
