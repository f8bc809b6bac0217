use serde_json::Value;
use std::io::{self, Write};

/// Column order for amortization schedule rows.
const SCHEDULE_COLUMNS: [&str; 5] = ["month", "payment", "interest", "principal", "remaining_balance"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// Schedule results become one row per payment; anything else is written
/// as two-column `field,value` pairs.
pub fn write_csv<W: Write>(out: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let result = value.get("result").unwrap_or(value);
    match result {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("schedule") {
                wtr.write_record(SCHEDULE_COLUMNS)?;
                for row in rows {
                    let record: Vec<String> = SCHEDULE_COLUMNS
                        .iter()
                        .map(|c| row.get(*c).map(format_csv_value).unwrap_or_default())
                        .collect();
                    wtr.write_record(&record)?;
                }
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &format_csv_value(val)])?;
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                wtr.write_record([&format_csv_value(item)])?;
            }
        }
        _ => {
            wtr.write_record([&format_csv_value(result)])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_rows_use_fixed_columns() {
        let v = json!({
            "result": {
                "monthly_payment": "10",
                "schedule": [
                    {"month": 1, "interest": "1", "principal": "9", "payment": "10", "remaining_balance": "11"},
                    {"month": 2, "interest": "0.5", "principal": "9.5", "payment": "10", "remaining_balance": "1.5"}
                ]
            }
        });
        let mut buf = Vec::new();
        write_csv(&mut buf, &v).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "month,payment,interest,principal,remaining_balance");
        assert_eq!(lines[1], "1,10,1,9,11");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_plain_result_is_field_value_pairs() {
        let v = json!({"result": {"total_cost": "100"}});
        let mut buf = Vec::new();
        write_csv(&mut buf, &v).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "field,value\ntotal_cost,100\n");
    }
}
