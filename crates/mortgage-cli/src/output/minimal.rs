use serde_json::Value;

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_value(value));
}

/// The headline figure: the first well-known result field that is present,
/// falling back to the first field in the result object.
pub fn minimal_value(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["monthly_payment", "total_cost", "total_interest"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_monthly_payment_is_preferred() {
        let v = json!({"result": {"total_cost": "5", "monthly_payment": "972.35"}});
        assert_eq!(minimal_value(&v), "972.35");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let v = json!({"result": {"opening_balance": "100"}});
        assert_eq!(minimal_value(&v), "opening_balance: 100");
    }
}
