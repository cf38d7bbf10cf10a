use indexmap::IndexMap;
use serde_json::{Number, Value};

/// One realized table row, column name to cell, in column order
pub type Row = IndexMap<String, Value>;

/// Convert a float into a JSON cell. NaN and infinities have no JSON form and become null.
pub fn float_cell(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// String form of a cell used when a value becomes a label
pub fn cell_label(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Format a cell for tabular display: integral floats lose their fraction,
/// other floats round to 2 decimals, nulls render as `N/A`.
pub fn display_cell(v: &Value) -> Value {
    match v {
        Value::Null => Value::String("N/A".to_string()),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
            Some(f) => float_cell((f * 100.0).round() / 100.0),
            None => Value::String("N/A".to_string()),
        },
        Value::Number(_) | Value::Bool(_) => v.clone(),
        other => Value::String(cell_label(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_cell_non_finite() {
        assert_eq!(float_cell(f64::NAN), Value::Null);
        assert_eq!(float_cell(f64::INFINITY), Value::Null);
        assert_eq!(float_cell(f64::NEG_INFINITY), Value::Null);
        assert_eq!(float_cell(1.5), json!(1.5));
    }

    #[test]
    fn test_cell_label() {
        assert_eq!(cell_label(&json!("West")), "West");
        assert_eq!(cell_label(&json!(2024)), "2024");
        assert_eq!(cell_label(&Value::Null), "null");
    }

    #[test]
    fn test_display_cell() {
        assert_eq!(display_cell(&json!(3.0)), json!(3));
        assert_eq!(display_cell(&json!(3.14159)), json!(3.14));
        assert_eq!(display_cell(&json!(7)), json!(7));
        assert_eq!(display_cell(&Value::Null), json!("N/A"));
        assert_eq!(display_cell(&json!(true)), json!(true));
        assert_eq!(display_cell(&json!("East")), json!("East"));
    }
}
