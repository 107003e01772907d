//! Helpers for the untyped JSON values carried by selections and parameters.

use serde_json::Value;

/// JSON equality that treats `1` and `1.0` as the same number.
///
/// # Examples
///
/// ```
/// use pathwise_domain::common::json_equal;
/// use serde_json::json;
///
/// assert!(json_equal(&json!(1), &json!(1.0)));
/// assert!(json_equal(&json!([1, "a"]), &json!([1.0, "a"])));
/// assert!(!json_equal(&json!("1"), &json!(1)));
/// ```
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text form of a scalar for prefix and pattern matching. Arrays, objects
/// and null have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_compare_numerically() {
        assert!(json_equal(&json!({"a": 2}), &json!({"a": 2.0})));
        assert!(!json_equal(&json!({"a": 2}), &json!({"a": 2, "b": 1})));
    }

    #[test]
    fn scalar_text_skips_containers() {
        assert_eq!(scalar_text(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(["a"])), None);
        assert_eq!(scalar_text(&Value::Null), None);
    }
}
