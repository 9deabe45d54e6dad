//! Human-readable diffs for audit entries

use serde_json::Value;

/// Fields that change on every update and only add noise to a diff
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Summarise the top-level field changes between two JSON values
///
/// Returns None when nothing meaningful changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!(
                        "{}: {} -> (removed)",
                        key,
                        format_value(before_val)
                    )),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            if changes.is_empty() {
                None
            } else {
                Some(changes.join(", "))
            }
        }
        _ if before != after => Some(format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )),
        _ => None,
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_change() {
        let before = json!({"name": "Listrik", "amount": 35000000});
        let after = json!({"name": "Listrik", "amount": 40000000});
        assert_eq!(
            generate_diff(&before, &after).as_deref(),
            Some("amount: 35000000 -> 40000000")
        );
    }

    #[test]
    fn test_added_and_removed() {
        let before = json!({"goal_id": "abc"});
        let after = json!({"bill_id": "def"});
        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("goal_id: \"abc\" -> (removed)"));
        assert!(diff.contains("bill_id: (added) -> \"def\""));
    }

    #[test]
    fn test_no_changes_and_ignored_fields() {
        let before = json!({"name": "Laptop", "updated_at": "2025-01-01"});
        let after = json!({"name": "Laptop", "updated_at": "2025-02-01"});
        assert_eq!(generate_diff(&before, &after), None);
    }

    #[test]
    fn test_long_multibyte_string_truncated() {
        let long = "é".repeat(80);
        let diff = generate_diff(&json!({"notes": ""}), &json!({"notes": long})).unwrap();
        assert!(diff.ends_with("...\""));
    }

    #[test]
    fn test_non_object_values() {
        assert_eq!(
            generate_diff(&json!(1), &json!(2)).as_deref(),
            Some("1 -> 2")
        );
        assert_eq!(generate_diff(&json!([1]), &json!([1])), None);
    }
}
