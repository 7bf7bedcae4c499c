use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scalar value of a single student attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One student record: feature name to scalar value. Built per submission
/// and discarded after inference.
pub type RecordMap = HashMap<String, FieldValue>;

/// Convert a JSON object (one form submission) into a record map.
/// Only scalar number/string members are accepted.
pub fn from_json_object(
    object: &serde_json::Map<String, serde_json::Value>,
) -> Result<RecordMap, CoreError> {
    let mut record = RecordMap::with_capacity(object.len());
    for (name, value) in object {
        let value = match value {
            serde_json::Value::Number(n) => {
                let n = n.as_f64().ok_or_else(|| CoreError::InvalidField {
                    field: name.clone(),
                    reason: "number out of range".to_string(),
                })?;
                FieldValue::Number(n)
            }
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => {
                return Err(CoreError::InvalidField {
                    field: name.clone(),
                    reason: format!("expected a number or string, got {other}"),
                })
            }
        };
        record.insert(name.clone(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object() {
        let object = serde_json::json!({"age": 17, "school": "GP"});
        let record = from_json_object(object.as_object().unwrap()).unwrap();

        assert_eq!(record.get("age"), Some(&FieldValue::Number(17.0)));
        assert_eq!(record.get("school"), Some(&FieldValue::Text("GP".to_string())));
    }

    #[test]
    fn test_from_json_object_rejects_non_scalar() {
        let object = serde_json::json!({"age": [17]});
        let err = from_json_object(object.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(FieldValue::Number(2.0).as_text(), None);
        assert_eq!(FieldValue::from("yes").as_text(), Some("yes"));
        assert_eq!(FieldValue::from("yes").as_f64(), None);
    }
}
