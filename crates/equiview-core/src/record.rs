//! Telemetry rows supplied by the host page
//!
//! Records arrive as loosely-typed JSON from another browsing context, so
//! decoding is lenient: wrong-typed fields fall back to their defaults and
//! never reject the record.

use serde_json::Value;
use std::fmt;

/// One row of terminal data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelRecord {
    /// Display label (`label` or `name` in the JSON)
    pub label: Option<String>,
    /// Secondary identifier shown when the label is missing or empty
    pub code: Option<String>,
    pub value: RecordValue,
    /// CSS color for the value cell
    pub color: String,
}

impl PanelRecord {
    pub fn new(label: impl Into<String>, value: impl Into<RecordValue>, color: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            code: None,
            value: value.into(),
            color: color.into(),
        }
    }

    /// Decode a record from a JSON object. Returns `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let label = obj
            .get("label")
            .and_then(lenient_string)
            .filter(|l| !l.is_empty())
            .or_else(|| obj.get("name").and_then(lenient_string));

        Some(Self {
            label,
            code: obj.get("code").and_then(lenient_string),
            value: obj.get("value").map(RecordValue::from).unwrap_or_default(),
            color: obj
                .get("color")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Decode a JSON array of records, skipping entries that are not objects.
    /// Anything other than an array yields an empty list.
    pub fn list_from_value(value: Option<&Value>) -> Vec<Self> {
        let Some(items) = value.and_then(Value::as_array) else {
            if let Some(other) = value.filter(|v| !v.is_null()) {
                tracing::warn!("Expected a record list, got {}", json_kind(other));
            }
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let record = Self::from_value(item);
                if record.is_none() {
                    tracing::warn!("Skipping record {}: expected an object, got {}", idx, json_kind(item));
                }
                record
            })
            .collect()
    }

    /// Label text with the `code` fallback applied
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.code.as_deref())
            .unwrap_or_default()
    }
}

/// A record value: string, number, boolean, or nothing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecordValue {
    #[default]
    Null,
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<&Value> for RecordValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RecordValue::Null,
            Value::String(s) => RecordValue::Text(s.clone()),
            Value::Number(n) => RecordValue::Number(n.clone()),
            Value::Bool(b) => RecordValue::Bool(*b),
            other => RecordValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        RecordValue::Text(s)
    }
}

impl From<i64> for RecordValue {
    fn from(n: i64) -> Self {
        RecordValue::Number(n.into())
    }
}

impl From<f64> for RecordValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(RecordValue::Number)
            .unwrap_or_default()
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Null => Ok(()),
            RecordValue::Text(s) => f.write_str(s),
            RecordValue::Bool(b) => write!(f, "{}", b),
            RecordValue::Number(n) => write_number(f, n),
        }
    }
}

/// Integral floats print without a fractional part (`5.0` shows as `5`)
fn write_number(f: &mut fmt::Formatter<'_>, n: &serde_json::Number) -> fmt::Result {
    if n.is_i64() || n.is_u64() {
        return write!(f, "{}", n);
    }
    match n.as_f64() {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", v as i64),
        Some(v) => write!(f, "{}", v),
        None => write!(f, "{}", n),
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_value() {
        let record = PanelRecord::from_value(&json!({
            "name": "A相电流",
            "code": "IA",
            "value": 12.5,
            "color": "#2FC060"
        }))
        .unwrap();

        assert_eq!(record.display_label(), "A相电流");
        assert_eq!(record.value.to_string(), "12.5");
        assert_eq!(record.color, "#2FC060");
    }

    #[test]
    fn test_label_falls_back_to_code() {
        let record = PanelRecord::from_value(&json!({ "name": "", "code": "T1", "value": null })).unwrap();
        assert_eq!(record.display_label(), "T1");
        assert_eq!(record.value.to_string(), "");

        let record = PanelRecord::from_value(&json!({ "code": 42 })).unwrap();
        assert_eq!(record.display_label(), "42");
    }

    #[test]
    fn test_empty_label_falls_back_to_name() {
        let record = PanelRecord::from_value(&json!({ "label": "", "name": "Bearing Temp", "code": "T2" })).unwrap();
        assert_eq!(record.label.as_deref(), Some("Bearing Temp"));
        assert_eq!(record.display_label(), "Bearing Temp");

        let record = PanelRecord::from_value(&json!({ "label": "Phase A", "name": "ignored" })).unwrap();
        assert_eq!(record.display_label(), "Phase A");
    }

    #[test]
    fn test_wrong_typed_fields_default() {
        let record = PanelRecord::from_value(&json!({
            "label": ["not", "a", "string"],
            "color": 7
        }))
        .unwrap();

        assert_eq!(record.display_label(), "");
        assert_eq!(record.value, RecordValue::Null);
        assert_eq!(record.color, "");
    }

    #[test]
    fn test_number_display() {
        assert_eq!(RecordValue::from(5i64).to_string(), "5");
        assert_eq!(RecordValue::from(5.0).to_string(), "5");
        assert_eq!(RecordValue::from(-0.25).to_string(), "-0.25");
        assert_eq!(RecordValue::from(&json!(true)).to_string(), "true");
    }

    #[test]
    fn test_list_skips_non_objects() {
        let list = json!([{ "label": "X", "value": 1 }, 3, "text", { "label": "Y" }]);
        let records = PanelRecord::list_from_value(Some(&list));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display_label(), "X");
        assert_eq!(records[1].display_label(), "Y");

        assert!(PanelRecord::list_from_value(Some(&json!("oops"))).is_empty());
        assert!(PanelRecord::list_from_value(None).is_empty());
    }
}
