//! Cross-window host messages
//!
//! The embedding page posts `{ cmd, params }` objects. Only `init` is
//! recognised; everything else is ignored.

use serde_json::Value;
use thiserror::Error;

use crate::record::PanelRecord;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Command name that carries a full data refresh
pub const INIT_COMMAND: &str = "init";

/// A recognised command from the host page
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Init(InitParams),
}

impl HostCommand {
    /// Interpret an already-decoded message payload.
    ///
    /// Returns `None` for unknown commands, non-object payloads, and `init`
    /// messages without `params`.
    pub fn from_value(data: &Value) -> Option<Self> {
        let obj = data.as_object()?;
        let cmd = obj.get("cmd").and_then(Value::as_str)?;

        match cmd {
            INIT_COMMAND => {
                let Some(params) = obj.get("params").filter(|p| !p.is_null()) else {
                    tracing::debug!("Ignoring init message without params");
                    return None;
                };
                Some(HostCommand::Init(InitParams::from_value(params)))
            }
            other => {
                tracing::debug!("Ignoring host command: {}", other);
                None
            }
        }
    }

    /// Parse a JSON text payload
    pub fn from_json(text: &str) -> Result<Option<Self>, MessageError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }
}

/// Payload of an `init` command
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitParams {
    pub service_name: String,
    pub protector: Vec<PanelRecord>,
    pub warm: Vec<PanelRecord>,
}

impl InitParams {
    /// Decode params, defaulting every missing or wrong-typed field
    pub fn from_value(params: &Value) -> Self {
        if !params.is_object() {
            tracing::warn!("init params is not an object, using defaults");
            return Self::default();
        }

        Self {
            service_name: params
                .get("serviceName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            protector: PanelRecord::list_from_value(params.get("protector")),
            warm: PanelRecord::list_from_value(params.get("warm")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_init_message() {
        let cmd = HostCommand::from_value(&json!({
            "cmd": "init",
            "params": {
                "serviceName": "电动机P0410",
                "protector": [{ "name": "A相电流", "value": 10, "color": "#fff" }],
                "warm": []
            }
        }))
        .unwrap();

        let HostCommand::Init(params) = cmd;
        assert_eq!(params.service_name, "电动机P0410");
        assert_eq!(params.protector.len(), 1);
        assert!(params.warm.is_empty());
    }

    #[test]
    fn test_unknown_and_incomplete_messages_ignored() {
        assert!(HostCommand::from_value(&json!({ "cmd": "refresh", "params": {} })).is_none());
        assert!(HostCommand::from_value(&json!({ "cmd": "init" })).is_none());
        assert!(HostCommand::from_value(&json!({ "cmd": "init", "params": null })).is_none());
        assert!(HostCommand::from_value(&json!("init")).is_none());
        assert!(HostCommand::from_value(&json!({ "params": {} })).is_none());
    }

    #[test]
    fn test_missing_and_wrong_typed_fields_default() {
        let cmd = HostCommand::from_value(&json!({
            "cmd": "init",
            "params": { "serviceName": 17, "warm": { "label": "X" } }
        }))
        .unwrap();

        assert_eq!(cmd, HostCommand::Init(InitParams::default()));

        let cmd = HostCommand::from_value(&json!({ "cmd": "init", "params": [1, 2] })).unwrap();
        assert_eq!(cmd, HostCommand::Init(InitParams::default()));
    }

    #[test]
    fn test_from_json_text() {
        let cmd = HostCommand::from_json(r#"{"cmd":"init","params":{"serviceName":"M1"}}"#)
            .unwrap()
            .unwrap();
        let HostCommand::Init(params) = cmd;
        assert_eq!(params.service_name, "M1");

        assert!(matches!(HostCommand::from_json("{not json"), Err(MessageError::Json(_))));
    }
}
