//! The uniform `{success, ..., message}` envelope every tool returns.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::OperationResult;

/// Successful envelope: `{success: true, <data fields>, message}`.
pub fn success(data: impl Serialize, message: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert("success".to_string(), Value::Bool(true));
    merge(&mut map, data);
    map.insert("message".to_string(), Value::String(message.into()));
    Value::Object(map)
}

/// Failed envelope: `{success: false, error, message, <context fields>}`.
pub fn failure(error: impl Into<String>, message: impl Into<String>, context: impl Serialize) -> Value {
    let mut map = Map::new();
    map.insert("success".to_string(), Value::Bool(false));
    merge(&mut map, context);
    map.insert("error".to_string(), Value::String(error.into()));
    map.insert("message".to_string(), Value::String(message.into()));
    Value::Object(map)
}

/// Envelope for an [`OperationResult`]; `context` fields appear on both outcomes.
pub fn from_result<T: Serialize>(result: OperationResult<T>, context: Value) -> Value {
    match result {
        OperationResult::Ok { payload, message } => {
            let mut envelope = success(payload, message);
            if let Value::Object(map) = &mut envelope {
                merge(map, context);
            }
            envelope
        }
        OperationResult::Fail { error_kind, message } => failure(error_kind, message, context),
    }
}

/// Render an envelope as the JSON string handed back to the caller.
pub fn render(envelope: &Value) -> String {
    serde_json::to_string_pretty(envelope).unwrap_or_else(|e| {
        format!(r#"{{"success": false, "error": "serialization_error", "message": "{e}"}}"#)
    })
}

fn merge(map: &mut Map<String, Value>, data: impl Serialize) {
    match serde_json::to_value(data) {
        Ok(Value::Object(fields)) => {
            for (key, value) in fields {
                if key != "success" && key != "message" {
                    map.insert(key, value);
                }
            }
        }
        Ok(Value::Null) => {}
        Ok(other) => {
            map.insert("data".to_string(), other);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize envelope data");
        }
    }
}
