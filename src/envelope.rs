//! Response envelopes. The backend answers either with a bare payload or with
//! `{success, <key>: payload, message}`; only these two shapes are accepted.

use crate::errors::{ServiceError, ServiceResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Fails with the backend message when the envelope says `success: false`.
pub fn ensure_success(value: &Value) -> ServiceResult<()> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .or_else(|| value.get("detail"))
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        return Err(ServiceError::Failed(message.to_string()));
    }
    Ok(())
}

/// A list payload: either the value itself or the array under `key`.
pub fn list<T: DeserializeOwned>(value: Value, key: &str) -> ServiceResult<Vec<T>> {
    ensure_success(&value)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(ServiceError::Decode(format!("missing `{key}` list")));
            }
            Some(_) => return Err(ServiceError::Decode(format!("`{key}` is not a list"))),
        },
        _ => return Err(ServiceError::Decode("expected a list payload".to_string())),
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|err| ServiceError::Decode(err.to_string()))
        })
        .collect()
}

/// An object payload: the value under `key` when present, else the value.
pub fn object<T: DeserializeOwned>(value: Value, key: &str) -> ServiceResult<T> {
    ensure_success(&value)?;
    let inner = match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(inner).map_err(|err| ServiceError::Decode(err.to_string()))
}
