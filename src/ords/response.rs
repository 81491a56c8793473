//! Normalization of ORDS response envelopes.
//!
//! The backend's REST layer has gone through at least two response
//! conventions and both are live at the same time, with no version flag:
//!
//! - a raw JSON array, or the paged-query shape `{ "items": [...] }`;
//! - the legacy RPC shape `{ "success": ..., "message": ..., "result_json": ... }`
//!   where `success` may be a boolean or the strings `"true"`/`"false"`
//!   and `result_json` may be a JSON string or an already-parsed array.
//!
//! Every proxied read goes through [`normalize_records`] so the handlers
//! only ever see one canonical list-of-records form.

use serde_json::Value;

use super::OrdsError;

/// Convert a backend payload of unknown shape into an ordered list of
/// records. Checked in priority order, first match wins:
///
/// 1. a raw array is used verbatim;
/// 2. an object with an `items` array uses that array;
/// 3. an object with both `success` and `message` is the legacy RPC shape:
///    a falsy `success` is a hard failure carrying `message`, otherwise
///    `result_json` is decoded (string) or used directly (array), with
///    anything non-array coerced to empty;
/// 4. anything else is an empty list, not an error.
pub fn normalize_records(data: &Value) -> Result<Vec<Value>, OrdsError> {
    if let Value::Array(items) = data {
        return Ok(items.clone());
    }

    let Value::Object(map) = data else {
        return Ok(Vec::new());
    };

    if let Some(Value::Array(items)) = map.get("items") {
        return Ok(items.clone());
    }

    if map.contains_key("success") && map.contains_key("message") {
        if success_is_false(data) {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Error en la respuesta del servidor")
                .to_string();
            return Err(OrdsError::Backend(message));
        }

        return Ok(match map.get("result_json") {
            Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(items)) => items,
                Ok(_) => Vec::new(),
                Err(e) => {
                    tracing::warn!("Failed to decode result_json: {}", e);
                    Vec::new()
                }
            },
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        });
    }

    Ok(Vec::new())
}

/// True when a legacy-RPC `success` field is falsy: `false` or `"false"`.
pub fn success_is_false(data: &Value) -> bool {
    match data.get("success") {
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s == "false",
        _ => false,
    }
}

/// True when a legacy-RPC `success` field is truthy: `true` or `"true"`.
pub fn success_is_true(data: &Value) -> bool {
    match data.get("success") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Detect the embedded invalid-token signal.
///
/// ORDS sometimes reports an expired or invalid session with HTTP 200 and
/// a legacy-RPC body whose `message` names the invalid token. This is
/// distinct from a transport-level 401 and must be checked after every
/// proxied call. Best-effort: a payload without the expected fields is
/// simply not an invalid-token signal.
pub fn is_token_invalid(data: &Value) -> bool {
    if !data.is_object() {
        return false;
    }

    if !success_is_false(data) {
        return false;
    }

    data.get("message")
        .and_then(Value::as_str)
        .map(|m| m.to_lowercase().contains("token inválido"))
        .unwrap_or(false)
}

/// True when a response body is an HTML document rather than JSON.
///
/// Some deployments answer DELETE with the ORDS error page; that must be
/// reported as "endpoint unavailable", never as a JSON parse failure.
pub fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html")
}
