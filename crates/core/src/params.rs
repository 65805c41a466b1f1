//! Helpers for extracting typed parameters from a `serde_json::Value` object.
//!
//! A missing key (or `null`) yields the default. A key that is present with
//! the wrong JSON type is reported as [`EngineError::ParamTypeMismatch`] so
//! that a typo like `"damping": "0.9"` does not silently run with defaults.

use serde_json::Value;

use crate::error::EngineError;

/// Extracts an `f64` from `params[name]`, returning `default` if missing.
///
/// Accepts both JSON floats and integers.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, EngineError> {
    match lookup(params, name) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| mismatch(name, "number", v)),
    }
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing.
///
/// Only non-negative integers are accepted; `2.5` and `-1` are mismatches.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, EngineError> {
    match lookup(params, name) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| mismatch(name, "non-negative integer", v)),
    }
}

/// Extracts a `String` from `params[name]`, returning `default` if missing.
pub fn param_string(params: &Value, name: &str, default: &str) -> Result<String, EngineError> {
    match lookup(params, name) {
        None => Ok(default.to_owned()),
        Some(v) => v
            .as_str()
            .map(String::from)
            .ok_or_else(|| mismatch(name, "string", v)),
    }
}

fn lookup<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn mismatch(name: &str, expected: &str, got: &Value) -> EngineError {
    EngineError::ParamTypeMismatch {
        name: name.to_owned(),
        expected: expected.to_owned(),
        got: json_type_name(got).to_owned(),
    }
}

/// Short JSON type name used in error messages.
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
