//! Forgiving readers for hand-edited JSON.
//!
//! Documents are written by tools and by people. These helpers accept the
//! usual spellings (numbers as strings, `"yes"`/`"off"` booleans, floats
//! where an int is expected) and fall back to the caller's default when a
//! value is unusable.

use serde_json::Value;

/// Read a boolean: JSON bools, non-zero numbers, and the strings
/// `true/1/yes/on` or `false/0/no/off` in any case.
pub fn json_bool(value: &Value, fallback: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(fallback, |v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => fallback,
        },
        _ => fallback,
    }
}

/// Read an integer. Floats are truncated; numeric strings are parsed.
pub fn json_int(value: &Value, fallback: i32) -> i32 {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.clamp(i32::MIN as i64, i32::MAX as i64) as i32
            } else {
                n.as_f64().map_or(fallback, |f| f as i32)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i32))
                .unwrap_or(fallback)
        }
        _ => fallback,
    }
}

/// Read a float. Numeric strings are parsed, and may spell `NaN` or `inf`;
/// callers that need finite values check for themselves.
pub fn json_float(value: &Value, fallback: f32) -> f32 {
    match value {
        Value::Number(n) => n.as_f64().map_or(fallback, |v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().unwrap_or(fallback),
        _ => fallback,
    }
}

/// Field `key` of an object, if present.
pub fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.as_object().and_then(|o| o.get(key))
}

/// Field `key` as a boolean, `fallback` when absent.
pub fn field_bool(value: &Value, key: &str, fallback: bool) -> bool {
    field(value, key).map_or(fallback, |v| json_bool(v, fallback))
}

pub fn field_int(value: &Value, key: &str, fallback: i32) -> i32 {
    field(value, key).map_or(fallback, |v| json_int(v, fallback))
}

pub fn field_float(value: &Value, key: &str, fallback: f32) -> f32 {
    field(value, key).map_or(fallback, |v| json_float(v, fallback))
}

/// Field `key` as a string slice, `None` unless it is a JSON string.
pub fn field_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    field(value, key).and_then(Value::as_str)
}
