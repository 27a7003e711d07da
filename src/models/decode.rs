//! Field lookup helpers shared by the response decoders.
//!
//! Backend payloads drift between field names (`is_read` vs `read_at`,
//! `content` vs `message`). Each decoder states its fallback order through
//! these helpers so the order is written once per shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Unwrap `{key: [...]}`, `{data: [...]}` or a bare array into its items.
///
/// Anything else decodes as an empty list.
pub fn list_items<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    let list = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.get("data"))
            .and_then(Value::as_array),
        _ => None,
    };
    list.map_or(&[], Vec::as_slice)
}

/// Unwrap `{key: {...}}` or `{data: {...}}`, falling back to the payload itself
pub fn object_payload<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload
        .get(key)
        .filter(|v| v.is_object())
        .or_else(|| payload.get("data").filter(|v| v.is_object()))
        .unwrap_or(payload)
}

/// First non-empty string among `keys`
pub fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// First string among `keys`, else `default`
pub fn str_or(item: &Value, keys: &[&str], default: &str) -> String {
    first_str(item, keys).unwrap_or_else(|| default.to_string())
}

/// Identifier that may arrive as a number or a string
pub fn id_of(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| item.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Integer that may arrive as a number (possibly fractional) or a numeric string
pub fn first_i64(item: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|k| item.get(*k)).find_map(as_i64_lenient)
}

#[allow(clippy::cast_possible_truncation)]
fn as_i64_lenient(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
            let cleaned = cleaned.trim();
            cleaned
                .parse::<i64>()
                .ok()
                .or_else(|| cleaned.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}

/// Boolean that may arrive as `true`, `1` or `"true"`
pub fn first_bool(item: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().filter_map(|k| item.get(*k)).find_map(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare date
pub fn first_datetime(item: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .filter_map(Value::as_str)
        .find_map(parse_datetime)
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
