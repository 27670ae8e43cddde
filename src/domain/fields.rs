//! Lenient field decoding for vendor JSON
//!
//! SIS APIs are inconsistent about scalar types: the same flag arrives as
//! `true`, `1`, `"Y"` or `null` depending on endpoint and school, and ids
//! flip between numbers and strings. These helpers are used with
//! `#[serde(deserialize_with = ...)]` on the typed record views.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON scalar the way a loosely-typed caller would
///
/// `null`, `false`, `0`, `""`, `"0"`, `"false"`, `"n"` and `"no"` are false;
/// anything else is true. Arrays and objects are true when non-empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            !matches!(s.as_str(), "" | "0" | "false" | "n" | "no")
        }
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar id as a string; `null` and empty strings become `None`
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// `deserialize_with` adapter for [`truthy`]; absent fields need `#[serde(default)]`
pub fn de_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

/// `deserialize_with` adapter for [`scalar_to_string`]
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

/// Like [`de_opt_id`] but for fields that must be present
pub fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| serde::de::Error::custom("id is null or empty"))
}

/// Treat an explicit `null` like a missing field
pub fn de_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Insert `fields` into `record` when it is a JSON object
///
/// Non-object records are returned unchanged.
pub fn merge_fields<I>(mut record: Value, fields: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    if let Value::Object(ref mut map) = record {
        for (key, value) in fields {
            map.insert(key.to_string(), value);
        }
    }
    record
}

/// Nullable string that also accepts numbers
pub fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_id(deserializer)
}
