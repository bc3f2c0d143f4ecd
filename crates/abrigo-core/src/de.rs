//! Lenient field decoders for data API records.
//!
//! The backend is inconsistent about JSON types: ids arrive as strings or
//! numbers, coordinates as numbers, numeric strings or `null`. A single bad
//! record must not fail the whole collection, so these decoders never error
//! on a JSON value. Unusable coordinates become NaN and are filtered out by
//! the geometry code.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn nan() -> f64 {
    f64::NAN
}

/// Number, numeric string, `null` or anything else (NaN).
pub(crate) fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// String or number id, normalised to a string.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Non-negative integer count; missing or unparseable becomes `None`.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `true`/`false`, with `null` treated as not deleted.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}
