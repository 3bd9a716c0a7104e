//! Serde helpers for identifiers.
//!
//! The service sends ids as JSON strings on some endpoints and numbers on
//! others, and configs written by older tools keep whatever the server sent.
//! Both forms are read into `String`.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// Accept a JSON string or number and keep it as text.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Like [`id_string`], with `null` or a missing value read as `None`.
///
/// Pair with `#[serde(default)]` so an absent key also decodes.
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
