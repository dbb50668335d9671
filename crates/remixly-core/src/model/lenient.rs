// Lenient field decoders for persisted local state.
//
// State files outlive releases and may be hand-edited; a malformed field
// falls back to its default instead of failing the whole document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::engine::DEFAULT_GUEST_USES;

fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Option::<Value>::deserialize(d)
}

/// Numbers (or numeric strings) clamp at zero; anything else is `None`.
fn parse_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

pub(crate) fn guest_uses<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(raw(d)?
        .as_ref()
        .and_then(parse_count)
        .unwrap_or(DEFAULT_GUEST_USES))
}

pub(crate) fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(raw(d)?.as_ref().and_then(parse_count).unwrap_or(0))
}

pub(crate) fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match raw(d)? {
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

pub(crate) fn timestamp<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match raw(d)? {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    })
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match raw(d)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match raw(d)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Any `Deserialize` value; a malformed one becomes `None`.
pub(crate) fn optional<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(raw(d)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// A nested struct; a malformed one becomes its `Default`.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(raw(d)?
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}
