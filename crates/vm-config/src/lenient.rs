//! Field deserializers that accept what the document checks accept.
//!
//! A hand-written configuration may quote numbers (`rh: "1.0"`) or write
//! whole numbers as floats (`radial_points: 50.0`). The checklist lets both
//! through, so the typed schema has to read them as well.

use chrono::NaiveDateTime;
use serde::de::{Deserializer, Error};
use serde::{Deserialize, Serializer};
use serde_yaml::Value;
use vm_core::{Scalar, parse_float, parse_int};

pub(crate) fn scalar(value: &Value) -> Scalar<'_> {
    match value {
        Value::String(text) => Scalar::Text(text),
        Value::Number(number) => number.as_f64().map_or(Scalar::Null, Scalar::Number),
        Value::Bool(flag) => Scalar::Bool(*flag),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => Scalar::Null,
    }
}

pub(crate) fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_float(scalar(&value), "float field").map_err(D::Error::custom)
}

pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_int(scalar(&value), "integer field").map_err(D::Error::custom)
}

/// Any number, or nothing. Unparseable values are dropped.
pub(crate) fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match scalar(&value) {
        Scalar::Number(number) => Some(number),
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Bool(_) | Scalar::Null => None,
    })
}

pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a name, found {other:?}"
        ))),
    }
}

/// Run timestamps, written the way PyYAML writes a `datetime`.
pub(crate) mod timestamp {
    use super::*;

    const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
    const READ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub(crate) fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(WRITE_FORMAT).to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        READ_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid run timestamp '{raw}'")))
    }
}
