//! Classification of raw scalar input.
//!
//! Form fields arrive as text, document fields arrive as already-typed YAML
//! scalars. Both go through the same checks so the manual and file paths
//! accept exactly the same values.

use crate::error::{VmError, VmResult};

/// A raw scalar as it arrives from a form field or a parsed document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Null,
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(raw: &'a str) -> Self {
        Scalar::Text(raw)
    }
}

impl From<f64> for Scalar<'_> {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<bool> for Scalar<'_> {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// The type a raw value is expected to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Real number >= 0.
    Float,
    /// Real number >= 0 with no fractional part.
    Int,
    /// An already-boolean value. Text such as `"true"` does not qualify.
    Bool,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Float => write!(f, "float"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Bool => write!(f, "bool"),
        }
    }
}

/// Returns true when `raw` holds a valid value of `kind`. Never fails.
pub fn is_valid_number<'a>(raw: impl Into<Scalar<'a>>, kind: ValueKind) -> bool {
    let raw = raw.into();
    match kind {
        ValueKind::Float => as_real(raw).is_some_and(|v| v >= 0.0),
        ValueKind::Int => as_real(raw).is_some_and(|v| v >= 0.0 && v.fract() == 0.0),
        ValueKind::Bool => matches!(raw, Scalar::Bool(_)),
    }
}

/// Parse a non-negative float, naming the field in the error.
pub fn parse_float<'a>(raw: impl Into<Scalar<'a>>, what: &'static str) -> VmResult<f64> {
    let raw = raw.into();
    let value = as_real(raw).ok_or_else(|| VmError::NotANumber {
        what,
        raw: describe(raw),
    })?;
    // NaN fails this comparison too
    if !(value >= 0.0) {
        return Err(VmError::Negative { what, value });
    }
    Ok(value)
}

/// Parse a non-negative integer. `"4.0"` is accepted, `"4.5"` is not.
pub fn parse_int<'a>(raw: impl Into<Scalar<'a>>, what: &'static str) -> VmResult<u32> {
    let value = parse_float(raw, what)?;
    if value.fract() != 0.0 {
        return Err(VmError::Fractional { what, value });
    }
    if value > f64::from(u32::MAX) {
        return Err(VmError::OutOfRange { what, value });
    }
    Ok(value as u32)
}

fn as_real(raw: Scalar<'_>) -> Option<f64> {
    match raw {
        Scalar::Text(text) => text.trim().parse::<f64>().ok(),
        Scalar::Number(value) => Some(value),
        Scalar::Bool(_) | Scalar::Null => None,
    }
}

fn describe(raw: Scalar<'_>) -> String {
    match raw {
        Scalar::Text(text) => text.to_string(),
        Scalar::Number(value) => value.to_string(),
        Scalar::Bool(value) => value.to_string(),
        Scalar::Null => "null".to_string(),
    }
}
