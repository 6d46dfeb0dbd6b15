//! Lenient parsing of raw JSON request fields.
//!
//! Fields are accepted as raw [`Value`]s, so a value of an unexpected JSON
//! type is reported as a field error rather than rejecting the whole body.

use std::str::FromStr as _;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::FieldErrors;

/// Message of a field not holding a string.
pub const INVALID_STRING: &str = "Not a valid string.";

/// Message of a field not holding an integer.
pub const INVALID_INTEGER: &str = "A valid integer is required.";

/// Message of a field not holding a number.
pub const INVALID_NUMBER: &str = "A valid number is required.";

/// Key of the errors not related to any particular field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Parses a string out of the provided [`Value`].
///
/// Numbers are accepted in their textual form.
#[must_use]
pub fn string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

/// Parses an integer out of the provided [`Value`].
///
/// Accepts integral numbers (`2`, `2.0`) and strings holding them (`"2"`).
#[expect(
    clippy::cast_possible_truncation,
    reason = "checked to be integral and in range"
)]
#[must_use]
pub fn integer(value: &Value) -> Option<i64> {
    /// Maximum magnitude of an [`f64`] holding an exact integer.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

/// Parses a [`Decimal`] out of the provided [`Value`], keeping the digits
/// exactly as written.
#[must_use]
pub fn decimal(value: &Value) -> Option<Decimal> {
    let parse = |s: &str| {
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
    };
    match value {
        Value::Number(n) => parse(&n.to_string()),
        Value::String(s) => parse(s.trim()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

impl FieldErrors {
    /// Parses the required string `field` out of its raw `value`, recording
    /// the error if it's missing or isn't a string.
    pub fn require_string(
        &mut self,
        field: &str,
        value: Option<Value>,
    ) -> Option<String> {
        self.require(field, value)
            .and_then(|v| self.check(field, string(v), INVALID_STRING))
    }

    /// Parses the required integer `field` out of its raw `value`, recording
    /// the error if it's missing or isn't an integer.
    pub fn require_integer(
        &mut self,
        field: &str,
        value: Option<Value>,
    ) -> Option<i64> {
        self.require(field, value)
            .and_then(|v| self.check(field, integer(&v), INVALID_INTEGER))
    }

    /// Parses the required decimal `field` out of its raw `value`, recording
    /// the error if it's missing or isn't a number.
    pub fn require_decimal(
        &mut self,
        field: &str,
        value: Option<Value>,
    ) -> Option<Decimal> {
        self.require(field, value)
            .and_then(|v| self.check(field, decimal(&v), INVALID_NUMBER))
    }
}
