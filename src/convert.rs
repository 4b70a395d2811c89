//! Scalar coercion
//!
//! Converts loosely typed values (dictionary default values, values supplied
//! to the message factory) into the representation of a [`FieldType`].
//! Numbers outside the target range and unparsable strings are errors; null
//! passes through unchanged.
//!
//! Canonical forms: integers and floats as JSON numbers, decimals as JSON
//! numbers or (when given as text) as the validated text itself so no
//! precision is lost, dates/times as ISO-8601 strings, byte arrays as arrays
//! of numbers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

use crate::error::{DictionaryError, Result};
use crate::node::FieldType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("decimal pattern is valid")
    })
}

/// Convert a single value to the given type
pub fn convert(value: &Value, target: FieldType) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match target {
        FieldType::Boolean => to_boolean(value),
        FieldType::Byte => to_integer(value, target, i8::MIN as i64, i8::MAX as i64),
        FieldType::Short => to_integer(value, target, i16::MIN as i64, i16::MAX as i64),
        FieldType::Integer => to_integer(value, target, i32::MIN as i64, i32::MAX as i64),
        FieldType::Long => to_integer(value, target, i64::MIN, i64::MAX),
        FieldType::Float => to_float(value, target, f32::MAX as f64),
        FieldType::Double => to_float(value, target, f64::MAX),
        FieldType::Decimal => to_decimal(value),
        FieldType::Char => to_char(value),
        FieldType::String => Ok(Value::String(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        FieldType::Date => to_temporal(value, target, |s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT).map(|d| d.format(DATE_FORMAT).to_string())
        }),
        FieldType::Time => to_temporal(value, target, |s| {
            NaiveTime::parse_from_str(s, TIME_FORMAT).map(|t| t.format(TIME_FORMAT).to_string())
        }),
        FieldType::DateTime => to_temporal(value, target, |s| {
            NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        }),
        FieldType::ByteArray => to_bytes(value),
    }
}

/// Convert every element of a sequence, failing on the first bad element
pub fn convert_all<'a>(values: impl IntoIterator<Item = &'a Value>, target: FieldType) -> Result<Vec<Value>> {
    values.into_iter().map(|v| convert(v, target)).collect()
}

fn error(value: &Value, target: FieldType, reason: impl Into<String>) -> DictionaryError {
    DictionaryError::Conversion {
        value: value.to_string(),
        target,
        reason: reason.into(),
    }
}

fn to_boolean(value: &Value) -> Result<Value> {
    let b = match value {
        Value::Bool(b) => *b,
        Value::Number(n) if n.as_i64() == Some(0) => false,
        Value::Number(n) if n.as_i64() == Some(1) => true,
        Value::String(s) if s.eq_ignore_ascii_case("true") || s == "1" => true,
        Value::String(s) if s.eq_ignore_ascii_case("false") || s == "0" => false,
        _ => return Err(error(value, FieldType::Boolean, "not a boolean")),
    };
    Ok(Value::Bool(b))
}

fn to_integer(value: &Value, target: FieldType, min: i64, max: i64) -> Result<Value> {
    let n: i64 = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => f as i64,
            _ => return Err(error(value, target, "not an integral number")),
        },
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| error(value, target, e.to_string()))?,
        _ => return Err(error(value, target, "not a number")),
    };

    if n < min || n > max {
        return Err(error(value, target, format!("out of range [{}, {}]", min, max)));
    }
    Ok(Value::Number(n.into()))
}

fn to_float(value: &Value, target: FieldType, max: f64) -> Result<Value> {
    let f: f64 = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| error(value, target, "not a number"))?,
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|e: std::num::ParseFloatError| error(value, target, e.to_string()))?,
        _ => return Err(error(value, target, "not a number")),
    };

    if !f.is_finite() || f.abs() > max {
        return Err(error(value, target, "out of range"));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| error(value, target, "not representable"))
}

fn to_decimal(value: &Value) -> Result<Value> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) if decimal_pattern().is_match(s.trim()) => Ok(Value::String(s.trim().to_string())),
        _ => Err(error(value, FieldType::Decimal, "not a decimal number")),
    }
}

fn to_char(value: &Value) -> Result<Value> {
    let c = match value {
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(error(value, FieldType::Char, "expected exactly one character")),
            }
        }
        Value::Number(n) => n
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32)
            .ok_or_else(|| error(value, FieldType::Char, "not a character code"))?,
        _ => return Err(error(value, FieldType::Char, "not a character")),
    };
    Ok(Value::String(c.to_string()))
}

fn to_temporal<F>(value: &Value, target: FieldType, parse: F) -> Result<Value>
where
    F: Fn(&str) -> std::result::Result<String, chrono::ParseError>,
{
    match value {
        Value::String(s) => parse(s.trim())
            .map(Value::String)
            .map_err(|e| error(value, target, e.to_string())),
        _ => Err(error(value, target, "expected an ISO-8601 string")),
    }
}

fn to_bytes(value: &Value) -> Result<Value> {
    let bytes: Vec<u8> = match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| error(value, FieldType::ByteArray, "byte out of range"))
            })
            .collect::<Result<_>>()?,
        _ => return Err(error(value, FieldType::ByteArray, "expected a string or byte list")),
    };
    Ok(Value::Array(bytes.into_iter().map(|b| Value::Number(b.into())).collect()))
}
