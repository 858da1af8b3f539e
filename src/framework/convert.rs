//! Conversions between [`Value`] and typed DTO fields.
//!
//! Scalars coerce loosely (numeric strings become integers, numbers become
//! strings); shape mismatches fail with [`DtoError::InvalidInput`]. Sequence
//! fields treat `null` as empty, so an absent list and an empty list read the
//! same.

use std::ops::{Deref, Index};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::error::DtoError;
use super::object::{base_name, Model};
use super::value::Value;

/// Converts a typed field into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Converts a [`Value`] into a typed field.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, DtoError>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T, DtoError> {
    Err(DtoError::InvalidInput(format!(
        "expected {expected}, got {}",
        value.kind()
    )))
}

/// An ordered collection, the typed counterpart of [`Value::Collection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T>(Vec<T>);

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn first(&self) -> Option<&T> {
        self.0.first()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Collection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// --- ToValue ---

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<M: Model> ToValue for Arc<M> {
    fn to_value(&self) -> Value {
        Value::Model(self.clone())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Collection<T> {
    fn to_value(&self) -> Value {
        Value::Collection(self.iter().map(ToValue::to_value).collect())
    }
}

// --- FromValue ---

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Bool(b) => Ok(if b { "1".into() } else { String::new() }),
            other => mismatch("string", &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Float(f) if f.fract() == 0.0 => {
                if (i64::MIN as f64..i64::MAX as f64).contains(&f) {
                    Ok(f as i64)
                } else {
                    Err(DtoError::InvalidInput(format!("{f} is out of range")))
                }
            }
            Value::Bool(b) => Ok(i64::from(b)),
            Value::String(ref s) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) => mismatch("integer", &value),
            },
            other => mismatch("integer", &other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| DtoError::InvalidInput(format!("{wide} is out of range")))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        let wide = i64::from_value(value)?;
        u32::try_from(wide).map_err(|_| DtoError::InvalidInput(format!("{wide} is out of range")))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::String(ref s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(f),
                _ => mismatch("float", &value),
            },
            other => mismatch("float", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(i) => Ok(i != 0),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        parse_datetime(&value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<M: Model> FromValue for Arc<M> {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        match value {
            Value::Model(model) => {
                let found = model.model_name();
                model.into_any_arc().downcast::<M>().map_err(|_| {
                    DtoError::InvalidInput(format!(
                        "expected {}, got {found}",
                        base_name(std::any::type_name::<M>())
                    ))
                })
            }
            other => mismatch(base_name(std::any::type_name::<M>()), &other),
        }
    }
}

fn sequence<T: FromValue>(value: Value) -> Result<Vec<T>, DtoError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) | Value::Collection(items) => {
            items.into_iter().map(T::from_value).collect()
        }
        other => mismatch("sequence", &other),
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        sequence(value)
    }
}

impl<T: FromValue> FromValue for Collection<T> {
    fn from_value(value: Value) -> Result<Self, DtoError> {
        sequence(value).map(Collection)
    }
}

// --- Datetime parsing ---

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Reads a datetime from a datetime value, a unix timestamp, or a string.
pub(crate) fn parse_datetime(value: &Value) -> Result<DateTime<Utc>, DtoError> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
            .ok_or_else(|| DtoError::InvalidInput(format!("timestamp {secs} is out of range"))),
        Value::String(raw) => parse_datetime_str(raw),
        other => mismatch("date/time", other),
    }
}

fn parse_datetime_str(raw: &str) -> Result<DateTime<Utc>, DtoError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DtoError::InvalidInput(format!("could not parse '{raw}' as a date/time")))
}
