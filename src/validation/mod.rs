//! # Validation
//!
//! A small rule engine that DTOs hand their serialized fields to. It is built
//! once per process and shared; [`make_or_get_validator`] returns it.
//!
//! ## Evaluation
//!
//! For each field with declared rules:
//!
//! - `sometimes` skips the field when its key is absent.
//! - `required` fails on absent, `null`, `""` or an empty sequence, and stops
//!   further checks for that field.
//! - An absent field is only ever checked by `required`.
//! - `nullable` lets `null` through without further checks.
//! - Every other rule reports its own failure.
//!
//! Messages are the untranslated keys Laravel would look up, e.g.
//! `validation.email` or `validation.max.string`.

mod rules;

pub use rules::{Rule, Rules};

use once_cell::sync::Lazy;
use tracing::trace;
use validator::{ValidateEmail, ValidateLength};

use crate::framework::{Attributes, FieldErrors, Value};

static VALIDATOR: Lazy<ValidatorFactory> = Lazy::new(ValidatorFactory::new);

/// The process-wide validator, built on first use.
pub fn make_or_get_validator() -> &'static ValidatorFactory {
    &VALIDATOR
}

/// Result of one validation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    errors: FieldErrors,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// Evaluates [`Rules`] against a data map.
#[derive(Debug, Default)]
pub struct ValidatorFactory;

impl ValidatorFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, data: &Attributes, rules: &Rules) -> Verdict {
        let mut errors = FieldErrors::new();
        for (field, field_rules) in rules.iter() {
            let messages = self.check_field(data.get(field), field_rules);
            if !messages.is_empty() {
                trace!(field, ?messages, "Field failed validation");
                errors.insert(field.to_string(), messages);
            }
        }
        Verdict { errors }
    }

    fn check_field(&self, value: Option<&Value>, rules: &[Rule]) -> Vec<String> {
        let has = |rule: Rule| rules.contains(&rule);

        if value.is_none() && has(Rule::Sometimes) {
            return Vec::new();
        }
        if has(Rule::Required) && is_missing(value) {
            return vec![message(Rule::Required, None)];
        }
        let Some(value) = value else {
            return Vec::new();
        };
        if value.is_null() && has(Rule::Nullable) {
            return Vec::new();
        }

        rules
            .iter()
            .filter(|rule| !rule.is_modifier())
            .filter(|rule| !self.passes(**rule, value))
            .map(|rule| message(*rule, Some(value)))
            .collect()
    }

    fn passes(&self, rule: Rule, value: &Value) -> bool {
        match rule {
            Rule::Required | Rule::Nullable | Rule::Sometimes => true,
            Rule::String => matches!(value, Value::String(_)),
            Rule::Integer => match value {
                Value::Int(_) => true,
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Rule::Email => matches!(value, Value::String(s) if s.validate_email()),
            Rule::Array => matches!(value, Value::List(_) | Value::Collection(_) | Value::Map(_)),
            Rule::Min(min) => within(value, Some(min), None),
            Rule::Max(max) => within(value, None, Some(max)),
        }
    }
}

/// Size check: character length for strings, numeric value for numbers,
/// element count for sequences and maps.
fn within(value: &Value, min: Option<usize>, max: Option<usize>) -> bool {
    if let Value::String(s) = value {
        return s.validate_length(min.map(|n| n as u64), max.map(|n| n as u64), None);
    }
    let Some(size) = size(value) else {
        return false;
    };
    min.map_or(true, |min| size >= min as f64) && max.map_or(true, |max| size <= max as f64)
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::List(items)) | Some(Value::Collection(items)) => items.is_empty(),
        Some(Value::Map(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn size(value: &Value) -> Option<f64> {
    match value {
        Value::Int(_) | Value::Float(_) => value.as_f64(),
        Value::List(_) | Value::Collection(_) | Value::Map(_) => Some(value.len() as f64),
        _ => None,
    }
}

fn message(rule: Rule, value: Option<&Value>) -> String {
    let kind = match (rule, value) {
        (Rule::Min(_) | Rule::Max(_), Some(Value::String(_))) => ".string",
        (Rule::Min(_) | Rule::Max(_), Some(Value::Int(_) | Value::Float(_))) => ".numeric",
        (Rule::Min(_) | Rule::Max(_), Some(_)) => ".array",
        _ => "",
    };
    format!("validation.{}{kind}", rule.key())
}
