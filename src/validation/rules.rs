//! Typed validation rules.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::framework::DtoError;

/// A single rule, written in Laravel style as `name` or `name:arg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Nullable,
    Sometimes,
    String,
    Integer,
    Email,
    /// A list, collection or map. Also spelled `collection`.
    Array,
    Min(usize),
    Max(usize),
}

impl Rule {
    /// Rule name as used in message keys.
    pub fn key(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Nullable => "nullable",
            Rule::Sometimes => "sometimes",
            Rule::String => "string",
            Rule::Integer => "integer",
            Rule::Email => "email",
            Rule::Array => "array",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
        }
    }

    /// Rules that steer evaluation instead of checking the value.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Rule::Required | Rule::Nullable | Rule::Sometimes)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(n) | Rule::Max(n) => write!(f, "{}:{n}", self.key()),
            _ => f.write_str(self.key()),
        }
    }
}

impl FromStr for Rule {
    type Err = DtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.trim().split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s.trim(), None),
        };
        let size = |arg: Option<&str>| {
            arg.and_then(|a| a.trim().parse::<usize>().ok())
                .ok_or_else(|| DtoError::InvalidInput(format!("rule '{s}' needs a numeric argument")))
        };

        match name {
            "required" => Ok(Rule::Required),
            "nullable" => Ok(Rule::Nullable),
            "sometimes" => Ok(Rule::Sometimes),
            "string" => Ok(Rule::String),
            "integer" | "int" => Ok(Rule::Integer),
            "email" => Ok(Rule::Email),
            "array" | "collection" => Ok(Rule::Array),
            "min" => size(arg).map(Rule::Min),
            "max" => size(arg).map(Rule::Max),
            other => Err(DtoError::InvalidInput(format!("unknown validation rule '{other}'"))),
        }
    }
}

/// Field name to rules, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    fields: IndexMap<String, Vec<Rule>>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.insert(name.into(), rules.into_iter().collect());
        self
    }

    /// Adds a field from a pipe-separated spec such as `required|string|max:64`.
    pub fn parse_field(self, name: impl Into<String>, spec: &str) -> Result<Self, DtoError> {
        let rules = spec
            .split('|')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Rule>, _>>()?;
        Ok(self.field(name, rules))
    }

    pub fn get(&self, name: &str) -> Option<&[Rule]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
