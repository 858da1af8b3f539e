//! # DTO Core
//!
//! The [`Dto`] trait carries every DTO operation as a provided method; a DTO
//! type only supplies its [`Schema`] and, optionally, validation [`Rules`].
//!
//! ## Attribute assignment
//!
//! [`Dto::set_attributes`] assigns the schema's prioritized fields first (in
//! declared order, removing them from the input) and then everything else in
//! the input's natural order. Each key goes through [`Dto::set_attribute`]:
//!
//! 1. a setter override receives the raw value;
//! 2. otherwise a declared field receives `null` or the cast value;
//! 3. otherwise the key is ignored.
//!
//! Write-once DTOs skip all of this. They are filled once by
//! [`Dto::new`] and reject every later assignment.
//!
//! ## Serialization and validation
//!
//! [`Dto::to_array`] walks the object graph with a depth bound (see
//! [`serialization`](super::serialization)). [`Dto::validate`] feeds
//! `to_array(DEFAULT_DEPTH)` and the declared rules to the process-wide
//! validator.

use std::fmt::Debug;

use tracing::{debug, trace};

use super::cast::cast_value;
use super::convert::Collection;
use super::error::{DtoError, FieldErrors};
use super::immutable;
use super::object::Model;
use super::schema::{Mutability, Schema};
use super::serialization::{self, JsonOptions};
use super::value::{Attributes, Value};
use crate::validation::{make_or_get_validator, Rules};

/// Depth used by `to_json`, `validate` and nested object serialization.
pub const DEFAULT_DEPTH: i32 = 3;

/// Outcome of a non-throwing validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Passed,
    Failed(FieldErrors),
}

impl Validation {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Passed => None,
            Self::Failed(errors) => Some(errors),
        }
    }
}

/// A typed data-transfer object.
pub trait Dto: Default + Debug + Send + Sync + 'static {
    /// Field, cast, setter and priority declarations for this type.
    fn schema() -> &'static Schema<Self>;

    /// Validation rules. `None` means the type cannot be validated.
    fn rules(&self) -> Option<Rules> {
        None
    }

    /// Builds a DTO from raw attributes.
    fn new(attributes: Attributes) -> Result<Self, DtoError> {
        let mut dto = Self::default();
        match Self::schema().mutability() {
            Mutability::Mutable => {
                dto.set_attributes(attributes)?;
            }
            Mutability::WriteOnce => immutable::initialize(&mut dto, attributes)?,
        }
        Ok(dto)
    }

    /// Builds a DTO from a JSON object.
    fn from_json(json: serde_json::Value) -> Result<Self, DtoError> {
        match Value::from(json) {
            Value::Map(attributes) => Self::new(attributes),
            other => Err(DtoError::InvalidInput(format!(
                "expected a JSON object, got {}",
                other.kind()
            ))),
        }
    }

    /// One DTO per item, in order. Every item must be a map.
    fn collection<I>(items: I) -> Result<Collection<Self>, DtoError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        items
            .into_iter()
            .map(|item| match item.into() {
                Value::Map(attributes) => Self::new(attributes),
                other => Err(DtoError::InvalidInput(format!(
                    "collection items must be maps, got {}",
                    other.kind()
                ))),
            })
            .collect()
    }

    /// Casts `value` as the schema would for `key`. Setter overrides use this
    /// when they want the declared cast applied.
    fn cast_attribute(key: &str, value: Value) -> Result<Value, DtoError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let schema = Self::schema();
        cast_value(key, value, schema.casts(), schema.nested())
    }

    fn set_attributes(&mut self, mut attributes: Attributes) -> Result<&mut Self, DtoError> {
        for key in Self::schema().prioritized_names() {
            if let Some(value) = attributes.shift_remove(*key) {
                self.set_attribute(key, value)?;
            }
        }
        for (key, value) in attributes {
            self.set_attribute(&key, value)?;
        }
        Ok(self)
    }

    fn set_attribute(&mut self, key: &str, value: Value) -> Result<&mut Self, DtoError> {
        let schema = Self::schema();
        if schema.mutability() == Mutability::WriteOnce {
            return Err(DtoError::ImmutableFieldViolation {
                dto: self.model_name().to_string(),
                field: key.to_string(),
            });
        }

        if let Some(setter) = schema.setter_for(key) {
            trace!(dto = self.model_name(), key, "Calling setter override");
            setter(self, value)?;
        } else if let Some(field) = schema.field_named(key) {
            let value = Self::cast_attribute(key, value)?;
            field.write(self, value)?;
        } else {
            trace!(dto = self.model_name(), key, "Ignoring undeclared attribute");
        }
        Ok(self)
    }

    /// Current field values without output casting.
    fn attributes_to_update(&self) -> Attributes {
        Self::schema()
            .fields()
            .filter_map(|field| Some((field.name().to_string(), field.read(self)?)))
            .collect()
    }

    /// Plain-map view of the object graph, `depth` DTO levels deep.
    fn to_array(&self, depth: i32) -> Attributes {
        serialization::to_array(self, depth)
    }

    fn to_json(&self, options: JsonOptions) -> Result<String, DtoError> {
        serialization::to_json(&self.to_array(DEFAULT_DEPTH), options)
    }

    /// Runs the declared rules against `to_array(DEFAULT_DEPTH)`.
    ///
    /// With `throw_on_failure` a failure is [`DtoError::ValidationFailed`];
    /// without it the field errors come back as [`Validation::Failed`].
    fn validate(&self, throw_on_failure: bool) -> Result<Validation, DtoError> {
        let rules = self.rules().ok_or_else(|| DtoError::MissingValidationRules {
            dto: self.model_name().to_string(),
        })?;

        let verdict = make_or_get_validator().validate(&self.to_array(DEFAULT_DEPTH), &rules);
        if verdict.passed() {
            return Ok(Validation::Passed);
        }

        let errors = verdict.into_errors();
        debug!(dto = self.model_name(), failed = errors.len(), "Validation failed");
        if throw_on_failure {
            Err(DtoError::ValidationFailed(errors))
        } else {
            Ok(Validation::Failed(errors))
        }
    }

    /// `validate` reduced to a bool. Without `throw_on_failure` every error
    /// becomes `false`; with it, errors propagate.
    fn is_valid(&self, throw_on_failure: bool) -> Result<bool, DtoError> {
        match self.validate(throw_on_failure) {
            Ok(validation) => Ok(validation.passed()),
            Err(_) if !throw_on_failure => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl<D: Dto> Model for D {
    fn to_output(&self, depth: i32) -> Option<Attributes> {
        Some(self.to_array(depth))
    }

    fn read_attribute(&self, key: &str) -> Option<Value> {
        D::schema().field_named(key)?.read(self)
    }
}
