//! Object identity: the [`Model`] trait every assembly target implements, and
//! the type descriptors ([`TypeKey`], [`ModelType`]) used by cast directives
//! and the assembler registry.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::convert::parse_datetime;
use super::dto::Dto;
use super::error::DtoError;
use super::value::{Attributes, Value};

/// Upcasting helpers for downcasting trait objects back to concrete types.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn into_any_box(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn into_any_box(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

/// Any object an assembler can produce or a record can wrap.
///
/// Every [`Dto`] is a `Model`. Plain targets (see
/// [`LegacyModel`](crate::model::LegacyModel)) implement it by hand and keep
/// the defaults, which makes them opaque to serialization.
pub trait Model: AsAny + fmt::Debug {
    /// Base name of the concrete type.
    fn model_name(&self) -> &'static str {
        base_name(type_name::<Self>())
    }

    /// Serialized fields, or `None` when the object is not a DTO.
    fn to_output(&self, _depth: i32) -> Option<Attributes> {
        None
    }

    /// Reads a named field so the object can be used as an assembly record.
    fn read_attribute(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Last path segment of a type name (`argonaut::model::UserDto` -> `UserDto`).
pub fn base_name(full: &'static str) -> &'static str {
    full.split("::").last().unwrap_or("Unknown")
}

/// Identity of a Rust type plus the base name used for method conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: base_name(type_name::<T>()),
        }
    }

    /// Same identity as [`TypeKey::of`] with an explicit display name.
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A concrete cast target: how to recognise an instance and how to build one.
#[derive(Clone, Copy)]
pub struct ModelType {
    key: TypeKey,
    is_instance: fn(&Value) -> bool,
    construct: fn(Value) -> Result<Value, DtoError>,
}

impl ModelType {
    /// A DTO target, constructed from an attribute map.
    pub fn dto<D: Dto>() -> Self {
        Self {
            key: TypeKey::of::<D>(),
            is_instance: is_instance_of::<D>,
            construct: construct_dto::<D>,
        }
    }

    /// The canonical datetime wrapper, built from strings, timestamps or datetimes.
    pub fn datetime() -> Self {
        Self {
            key: TypeKey::named::<DateTime<Utc>>("DateTime"),
            is_instance: |value| matches!(value, Value::DateTime(_)),
            construct: |value| parse_datetime(&value).map(Value::DateTime),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    pub fn is_datetime(&self) -> bool {
        self.key.id() == TypeId::of::<DateTime<Utc>>()
    }

    pub fn is_instance(&self, value: &Value) -> bool {
        (self.is_instance)(value)
    }

    pub fn construct(&self, value: Value) -> Result<Value, DtoError> {
        (self.construct)(value)
    }

    /// Keeps existing instances, constructs everything else.
    pub fn instance_or_construct(&self, value: Value) -> Result<Value, DtoError> {
        if self.is_instance(&value) {
            Ok(value)
        } else {
            self.construct(value)
        }
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.key.name()).finish()
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

fn is_instance_of<T: Any>(value: &Value) -> bool {
    value.as_model().is_some_and(|model| model.as_any().is::<T>())
}

fn construct_dto<D: Dto>(value: Value) -> Result<Value, DtoError> {
    match value {
        Value::Map(attributes) => D::new(attributes).map(Value::model),
        other => Err(DtoError::InvalidInput(format!(
            "cannot construct {} from {}",
            TypeKey::of::<D>().name(),
            other.kind()
        ))),
    }
}
