//! # Dynamic Values
//!
//! Loosely-typed input arrives as [`Value`]s: scalars, ordered sequences,
//! associative maps, collections, and already-built objects. Casting turns them
//! into richer values, and serialization turns object graphs back into plain
//! maps.
//!
//! `List` and `Collection` are both ordered sequences. They are kept apart
//! because a cast directive decides which one a field ends up holding, and the
//! typed field accessors check for it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, Serializer};

use super::dto::DEFAULT_DEPTH;
use super::object::Model;

/// Insertion-ordered attribute map. The order is the "natural order" used
/// when assigning attributes.
pub type Attributes = IndexMap<String, Value>;

/// Builds an [`Attributes`] map from key/value pairs.
pub fn attributes<K, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// A loosely-typed value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Associative map.
    Map(Attributes),
    /// Ordered collection produced by a collection cast.
    Collection(Vec<Value>),
    /// A constructed object (DTO or any other assembly target).
    Model(Arc<dyn Model>),
    /// A raw resource handle. Never encodable.
    Handle(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps an object.
    pub fn model<M: Model>(model: M) -> Value {
        Value::Model(Arc::new(model))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Maps and objects are "structured"; they can feed an assembler or a constructor.
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Model(_))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Collection(_) => "collection",
            Value::Model(_) => "object",
            Value::Handle(_) => "resource",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Elements of a list or collection.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&dyn Model> {
        match self {
            Value::Model(model) => Some(model.as_ref()),
            _ => None,
        }
    }

    /// Borrows the wrapped object as a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_model()?.as_any().downcast_ref::<T>()
    }

    /// Looks up a key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Number of elements in a sequence or map.
    pub fn len(&self) -> usize {
        match self {
            Value::List(items) | Value::Collection(items) => items.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::DateTime(dt) => write!(f, "DateTime({dt})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Collection(items) => f.debug_tuple("Collection").field(items).finish(),
            Value::Model(model) => f.debug_tuple("Model").field(model).finish(),
            Value::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Model(a), Value::Model(b)) => Arc::ptr_eq(a, b),
            (Value::Handle(a), Value::Handle(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if !f.is_finite() => Err(S::Error::custom("Inf and NaN cannot be JSON encoded")),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            Value::List(items) | Value::Collection(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
            Value::Model(model) => match model.to_output(DEFAULT_DEPTH) {
                Some(fields) => serializer.collect_map(&fields),
                None => Err(S::Error::custom(format!(
                    "Object of class {} is not serializable",
                    model.model_name()
                ))),
            },
            Value::Handle(_) => Err(S::Error::custom("Type is not supported")),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Attributes> for Value {
    fn from(map: Attributes) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_keep_key_order() {
        let value = Value::from(json!({"zeta": 1, "alpha": 2, "mid": [1, "two"]}));
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(value.get("mid").unwrap().len(), 2);
    }

    #[test]
    fn int_and_float_compare_numerically() {
        assert_eq!(Value::Int(5), Value::Float(5.0));
        assert_ne!(Value::Int(5), Value::String("5".into()));
    }

    #[test]
    fn handles_refuse_to_serialize() {
        let value = Value::Map(attributes([("bad", Value::Handle(Arc::new(7_u8)))]));
        let err = serde_json::to_string(&value).unwrap_err();
        assert!(err.to_string().contains("Type is not supported"));
    }

    #[test]
    fn datetimes_serialize_as_rfc3339() {
        let dt = DateTime::from_timestamp(1_672_531_200, 0).unwrap();
        let json = serde_json::to_string(&Value::DateTime(dt)).unwrap();
        assert_eq!(json, "\"2023-01-01T00:00:00.000000Z\"");
    }
}
