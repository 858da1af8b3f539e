use crate::framework::{Model, Value};

/// A plain object that is not a DTO. Assemblers can produce it, and records
/// can read its `foo` attribute, but it has no serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyModel {
    pub foo: String,
}

impl Model for LegacyModel {
    fn read_attribute(&self, key: &str) -> Option<Value> {
        match key {
            "foo" => Some(Value::from(self.foo.as_str())),
            _ => None,
        }
    }
}
