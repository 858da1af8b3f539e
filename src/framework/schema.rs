//! # Schemas
//!
//! A [`Schema`] is the per-type declaration a DTO hands to the engine: its
//! fields in declaration order, cast directives, nested-assembler bindings,
//! setter overrides and prioritized attributes. Each DTO type builds one schema
//! lazily and keeps it for the life of the process.
//!
//! ```rust,ignore
//! static SCHEMA: Lazy<Schema<UserDto>> = Lazy::new(|| {
//!     Schema::<UserDto>::mutable()
//!         .field("firstName", |d| &d.first_name, |d| &mut d.first_name)
//!         .field("registeredAt", |d| &d.registered_at, |d| &mut d.registered_at)
//!         .cast("registeredAt", CastDirective::datetime())
//!         .setter("firstName", UserDto::set_first_name)
//!         .prioritized(&["firstName", "lastName"])
//! });
//! ```
//!
//! The bookkeeping tables live here and never on the DTO itself, so they can
//! never leak into serialized output.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::assembler::Assembler;
use super::cast::{CastDirective, CastTable, NestedAssembler, NestedAssemblerTable};
use super::convert::{FromValue, ToValue};
use super::error::DtoError;
use super::immutable::WriteOnce;
use super::object::base_name;
use super::value::Value;

type Reader<D> = Box<dyn Fn(&D) -> Option<Value> + Send + Sync>;
type Writer<D> = Box<dyn Fn(&mut D, Value) -> Result<(), DtoError> + Send + Sync>;

/// Setter override, called with the raw (uncast) value.
pub type Setter<D> = fn(&mut D, Value) -> Result<(), DtoError>;

/// How fields of a DTO type may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Fields are assigned through `set_attribute` and may be reassigned.
    Mutable,
    /// Fields are written once during initialization.
    WriteOnce,
}

/// A declared field with type-erased accessors.
pub struct Field<D> {
    name: &'static str,
    read: Reader<D>,
    write: Writer<D>,
}

impl<D> Field<D> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value, or `None` while a write-once slot is still empty.
    pub fn read(&self, dto: &D) -> Option<Value> {
        (self.read)(dto)
    }

    /// Stores an already cast value. `Null` resets the field to its zero value.
    pub fn write(&self, dto: &mut D, value: Value) -> Result<(), DtoError> {
        (self.write)(dto, value)
    }
}

/// Declarations for one DTO type.
pub struct Schema<D> {
    mutability: Mutability,
    fields: IndexMap<&'static str, Field<D>>,
    casts: CastTable,
    nested: NestedAssemblerTable,
    setters: HashMap<&'static str, Setter<D>>,
    prioritized: Vec<&'static str>,
}

impl<D: 'static> Schema<D> {
    fn with(mutability: Mutability) -> Self {
        Self {
            mutability,
            fields: IndexMap::new(),
            casts: HashMap::new(),
            nested: HashMap::new(),
            setters: HashMap::new(),
            prioritized: Vec::new(),
        }
    }

    /// Schema for a mutable DTO.
    pub fn mutable() -> Self {
        Self::with(Mutability::Mutable)
    }

    /// Schema for a write-once DTO.
    pub fn write_once() -> Self {
        Self::with(Mutability::WriteOnce)
    }

    /// Declares a plain field.
    pub fn field<T>(mut self, name: &'static str, get: fn(&D) -> &T, get_mut: fn(&mut D) -> &mut T) -> Self
    where
        T: ToValue + FromValue + Default + 'static,
    {
        let field = Field {
            name,
            read: Box::new(move |dto: &D| Some(get(dto).to_value())),
            write: Box::new(move |dto: &mut D, value: Value| {
                *get_mut(dto) = zero_or_convert(value)?;
                Ok(())
            }),
        };
        self.fields.insert(name, field);
        self
    }

    /// Declares a write-once field. A second write fails with
    /// [`DtoError::ImmutableFieldViolation`].
    pub fn once<T>(mut self, name: &'static str, slot: fn(&D) -> &WriteOnce<T>) -> Self
    where
        T: ToValue + FromValue + Default + Send + Sync + 'static,
    {
        let field = Field {
            name,
            read: Box::new(move |dto: &D| slot(dto).get().map(ToValue::to_value)),
            write: Box::new(move |dto: &mut D, value: Value| {
                slot(dto).set(zero_or_convert(value)?).map_err(|_| DtoError::ImmutableFieldViolation {
                    dto: base_name(std::any::type_name::<D>()).to_string(),
                    field: name.to_string(),
                })
            }),
        };
        self.fields.insert(name, field);
        self
    }

    pub fn cast(mut self, name: &'static str, directive: CastDirective) -> Self {
        self.casts.insert(name, directive);
        self
    }

    /// Routes construction of the field's nested models through assembler `A`.
    pub fn nested_assembler<A: Assembler>(mut self, name: &'static str) -> Self {
        self.nested.insert(name, NestedAssembler::of::<A>());
        self
    }

    pub fn setter(mut self, name: &'static str, setter: Setter<D>) -> Self {
        self.setters.insert(name, setter);
        self
    }

    /// Fields assigned before all others, in the given order.
    pub fn prioritized(mut self, names: &[&'static str]) -> Self {
        self.prioritized = names.to_vec();
        self
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field<D>> {
        self.fields.values()
    }

    pub fn field_named(&self, name: &str) -> Option<&Field<D>> {
        self.fields.get(name)
    }

    pub fn casts(&self) -> &CastTable {
        &self.casts
    }

    pub fn nested(&self) -> &NestedAssemblerTable {
        &self.nested
    }

    pub fn setter_for(&self, name: &str) -> Option<Setter<D>> {
        self.setters.get(name).copied()
    }

    pub fn prioritized_names(&self) -> &[&'static str] {
        &self.prioritized
    }
}

fn zero_or_convert<T: FromValue + Default>(value: Value) -> Result<T, DtoError> {
    match value {
        Value::Null => Ok(T::default()),
        other => T::from_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Point {
        x: i64,
        label: Option<String>,
        tag: WriteOnce<String>,
    }

    fn schema() -> Schema<Point> {
        Schema::<Point>::mutable()
            .field("x", |p| &p.x, |p| &mut p.x)
            .field("label", |p| &p.label, |p| &mut p.label)
            .once("tag", |p| &p.tag)
            .prioritized(&["label"])
    }

    #[test]
    fn fields_keep_declaration_order() {
        let schema = schema();
        let names: Vec<_> = schema.fields().map(Field::name).collect();
        assert_eq!(names, ["x", "label", "tag"]);
        assert_eq!(schema.prioritized_names(), ["label"]);
    }

    #[test]
    fn null_resets_to_zero_value() {
        let schema = schema();
        let mut point = Point { x: 9, ..Point::default() };
        let x = schema.field_named("x").unwrap();
        x.write(&mut point, Value::Null).unwrap();
        assert_eq!(point.x, 0);
        x.write(&mut point, Value::from("42")).unwrap();
        assert_eq!(x.read(&point), Some(Value::Int(42)));
    }

    #[test]
    fn once_fields_reject_second_write() {
        let schema = schema();
        let mut point = Point::default();
        let tag = schema.field_named("tag").unwrap();
        assert_eq!(tag.read(&point), None);
        tag.write(&mut point, Value::from("a")).unwrap();
        let err = tag.write(&mut point, Value::from("b")).unwrap_err();
        assert_eq!(
            err,
            DtoError::ImmutableFieldViolation {
                dto: "Point".into(),
                field: "tag".into()
            }
        );
        assert_eq!(point.tag.get().map(String::as_str), Some("a"));
    }
}
