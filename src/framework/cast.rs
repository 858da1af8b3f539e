//! # Value Caster
//!
//! Type-directed coercion of a single field value.
//!
//! A field may carry a [`CastDirective`] naming its target shape. When the same
//! field also has a [`NestedAssembler`] binding, structured items (maps and
//! objects) are first handed to that assembler and only then coerced by shape.
//! Scalars that reach a delegated field are left untouched.
//!
//! | Directive              | Input                | Output                       |
//! |------------------------|----------------------|------------------------------|
//! | `Scalar`               | anything             | unchanged                    |
//! | `SingleModel(T)`       | instance / map       | instance of `T`              |
//! | `ArrayOfModels(T)`     | list or collection   | `List` of `T`                |
//! | `CollectionOfModels(T)`| list or collection   | `Collection` of `T`          |
//!
//! `null` never reaches the caster; callers store it directly.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::assembler::Assembler;
use super::dto::Dto;
use super::error::DtoError;
use super::object::{ModelType, TypeKey};
use super::value::Value;

/// Per-field cast declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CastDirective {
    /// Primitive coercion only, done by the field's own type.
    Scalar,
    SingleModel(ModelType),
    ArrayOfModels(ModelType),
    CollectionOfModels(ModelType),
}

impl CastDirective {
    pub fn single<D: Dto>() -> Self {
        Self::SingleModel(ModelType::dto::<D>())
    }

    pub fn array_of<D: Dto>() -> Self {
        Self::ArrayOfModels(ModelType::dto::<D>())
    }

    pub fn collection_of<D: Dto>() -> Self {
        Self::CollectionOfModels(ModelType::dto::<D>())
    }

    /// Single datetime target.
    pub fn datetime() -> Self {
        Self::SingleModel(ModelType::datetime())
    }

    pub fn target(&self) -> Option<ModelType> {
        match self {
            Self::Scalar => None,
            Self::SingleModel(target) | Self::ArrayOfModels(target) | Self::CollectionOfModels(target) => {
                Some(*target)
            }
        }
    }

    /// Whether the directive casts a sequence of items.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::ArrayOfModels(_) | Self::CollectionOfModels(_))
    }
}

/// Field name to cast directive.
pub type CastTable = HashMap<&'static str, CastDirective>;

/// Field name to nested assembler binding.
pub type NestedAssemblerTable = HashMap<&'static str, NestedAssembler>;

/// An assembler bound to a field, erased to its generic `assemble` entry point.
#[derive(Clone, Copy)]
pub struct NestedAssembler {
    name: &'static str,
    assemble: fn(Value, TypeKey) -> Result<Value, DtoError>,
}

impl NestedAssembler {
    pub fn of<A: Assembler>() -> Self {
        Self {
            name: TypeKey::of::<A>().name(),
            assemble: assemble_with::<A>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn assemble(&self, input: Value, target: TypeKey) -> Result<Value, DtoError> {
        (self.assemble)(input, target)
    }
}

impl std::fmt::Debug for NestedAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NestedAssembler").field(&self.name).finish()
    }
}

fn assemble_with<A: Assembler>(input: Value, target: TypeKey) -> Result<Value, DtoError> {
    A::assemble_model(input, target, None).map(|model| Value::Model(Arc::from(model)))
}

/// Casts `value` for `field` according to the cast and nested-assembler tables.
pub fn cast_value(
    field: &str,
    value: Value,
    casts: &CastTable,
    nested: &NestedAssemblerTable,
) -> Result<Value, DtoError> {
    let Some(directive) = casts.get(field) else {
        return Ok(value);
    };
    let Some(target) = directive.target() else {
        return Ok(value);
    };

    match nested.get(field) {
        Some(assembler) if !target.is_datetime() => {
            debug!(
                field,
                assembler = assembler.name(),
                target = target.name(),
                "Delegating to nested assembler"
            );
            let value = delegate(assembler, target, directive.is_multi(), value)?;
            coerce(directive, value, true)
        }
        _ => coerce(directive, value, false),
    }
}

fn delegate(
    assembler: &NestedAssembler,
    target: ModelType,
    multi: bool,
    value: Value,
) -> Result<Value, DtoError> {
    let through = |item: Value| {
        if item.is_structured() {
            assembler.assemble(item, target.key())
        } else {
            Ok(item)
        }
    };

    if !multi {
        return through(value);
    }
    match value {
        Value::List(items) => items.into_iter().map(through).collect::<Result<_, _>>().map(Value::List),
        Value::Collection(items) => items
            .into_iter()
            .map(through)
            .collect::<Result<_, _>>()
            .map(Value::Collection),
        // Not iterable: left for the shape check below.
        other => Ok(other),
    }
}

fn coerce(directive: &CastDirective, value: Value, delegated: bool) -> Result<Value, DtoError> {
    let element = |target: ModelType, item: Value| {
        if delegated && !item.is_structured() {
            Ok(item)
        } else {
            target.instance_or_construct(item)
        }
    };

    match *directive {
        CastDirective::Scalar => Ok(value),
        CastDirective::SingleModel(target) => element(target, value),
        CastDirective::ArrayOfModels(target) => match value {
            Value::List(items) | Value::Collection(items) => items
                .into_iter()
                .map(|item| element(target, item))
                .collect::<Result<_, _>>()
                .map(Value::List),
            other => Err(DtoError::InvalidInput(format!(
                "value must be a sequence to cast to an array of {} (got {})",
                target.name(),
                other.kind()
            ))),
        },
        CastDirective::CollectionOfModels(target) => match value {
            Value::List(items) | Value::Collection(items) => items
                .into_iter()
                .map(|item| element(target, item))
                .collect::<Result<_, _>>()
                .map(Value::Collection),
            other => Err(DtoError::InvalidInput(format!(
                "value must be a sequence to cast to a collection (got {})",
                other.kind()
            ))),
        },
    }
}
