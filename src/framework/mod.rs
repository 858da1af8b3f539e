//! The object-mapping engine.
//!
//! This module provides the building blocks for turning loosely-typed input
//! into typed DTOs and back.
//!
//! # Main Components
//!
//! - [`Value`] - Dynamic input and output values
//! - [`Schema`] - Per-type field, cast, setter and priority declarations
//! - [`cast_value`] - The Value Caster with nested assembler delegation
//! - [`resolve_cached`] - Convention-based method resolution with a process-wide cache
//! - [`Assembler`] - Adapter-method assembly of single values and sequences
//! - [`Dto`] - Attribute assignment, serialization and validation
//! - [`WriteOnce`] - Write-once slots for immutable DTOs
//! - [`DtoError`] - Errors raised by all of the above

pub mod assembler;
pub mod cast;
pub mod convert;
pub mod dto;
pub mod error;
pub mod immutable;
pub mod object;
pub mod resolver;
pub mod schema;
pub mod serialization;
pub mod value;

// Re-export core types for convenience
pub use assembler::{AdapterMethod, Assembler, Direction, MethodTable, Record};
pub use cast::{cast_value, CastDirective, CastTable, NestedAssembler, NestedAssemblerTable};
pub use convert::{Collection, FromValue, ToValue};
pub use dto::{Dto, Validation, DEFAULT_DEPTH};
pub use error::{DtoError, FieldErrors};
pub use immutable::WriteOnce;
pub use object::{base_name, AsAny, Model, ModelType, TypeKey};
pub use resolver::{method_cache, resolve, resolve_cached, MethodCache};
pub use schema::{Field, Mutability, Schema, Setter};
pub use serialization::{cast_output_value, JsonOptions};
pub use value::{attributes, Attributes, Value};
