//! Errors raised by the mapping layer.
//!
//! Every fallible operation in the crate returns [`DtoError`]. The variants map
//! one to one onto the failure modes of assembly, casting, validation and
//! serialization; none of them are retried internally.

use indexmap::IndexMap;
use thiserror::Error;

/// Field name to validation messages, in rule declaration order.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Errors that can occur while assembling, casting, validating or serializing DTOs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DtoError {
    /// Neither `to<Target>` nor `from<Target>` is declared on the assembler.
    #[error("Missing method [{to_method}] or [{from_method}] for assembling to {target} on [{assembler}]")]
    MissingAssemblyMethod {
        to_method: String,
        from_method: String,
        target: String,
        assembler: String,
    },

    /// The resolved adapter method needs an assembler instance and none was supplied.
    #[error("Cannot call instance method {method} on [{assembler}] without an instance")]
    UnboundMethodCall { method: String, assembler: String },

    /// A value had the wrong shape for the cast or conversion applied to it.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The DTO type does not declare any validation rules.
    #[error("{dto} must implement a rules() method for validation")]
    MissingValidationRules { dto: String },

    /// Declared rules rejected the data.
    #[error("The given data was invalid ({} field(s) failed)", .0.len())]
    ValidationFailed(FieldErrors),

    /// The serialized form could not be encoded.
    #[error("JSON error: {0}")]
    SerializationError(String),

    /// A write-once field was written after initialization.
    #[error("Cannot modify readonly property {dto}::{field}")]
    ImmutableFieldViolation { dto: String, field: String },

    /// Domain error raised by an adapter method.
    #[error("Custom error: {0}")]
    Custom(String),
}

impl DtoError {
    /// Field messages carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DtoError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<String> for DtoError {
    fn from(msg: String) -> Self {
        DtoError::Custom(msg)
    }
}
