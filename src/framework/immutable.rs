//! # Immutable DTO Core
//!
//! Write-once DTOs declare their fields as [`WriteOnce`] slots. Construction
//! casts every known input key once and writes it straight into its slot;
//! setter overrides and prioritized ordering do not apply. A slot that the
//! input never mentioned stays empty and is left out of `to_array`.

use once_cell::sync::OnceCell;
use tracing::trace;

use super::cast::cast_value;
use super::dto::Dto;
use super::error::DtoError;
use super::object::Model;
use super::value::{Attributes, Value};

/// A field slot that accepts exactly one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOnce<T>(OnceCell<T>);

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WriteOnce<T> {
    pub fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.0.get().is_some()
    }

    /// Stores `value` unless the slot is already filled, in which case the
    /// value is handed back.
    pub fn set(&self, value: T) -> Result<(), T> {
        self.0.set(value)
    }
}

impl<T> From<T> for WriteOnce<T> {
    fn from(value: T) -> Self {
        Self(OnceCell::with_value(value))
    }
}

/// One-shot initialization of a write-once DTO.
pub(crate) fn initialize<D: Dto>(dto: &mut D, attributes: Attributes) -> Result<(), DtoError> {
    let schema = D::schema();
    for (key, value) in attributes {
        let Some(field) = schema.field_named(&key) else {
            trace!(dto = dto.model_name(), key = %key, "Ignoring undeclared attribute");
            continue;
        };
        let value = if value.is_null() {
            Value::Null
        } else {
            cast_value(&key, value, schema.casts(), schema.nested())?
        };
        field.write(dto, value)?;
    }
    Ok(())
}
