use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::framework::{CastDirective, Dto, DtoError, FromValue, Schema, Value};
use crate::validation::{Rule, Rules};

static USER_SCHEMA: Lazy<Schema<UserDto>> = Lazy::new(|| {
    Schema::<UserDto>::mutable()
        .field("firstName", |d| &d.first_name, |d| &mut d.first_name)
        .field("lastName", |d| &d.last_name, |d| &mut d.last_name)
        .field("username", |d| &d.username, |d| &mut d.username)
        .field("fullName", |d| &d.full_name, |d| &mut d.full_name)
        .field("email", |d| &d.email, |d| &mut d.email)
        .field("registeredAt", |d| &d.registered_at, |d| &mut d.registered_at)
        .cast("firstName", CastDirective::Scalar)
        .cast("lastName", CastDirective::Scalar)
        .cast("username", CastDirective::Scalar)
        .cast("email", CastDirective::Scalar)
        .cast("fullName", CastDirective::Scalar)
        .cast("registeredAt", CastDirective::datetime())
        .setter("firstName", UserDto::set_first_name)
        .setter("lastName", UserDto::set_last_name)
        .prioritized(&["firstName", "lastName"])
});

/// A registered user.
///
/// `fullName` is derived: the `firstName` and `lastName` setters recompute it,
/// and both names are assigned before any other attribute so an explicit
/// `fullName` in the input still wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub full_name: Option<String>,
    pub email: String,
    pub registered_at: Option<DateTime<Utc>>,
}

impl UserDto {
    fn set_first_name(&mut self, value: Value) -> Result<(), DtoError> {
        self.first_name = Option::<String>::from_value(value)?;
        self.refresh_full_name();
        Ok(())
    }

    fn set_last_name(&mut self, value: Value) -> Result<(), DtoError> {
        self.last_name = Option::<String>::from_value(value)?;
        self.refresh_full_name();
        Ok(())
    }

    fn refresh_full_name(&mut self) {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        self.full_name = Some(format!("{first} {last}"));
    }
}

impl Dto for UserDto {
    fn schema() -> &'static Schema<Self> {
        &USER_SCHEMA
    }

    fn rules(&self) -> Option<Rules> {
        Some(
            Rules::new()
                .field("firstName", [Rule::Nullable, Rule::String, Rule::Max(32)])
                .field("lastName", [Rule::Nullable, Rule::String, Rule::Max(32)])
                .field("username", [Rule::Required, Rule::String, Rule::Max(64)])
                .field("email", [Rule::Required, Rule::String, Rule::Email, Rule::Max(255)]),
        )
    }
}

static FULL_NAME_SCHEMA: Lazy<Schema<FullNameDto>> = Lazy::new(|| {
    Schema::<FullNameDto>::mutable().field("fullName", |d| &d.full_name, |d| &mut d.full_name)
});

/// Display name assembled from a user record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullNameDto {
    pub full_name: String,
}

impl Dto for FullNameDto {
    fn schema() -> &'static Schema<Self> {
        &FULL_NAME_SCHEMA
    }
}
