//! Write-once DTOs. Every field is filled during construction and can never
//! be assigned again.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::framework::{CastDirective, Collection, Dto, Schema, WriteOnce};
use crate::validation::{Rule, Rules};

use super::product::{ProductFeatureDto, ProductReviewDto};

static IMMUTABLE_USER_SCHEMA: Lazy<Schema<ImmutableUserDto>> = Lazy::new(|| {
    Schema::<ImmutableUserDto>::write_once()
        .once("firstName", |d| &d.first_name)
        .once("lastName", |d| &d.last_name)
        .once("username", |d| &d.username)
        .once("email", |d| &d.email)
        .once("registeredAt", |d| &d.registered_at)
        .cast("registeredAt", CastDirective::datetime())
});

/// Read-only counterpart of [`UserDto`](super::UserDto).
#[derive(Debug, Default)]
pub struct ImmutableUserDto {
    first_name: WriteOnce<Option<String>>,
    last_name: WriteOnce<Option<String>>,
    username: WriteOnce<String>,
    email: WriteOnce<String>,
    registered_at: WriteOnce<Option<DateTime<Utc>>>,
}

impl ImmutableUserDto {
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.get().and_then(|name| name.as_deref())
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.get().and_then(|name| name.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.email.get().map(String::as_str)
    }

    pub fn registered_at(&self) -> Option<&DateTime<Utc>> {
        self.registered_at.get().and_then(Option::as_ref)
    }
}

impl Dto for ImmutableUserDto {
    fn schema() -> &'static Schema<Self> {
        &IMMUTABLE_USER_SCHEMA
    }

    fn rules(&self) -> Option<Rules> {
        Some(
            Rules::new()
                .field("username", [Rule::Required, Rule::String, Rule::Max(64)])
                .field("email", [Rule::Required, Rule::Email, Rule::Max(255)]),
        )
    }
}

static IMMUTABLE_PRODUCT_SCHEMA: Lazy<Schema<ImmutableProductDto>> = Lazy::new(|| {
    Schema::<ImmutableProductDto>::write_once()
        .once("title", |d| &d.title)
        .once("features", |d| &d.features)
        .once("reviews", |d| &d.reviews)
        .once("user", |d| &d.user)
        .cast("features", CastDirective::array_of::<ProductFeatureDto>())
        .cast("reviews", CastDirective::collection_of::<ProductReviewDto>())
        .cast("user", CastDirective::single::<ImmutableUserDto>())
});

/// Read-only product. Unlike [`ProductDto`](super::ProductDto) the user is
/// built directly, without a nested assembler.
#[derive(Debug, Default)]
pub struct ImmutableProductDto {
    title: WriteOnce<String>,
    features: WriteOnce<Vec<Arc<ProductFeatureDto>>>,
    reviews: WriteOnce<Collection<Arc<ProductReviewDto>>>,
    user: WriteOnce<Option<Arc<ImmutableUserDto>>>,
}

impl ImmutableProductDto {
    pub fn title(&self) -> Option<&str> {
        self.title.get().map(String::as_str)
    }

    pub fn features(&self) -> &[Arc<ProductFeatureDto>] {
        self.features.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn reviews(&self) -> Option<&Collection<Arc<ProductReviewDto>>> {
        self.reviews.get()
    }

    pub fn user(&self) -> Option<&ImmutableUserDto> {
        self.user.get().and_then(Option::as_deref)
    }
}

impl Dto for ImmutableProductDto {
    fn schema() -> &'static Schema<Self> {
        &IMMUTABLE_PRODUCT_SCHEMA
    }

    fn rules(&self) -> Option<Rules> {
        Some(Rules::new().field("title", [Rule::Required, Rule::String]))
    }
}
