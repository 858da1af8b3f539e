use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::assemblers::UserDtoAssembler;
use crate::framework::{CastDirective, Collection, Dto, Schema};
use crate::validation::{Rule, Rules};

use super::user::UserDto;

// =============================================================================
// PRODUCT
// =============================================================================

static PRODUCT_SCHEMA: Lazy<Schema<ProductDto>> = Lazy::new(|| {
    Schema::<ProductDto>::mutable()
        .field("title", |d| &d.title, |d| &mut d.title)
        .field("features", |d| &d.features, |d| &mut d.features)
        .field("reviews", |d| &d.reviews, |d| &mut d.reviews)
        .field("user", |d| &d.user, |d| &mut d.user)
        .cast("features", CastDirective::array_of::<ProductFeatureDto>())
        .cast("reviews", CastDirective::collection_of::<ProductReviewDto>())
        .cast("user", CastDirective::single::<UserDto>())
        .nested_assembler::<UserDtoAssembler>("user")
});

/// A product with its features, reviews and owning user.
///
/// `user` maps go through [`UserDtoAssembler`] rather than the `UserDto`
/// constructor, so they are expected in the assembler's input shape
/// (`display_name`, `first_name`, ...).
#[derive(Debug, Clone, Default)]
pub struct ProductDto {
    pub title: String,
    pub features: Vec<Arc<ProductFeatureDto>>,
    pub reviews: Collection<Arc<ProductReviewDto>>,
    pub user: Option<Arc<UserDto>>,
}

impl Dto for ProductDto {
    fn schema() -> &'static Schema<Self> {
        &PRODUCT_SCHEMA
    }

    fn rules(&self) -> Option<Rules> {
        Some(
            Rules::new()
                .field("title", [Rule::Required, Rule::String])
                .field("reviews", [Rule::Sometimes, Rule::Required, Rule::Array, Rule::Min(1)]),
        )
    }
}

// =============================================================================
// FEATURES AND REVIEWS
// =============================================================================

static FEATURE_SCHEMA: Lazy<Schema<ProductFeatureDto>> = Lazy::new(|| {
    Schema::<ProductFeatureDto>::mutable()
        .field("name", |d| &d.name, |d| &mut d.name)
        .field("description", |d| &d.description, |d| &mut d.description)
        .field("subFeatures", |d| &d.sub_features, |d| &mut d.sub_features)
        .cast("subFeatures", CastDirective::collection_of::<ProductFeatureDto>())
});

/// A product feature. Features nest through `subFeatures`.
#[derive(Debug, Clone, Default)]
pub struct ProductFeatureDto {
    pub name: String,
    pub description: Option<String>,
    pub sub_features: Option<Collection<Arc<ProductFeatureDto>>>,
}

impl Dto for ProductFeatureDto {
    fn schema() -> &'static Schema<Self> {
        &FEATURE_SCHEMA
    }
}

static REVIEW_SCHEMA: Lazy<Schema<ProductReviewDto>> = Lazy::new(|| {
    Schema::<ProductReviewDto>::mutable()
        .field("displayName", |d| &d.display_name, |d| &mut d.display_name)
        .field("rating", |d| &d.rating, |d| &mut d.rating)
        .field("comment", |d| &d.comment, |d| &mut d.comment)
        .field("createdAt", |d| &d.created_at, |d| &mut d.created_at)
        .cast("displayName", CastDirective::Scalar)
        .cast("rating", CastDirective::Scalar)
        .cast("comment", CastDirective::Scalar)
        .cast("createdAt", CastDirective::datetime())
});

#[derive(Debug, Clone, Default)]
pub struct ProductReviewDto {
    pub display_name: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Dto for ProductReviewDto {
    fn schema() -> &'static Schema<Self> {
        &REVIEW_SCHEMA
    }
}
