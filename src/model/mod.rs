//! Sample data-transfer objects.
//!
//! These types exercise every part of the engine: setter overrides and
//! prioritized assignment ([`UserDto`]), nested model casts and nested
//! assemblers ([`ProductDto`]), self-referencing collections
//! ([`ProductFeatureDto`]), write-once fields ([`ImmutableUserDto`],
//! [`ImmutableProductDto`]) and a plain non-DTO assembly target
//! ([`LegacyModel`]).

pub mod immutable;
pub mod legacy;
pub mod product;
pub mod user;

pub use immutable::*;
pub use legacy::*;
pub use product::*;
pub use user::*;
