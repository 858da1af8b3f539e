#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Argonaut DTO
//!
//! > **Typed data-transfer objects assembled from loosely-typed input.**
//!
//! Request payloads, decoded JSON and rows from other layers arrive as maps of
//! loosely-typed values. This crate turns them into typed DTOs, validates them,
//! and serializes them back, with a small amount of per-type declaration.
//!
//! ## Core Concepts
//!
//! ### DTOs declare, the engine does the rest
//! A DTO is a plain struct plus a lazily built [`Schema`](framework::Schema):
//! its fields, which of them are cast to nested models or datetimes, which
//! have setter overrides, and which must be assigned first. Every operation
//! (`new`, `set_attributes`, `to_array`, `to_json`, `validate`) is a provided
//! method of the [`Dto`](framework::Dto) trait.
//!
//! ### Assemblers adapt foreign shapes
//! An [`Assembler`](framework::Assembler) registers adapter methods named by
//! convention (`toUserDto`, `fromUserDto`). Resolution goes through a
//! process-wide cache keyed by `(assembler, target)`. A DTO field can route
//! its nested models through an assembler instead of the target's constructor.
//!
//! ### Write-once DTOs
//! Immutable DTOs hold [`WriteOnce`](framework::WriteOnce) slots. They are
//! filled during construction; any later write is an
//! [`ImmutableFieldViolation`](framework::DtoError::ImmutableFieldViolation).
//!
//! ## Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Every fallible operation returns [`DtoError`](framework::DtoError). Errors
//! raised inside adapter methods propagate unchanged.
//!
//! ### 2. Process-Wide State
//! The method cache, the per-assembler method tables and the validator are
//! built lazily on first use and live for the rest of the process. All of them
//! are safe to use from multiple threads.
//!
//! ### 3. Observability
//! The engine logs through `tracing` and never installs a subscriber. See the
//! [`lifecycle::tracing`] module for setup and the events emitted.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Dynamic values, schemas, the value caster, the method resolver, the
//! assembler engine and the DTO cores.
//! - **Key items**: [`Dto`](framework::Dto), [`Assembler`](framework::Assembler),
//!   [`Value`](framework::Value), [`cast_value`](framework::cast_value).
//!
//! ### 2. Validation ([`validation`])
//! Typed Laravel-style rules and the shared validator DTOs hand their
//! serialized fields to.
//!
//! ### 3. Samples ([`model`], [`assemblers`])
//! Users, products, reviews and their assemblers. The tests under `tests/`
//! are written against them.
//!
//! ### 4. Setup ([`lifecycle`])
//! Tracing subscriber installation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use argonaut::framework::{Assembler, Dto, JsonOptions};
//! use argonaut::assemblers::ProductDtoAssembler;
//! use argonaut::model::ProductDto;
//! use serde_json::json;
//!
//! let product: ProductDto = ProductDtoAssembler::assemble(
//!     json!({
//!         "product_name": "Standing Desk",
//!         "user": {"display_name": "jdoe", "email": "jdoe@example.com"},
//!         "reviews": [{"rating": 5, "comment": "Excellent!"}],
//!     }),
//!     None,
//! )?;
//! assert!(product.is_valid(false)?);
//! println!("{}", product.to_json(JsonOptions::pretty())?);
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=debug cargo test
//! ```

pub mod assemblers;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod validation;
