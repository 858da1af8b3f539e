//! # Observability & Tracing
//!
//! The engine only emits events through `tracing` macros and never installs a
//! subscriber itself. Applications call [`setup_tracing`] once at startup;
//! tests call [`try_setup_tracing`], which tolerates an already installed
//! subscriber.
//!
//! ## Configuration
//!
//! Output uses the compact format without module paths (`with_target(false)`)
//! and is filtered by `RUST_LOG`. When `RUST_LOG` is unset or unparseable the
//! filter falls back to [`DEFAULT_DIRECTIVE`], which keeps the engine's
//! warnings and hides everything else.
//!
//! Engine targets worth filtering on:
//!
//! - `argonaut::framework::assembler`: `assemble_model` spans, adapter calls
//! - `argonaut::framework::resolver`: method cache hits and misses
//! - `argonaut::framework::cast`: nested assembler delegation
//! - `argonaut::framework::dto`: setters, ignored attributes, validation
//! - `argonaut::framework::serialization`: JSON encoding failures
//!
//! ```bash
//! # Resolution misses, nested delegation, validation and encoding failures
//! RUST_LOG=debug cargo test
//!
//! # Also cache hits, setter calls and ignored attributes
//! RUST_LOG=trace cargo test
//!
//! # Only the resolver
//! RUST_LOG=argonaut::framework::resolver=trace cargo test
//! ```
//!
//! ## What Gets Traced
//!
//! | Level   | Event                                                        |
//! |---------|--------------------------------------------------------------|
//! | `debug` | `assemble_model` span with `assembler` and `target` fields    |
//! | `debug` | method resolved on a cache miss, static or bound call         |
//! | `debug` | nested assembler delegation for a field                       |
//! | `debug` | validation failure with the number of failed fields           |
//! | `trace` | cache hit, setter override, ignored undeclared attribute      |
//! | `warn`  | JSON encoding failure                                        |
//!
//! With `RUST_LOG=debug` an assembly through a nested assembler reads like:
//!
//! ```text
//! DEBUG assemble_model: Resolved assembly method assembler=ProductDtoAssembler target=ProductDto method=toProductDto
//! DEBUG assemble_model: Calling static adapter method="toProductDto"
//! DEBUG assemble_model: Delegating to nested assembler field="user" assembler="UserDtoAssembler" target="UserDto"
//! DEBUG assemble_model:assemble_model: Calling static adapter method="toUserDto"
//! ```

use tracing_subscriber::fmt::format::{Compact, DefaultFields, Format};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` does not provide one.
pub const DEFAULT_DIRECTIVE: &str = "argonaut=warn";

fn engine_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn subscriber() -> SubscriberBuilder<DefaultFields, Format<Compact>, EnvFilter> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(engine_filter(directives))
        .with_target(false)
        .compact()
}

/// Installs the global fmt subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    subscriber().init();
}

/// Like [`setup_tracing`], but returns `false` instead of panicking when a
/// subscriber is already installed.
pub fn try_setup_tracing() -> bool {
    subscriber().try_init().is_ok()
}
