//! Process setup for applications and tests embedding the engine.

pub mod tracing;

pub use self::tracing::{setup_tracing, try_setup_tracing};
