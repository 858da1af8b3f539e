//! Sample assemblers.
//!
//! Each assembler declares its adapter methods once in
//! [`Assembler::declare`](crate::framework::Assembler::declare); the method
//! names follow the `to<Target>` / `from<Target>` convention and are what
//! resolution errors report.

pub mod product;
pub mod user;

pub use product::*;
pub use user::*;
