//! grpcguard diagnostics — diagnostic types, formatting, and output.

pub mod diagnostic;
pub mod human;

pub use diagnostic::*;
