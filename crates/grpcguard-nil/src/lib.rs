//! grpcguard nil — nil-response analysis for gRPC handlers.
//!
//! Detects response messages whose non-optional sub-message fields may be
//! observed as nil at return time: direct stores of maybe-nil values, nil
//! elements in repeated fields, and required fields never assigned at all.

pub mod analysis;
pub mod fields;
pub mod flow;
pub mod handlers;
pub mod lattice;
pub mod rules;
pub mod summary;

pub use analysis::ResponseNilAnalyzer;
