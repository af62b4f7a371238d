//! RETRACE Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Errors, step directives and replay policies shared by the trace store
//! and the replay cursor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod policy;
pub mod step;

// Re-exports
pub use error::{FormatError, TraceError, TraceResult};
pub use policy::{BoundaryPolicy, DirectivePolicy};
pub use step::Step;
