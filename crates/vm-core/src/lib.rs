//! vm-core: stable foundation for the vectorial-model front-end.
//!
//! Contains:
//! - value (raw scalar classification: non-negative float, int, bool)
//! - error (shared error types)

pub mod error;
pub mod value;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VmError, VmResult};
pub use value::*;
