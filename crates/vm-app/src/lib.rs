//! Shared application service layer for the vectorial-model front-end.
//!
//! This crate provides the interface a presentation layer drives: it takes
//! raw form input or user-chosen files, runs them through validation and
//! assembly, dispatches the model library, and classifies the outcome.

pub mod backend;
pub mod command_backend;
pub mod error;
pub mod failure;
pub mod run_service;

// Re-export key types for convenience
pub use backend::{BackendError, VectorialBackend};
pub use command_backend::{BACKEND_ENV, BridgeComa, CommandBackend};
pub use error::{AppError, AppResult};
pub use failure::RunFailure;
pub use run_service::{
    DEFAULT_MANUAL_CONFIG, DispatchOptions, RunAttempt, RunMode, RunRequest, RunResponse,
    RunSource, SimulationConfig, UNKNOWN_FRAGMENT, can_deserialize, dispatch,
};
