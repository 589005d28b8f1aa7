//! Error types for the vm-app service layer.

use std::path::PathBuf;

/// Faults: conditions that are not the user's fault and abort the caller.
///
/// Problems with the user's input are reported as
/// [`RunFailure`](crate::failure::RunFailure) instead and never reach here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write configuration file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: vm_config::ConfigError,
    },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// Result type for vm-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<vm_config::ConfigError> for AppError {
    fn from(err: vm_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<crate::backend::BackendError> for AppError {
    fn from(err: crate::backend::BackendError) -> Self {
        AppError::Backend {
            message: err.to_string(),
        }
    }
}
