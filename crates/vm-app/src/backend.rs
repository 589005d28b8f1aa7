//! Seam between the front-end core and the vectorial-model library.

use std::path::Path;
use vm_config::{ConfigError, RunConfiguration};
use vm_results::{ApertureRecovery, VectorialResult};

/// Errors raised by the model library, sorted by how the dispatcher treats
/// them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// Division by zero inside the model. Recoverable.
    #[error("Division by zero in model: {0}")]
    ZeroDivision(String),

    /// The model rejected a value. Recoverable.
    #[error("Invalid value in model: {0}")]
    InvalidValue(String),

    /// A results file could not be deserialized.
    #[error("Unreadable results file: {0}")]
    Unreadable(String),

    /// Anything else. Never recovered.
    #[error("Backend fault: {0}")]
    Fault(String),
}

impl BackendError {
    /// Map a Python exception class name from the model library.
    pub fn from_exception(kind: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            "ZeroDivisionError" => BackendError::ZeroDivision(message),
            "ValueError" => BackendError::InvalidValue(message),
            "UnpicklingError" | "EOFError" | "ModuleNotFoundError" => {
                BackendError::Unreadable(message)
            }
            _ => BackendError::Fault(format!("{kind}: {message}")),
        }
    }

    /// True for the numerical failures a run is allowed to end with.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BackendError::ZeroDivision(_) | BackendError::InvalidValue(_)
        )
    }
}

/// Operations the dispatcher needs from the model library.
///
/// Calls are synchronous and block until the library returns.
pub trait VectorialBackend {
    /// Library-side state of a finished run.
    type Coma;

    /// Parse a configuration document into a typed configuration.
    fn load_config(&mut self, path: &Path) -> Result<RunConfiguration, BackendError> {
        vm_config::load_yaml(path).map_err(|err| match err {
            ConfigError::Io(io) => BackendError::Fault(io.to_string()),
            other => BackendError::InvalidValue(other.to_string()),
        })
    }

    fn run_model(&mut self, config: &RunConfiguration) -> Result<Self::Coma, BackendError>;

    fn result_from_coma(&self, coma: &Self::Coma) -> Result<VectorialResult, BackendError>;

    fn aperture_recovery(&self, coma: &Self::Coma) -> Result<ApertureRecovery, BackendError>;

    /// Deserialize a previously saved result.
    fn read_results(&mut self, blob: &Path) -> Result<VectorialResult, BackendError>;
}
