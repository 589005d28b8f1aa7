//! Reasons a run attempt was turned away.

use std::path::PathBuf;
use vm_config::{FieldPath, InputError};

/// Why a run could not produce results. Each variant is attributable to the
/// user's input and is shown to them; none of them is a fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunFailure {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("The .yaml file is either missing or has an incorrect data type assigned to: \"{locator}\"")]
    DocumentSchema { locator: FieldPath },

    #[error("The pickle file could not be understood: {}", path.display())]
    UnreadableBlob { path: PathBuf },

    #[error("A file has not been selected")]
    NoFileSelected,

    #[error("The data in the input could not be converted to results")]
    SimulationFailed { reason: String },
}

impl RunFailure {
    /// Dialog text for the presentation layer.
    pub fn user_message(&self) -> String {
        format!("{self}. \nPlease try again.")
    }

    /// Short machine-readable tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RunFailure::Input(InputError::FieldInvalid { .. }) => "field_invalid",
            RunFailure::Input(InputError::MissingSelection { .. }) => "missing_selection",
            RunFailure::Input(InputError::OverSelection { .. }) => "over_selection",
            RunFailure::DocumentSchema { .. } => "document_schema",
            RunFailure::UnreadableBlob { .. } => "unreadable_blob",
            RunFailure::NoFileSelected => "no_file_selected",
            RunFailure::SimulationFailed { .. } => "simulation_failed",
        }
    }
}
