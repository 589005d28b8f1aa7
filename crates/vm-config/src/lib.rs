//! vm-config: run configuration document, validation and assembly.

pub mod assemble;
pub mod document;
pub mod form;
mod lenient;
pub mod schema;

pub use assemble::{assemble_manual, from_document};
pub use document::{
    DocumentError, FieldKind, FieldPath, check_document, check_field, refresh_etc, validate_file,
};
pub use form::{
    InputError, ManualForm, ManualInputs, TimeVariationForm, TransformSelectors, VariationParams,
};
pub use schema::*;

use serde::Serialize;
use serde_yaml::Value;
use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Read a configuration document as an untyped tree.
///
/// A file that is not UTF-8 text is a document error at the root, not an
/// I/O failure.
pub fn load_value(path: &Path) -> ConfigResult<Value> {
    let content = match std::fs::read_to_string(path) {
        Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
            return Err(ConfigError::Document(DocumentError {
                locator: FieldPath::root(),
            }));
        }
        other => other?,
    };
    Ok(serde_yaml::from_str(&content)?)
}

/// Read, check and type a configuration document.
pub fn load_yaml(path: &Path) -> ConfigResult<RunConfiguration> {
    let doc = load_value(path)?;
    check_document(&doc)?;
    from_document(doc)
}

/// Write a configuration, replacing whatever is at `path`.
pub fn save_yaml(path: &Path, config: &RunConfiguration) -> ConfigResult<()> {
    save_value(path, config)
}

/// Write any serializable mapping, replacing whatever is at `path`.
pub fn save_value<T: Serialize + ?Sized>(path: &Path, value: &T) -> ConfigResult<()> {
    let content = serde_yaml::to_string(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn remove_file(path: &Path) -> ConfigResult<()> {
    std::fs::remove_file(path)?;
    Ok(())
}
