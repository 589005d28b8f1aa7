//! Checks an uploaded configuration document before it reaches the model.
//!
//! The document is walked as a generic YAML tree. Checks run in a fixed order
//! (comet, fragment, grid, parent, production) and stop at the first failure,
//! so the caller always gets the same locator for the same document.

use chrono::NaiveDateTime;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use vm_core::{ValueKind, is_valid_number};

use crate::lenient::scalar;
use crate::schema::{EtcSection, TimeVariationKind, TransformMethod};
use crate::{ConfigError, ConfigResult};

/// Location of a field inside the document, e.g. `comet.transform_method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<&'static str>,
}

impl FieldPath {
    pub fn new(segments: &[&'static str]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }

    /// The document itself, used when it could not be parsed at all.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve this path against `doc`. Any missing key yields `None`.
    pub fn lookup<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| node.get(*segment))
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<document>");
        }
        f.write_str(&self.segments.join("."))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Document field missing or invalid: {locator}")]
pub struct DocumentError {
    pub locator: FieldPath,
}

impl DocumentError {
    fn at(segments: &[&'static str]) -> Self {
        Self {
            locator: FieldPath::new(segments),
        }
    }
}

/// What a document field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int,
    Bool,
    /// Present with any value, including null.
    Any,
}

/// True when the field at `path` exists and holds a value of `kind`.
pub fn check_field(doc: &Value, path: &FieldPath, kind: FieldKind) -> bool {
    let Some(value) = path.lookup(doc) else {
        return false;
    };
    match kind {
        FieldKind::Float => is_valid_number(scalar(value), ValueKind::Float),
        FieldKind::Int => is_valid_number(scalar(value), ValueKind::Int),
        FieldKind::Bool => is_valid_number(scalar(value), ValueKind::Bool),
        FieldKind::Any => true,
    }
}

const CHECKLIST: &[(&[&str], FieldKind)] = &[
    (&["comet", "rh"], FieldKind::Float),
    (&["comet", "transform_method"], FieldKind::Any),
    (&["comet", "transform_applied"], FieldKind::Bool),
    (&["fragment", "v_photo"], FieldKind::Float),
    (&["fragment", "tau_T"], FieldKind::Float),
    (&["grid", "angular_points"], FieldKind::Int),
    (&["grid", "radial_points"], FieldKind::Int),
    (&["grid", "radial_substeps"], FieldKind::Int),
    (&["parent", "T_to_d_ratio"], FieldKind::Float),
    (&["parent", "sigma"], FieldKind::Float),
    (&["parent", "tau_d"], FieldKind::Float),
    (&["parent", "v_outflow"], FieldKind::Float),
    (&["production", "base_q"], FieldKind::Float),
    (&["production", "time_variation_type"], FieldKind::Any),
];

/// Run the full checklist, returning the first failing field.
pub fn check_document(doc: &Value) -> Result<(), DocumentError> {
    for (segments, kind) in CHECKLIST {
        if !check_field(doc, &FieldPath::new(segments), *kind) {
            return Err(DocumentError::at(segments));
        }
        match *segments {
            ["comet", "transform_method"] => check_transform_method(doc)?,
            ["production", "time_variation_type"] => check_time_variation(doc)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_transform_method(doc: &Value) -> Result<(), DocumentError> {
    match &doc["comet"]["transform_method"] {
        Value::Null => Ok(()),
        Value::String(name) if TransformMethod::from_name(name).is_some() => Ok(()),
        _ => Err(DocumentError::at(&["comet", "transform_method"])),
    }
}

fn check_time_variation(doc: &Value) -> Result<(), DocumentError> {
    let kind = match &doc["production"]["time_variation_type"] {
        Value::Null => return Ok(()),
        Value::String(name) => TimeVariationKind::from_name(name),
        _ => None,
    };
    let Some(kind) = kind else {
        return Err(DocumentError::at(&["production", "time_variation_type"]));
    };
    for key in kind.param_keys() {
        let segments = ["production", "params", key];
        if !check_field(doc, &FieldPath::new(&segments), FieldKind::Float) {
            return Err(DocumentError::at(&segments));
        }
    }
    Ok(())
}

/// Replace the document's `etc` section with a freshly built block.
pub fn refresh_etc(
    doc: &mut Value,
    coma_pickle: Option<PathBuf>,
    now: NaiveDateTime,
) -> ConfigResult<()> {
    let etc = serde_yaml::to_value(EtcSection::fresh(coma_pickle, now))?;
    let Value::Mapping(root) = doc else {
        return Err(ConfigError::Document(DocumentError {
            locator: FieldPath::root(),
        }));
    };
    root.insert(Value::from("etc"), etc);
    Ok(())
}

/// Check the document at `path`; on success refresh its `etc` section and
/// write it back in place.
pub fn validate_file(
    path: &Path,
    coma_pickle: Option<PathBuf>,
    now: NaiveDateTime,
) -> ConfigResult<Value> {
    let mut doc = crate::load_value(path)?;
    check_document(&doc)?;
    refresh_etc(&mut doc, coma_pickle, now)?;
    crate::save_value(path, &doc)?;
    tracing::debug!(path = %path.display(), "configuration document validated");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        serde_yaml::from_str(
            r#"
production:
  base_q: 1.0e28
  time_variation_type: null
parent:
  name: H2O
  v_outflow: 0.85
  tau_d: 86000
  sigma: 3.0e-16
  T_to_d_ratio: 0.93
fragment:
  name: OH
  v_photo: 1.05
  tau_T: 160000
comet:
  name: Hale-Bopp
  rh: 1.0
  delta: 1.0
  transform_method: null
  transform_applied: false
grid:
  radial_points: 50
  angular_points: 30
  radial_substeps: 12
"#,
        )
        .unwrap()
    }

    #[test]
    fn sample_passes() {
        check_document(&sample()).unwrap();
    }

    #[test]
    fn lookup_handles_three_levels() {
        let mut doc = sample();
        doc["production"]["params"] = serde_yaml::from_str("amplitude: 2.0").unwrap();
        let path = FieldPath::new(&["production", "params", "amplitude"]);
        assert!(check_field(&doc, &path, FieldKind::Float));
        let missing = FieldPath::new(&["production", "params", "period"]);
        assert!(!check_field(&doc, &missing, FieldKind::Any));
    }

    #[test]
    fn null_counts_as_present_for_any() {
        let doc = sample();
        let path = FieldPath::new(&["comet", "transform_method"]);
        assert!(check_field(&doc, &path, FieldKind::Any));
        assert!(!check_field(&doc, &path, FieldKind::Float));
    }

    #[test]
    fn unknown_transform_method_fails() {
        let mut doc = sample();
        doc["comet"]["transform_method"] = Value::from("haser");
        let err = check_document(&doc).unwrap_err();
        assert_eq!(err.locator.to_string(), "comet.transform_method");
    }

    #[test]
    fn transform_applied_must_be_boolean() {
        let mut doc = sample();
        doc["comet"]["transform_applied"] = Value::from("false");
        let err = check_document(&doc).unwrap_err();
        assert_eq!(err.locator, FieldPath::new(&["comet", "transform_applied"]));
    }

    #[test]
    fn yaml_1_1_boolean_words_are_text() {
        for word in ["yes", "on"] {
            let text = format!("transform_applied: {word}\n");
            let parsed: Value = serde_yaml::from_str(&text).unwrap();
            let mut doc = sample();
            doc["comet"]["transform_applied"] = parsed["transform_applied"].clone();
            let err = check_document(&doc).unwrap_err();
            assert_eq!(err.locator.to_string(), "comet.transform_applied");
        }
    }

    #[test]
    fn fractional_grid_count_fails() {
        let mut doc = sample();
        doc["grid"]["radial_points"] = Value::from(50.5);
        let err = check_document(&doc).unwrap_err();
        assert_eq!(err.locator.to_string(), "grid.radial_points");
    }

    #[test]
    fn unknown_time_variation_fails_on_discriminator() {
        let mut doc = sample();
        doc["production"]["time_variation_type"] = Value::from("sawtooth");
        let err = check_document(&doc).unwrap_err();
        assert_eq!(err.locator.to_string(), "production.time_variation_type");
    }

    #[test]
    fn non_mapping_document_fails_first_check() {
        let doc = Value::from("just text");
        let err = check_document(&doc).unwrap_err();
        assert_eq!(err.locator.to_string(), "comet.rh");
    }
}
