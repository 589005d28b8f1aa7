#![allow(dead_code)]

use std::path::{Path, PathBuf};
use vm_app::{BackendError, VectorialBackend};
use vm_config::{ManualForm, RunConfiguration, TransformSelectors};
use vm_results::{ApertureRecovery, VectorialResult};

/// First line of a results file the scripted backend accepts.
pub const BLOB_MAGIC: &str = "VMRESULT";

/// In-memory stand-in for the model library.
#[derive(Default)]
pub struct ScriptedBackend {
    /// Error `run_model` raises instead of producing a coma.
    pub run_error: Option<BackendError>,
    /// Configurations handed to `run_model`, loaded by the default loader.
    pub ran: Vec<RunConfiguration>,
    pub run_calls: usize,
    pub read_calls: usize,
}

impl ScriptedBackend {
    pub fn failing(err: BackendError) -> Self {
        Self {
            run_error: Some(err),
            ..Self::default()
        }
    }
}

pub fn sample_result() -> VectorialResult {
    VectorialResult {
        volume_density_grid_km: vec![10.0, 100.0],
        volume_density_per_cm3: vec![50.0, 0.5],
        column_density_grid_km: vec![10.0, 100.0],
        column_density_per_cm2: vec![1.0e12, 3.0e10],
        num_fragments_theory: 4.0e32,
        num_fragments_grid: 3.96e32,
        max_grid_radius_m: 1.0e9,
    }
}

impl VectorialBackend for ScriptedBackend {
    type Coma = RunConfiguration;

    fn run_model(&mut self, config: &RunConfiguration) -> Result<RunConfiguration, BackendError> {
        self.run_calls += 1;
        self.ran.push(config.clone());
        match &self.run_error {
            Some(err) => Err(err.clone()),
            None => Ok(config.clone()),
        }
    }

    fn result_from_coma(&self, _coma: &RunConfiguration) -> Result<VectorialResult, BackendError> {
        Ok(sample_result())
    }

    fn aperture_recovery(&self, _coma: &RunConfiguration) -> Result<ApertureRecovery, BackendError> {
        Ok(ApertureRecovery {
            fragments_theory: 4.0e32,
            circular_total: 3.9e32,
            annular_total: 2.0e31,
        })
    }

    fn read_results(&mut self, blob: &Path) -> Result<VectorialResult, BackendError> {
        self.read_calls += 1;
        let bytes = std::fs::read(blob).map_err(|e| BackendError::Fault(e.to_string()))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| BackendError::Unreadable("invalid load key".to_string()))?;
        let body = text
            .strip_prefix(BLOB_MAGIC)
            .ok_or_else(|| BackendError::Unreadable("invalid load key".to_string()))?;
        VectorialResult::from_json(body).map_err(|e| BackendError::Unreadable(e.to_string()))
    }
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

/// The Hale-Bopp manual entry: no time variation, no transform.
pub fn hale_bopp_form() -> ManualForm {
    ManualForm {
        base_q: "5.0".into(),
        v_outflow: "0.85".into(),
        tau_d: "80000".into(),
        sigma: "3e-9".into(),
        t_to_d_ratio: "0.93".into(),
        v_photo: "1.05".into(),
        tau_t: "100000".into(),
        comet_name: "Hale-Bopp".into(),
        rh: "1.0".into(),
        transform: TransformSelectors {
            none: true,
            ..TransformSelectors::default()
        },
        angular_points: "30".into(),
        radial_points: "50".into(),
        radial_substeps: "12".into(),
        ..ManualForm::default()
    }
}
