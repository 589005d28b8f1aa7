//! Run dispatch: validate, assemble, execute, classify.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vm_config::{ConfigError, FieldPath, ManualForm, RunConfiguration};
use vm_results::VectorialResult;

use crate::backend::{BackendError, VectorialBackend};
use crate::error::{AppError, AppResult};
use crate::failure::RunFailure;

/// Where the manual path writes its configuration.
pub const DEFAULT_MANUAL_CONFIG: &str = "pyvectorial.yaml";

/// Fragment name reported when results were loaded without a configuration.
pub const UNKNOWN_FRAGMENT: &str = "unknown";

/// Input mode, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Manual,
    Yaml,
    Blob,
}

/// What the user supplied for this run.
#[derive(Debug, Clone, Copy)]
pub enum RunSource<'a> {
    Manual(&'a ManualForm),
    /// Configuration document chosen by the user, if any.
    Yaml(Option<&'a Path>),
    /// Serialized results chosen by the user, if any.
    Blob(Option<&'a Path>),
}

impl RunSource<'_> {
    pub fn mode(&self) -> RunMode {
        match self {
            RunSource::Manual(_) => RunMode::Manual,
            RunSource::Yaml(_) => RunMode::Yaml,
            RunSource::Blob(_) => RunMode::Blob,
        }
    }
}

/// Options for dispatching a run.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// File the manual path writes before running.
    pub manual_config_path: PathBuf,
    /// Keep the manual configuration file after the run.
    pub keep_file: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            manual_config_path: PathBuf::from(DEFAULT_MANUAL_CONFIG),
            keep_file: false,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub source: RunSource<'a>,
    /// Results cache recorded in `etc.pyv_coma_pickle`.
    pub coma_pickle: Option<&'a Path>,
    pub options: DispatchOptions,
}

/// The configuration a result belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationConfig {
    Loaded(RunConfiguration),
    /// Results came from a blob; only the fragment name is known.
    Placeholder { fragment_name: String },
}

impl SimulationConfig {
    pub fn placeholder() -> Self {
        SimulationConfig::Placeholder {
            fragment_name: UNKNOWN_FRAGMENT.to_string(),
        }
    }

    pub fn fragment_name(&self) -> Option<&str> {
        match self {
            SimulationConfig::Loaded(config) => config.fragment.name.as_deref(),
            SimulationConfig::Placeholder { fragment_name } => Some(fragment_name),
        }
    }

    pub fn loaded(&self) -> Option<&RunConfiguration> {
        match self {
            SimulationConfig::Loaded(config) => Some(config),
            SimulationConfig::Placeholder { .. } => None,
        }
    }
}

/// Response from a successful run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub mode: RunMode,
    /// Fingerprint of the model sections; absent for blob input.
    pub run_id: Option<String>,
    pub config: SimulationConfig,
    pub result: VectorialResult,
    /// Aperture recovery text; absent for blob input.
    pub aperture_report: Option<String>,
    pub elapsed_s: f64,
}

impl RunResponse {
    pub fn radial_density_table(&self) -> String {
        vm_results::radial_density_table(&self.result)
    }

    pub fn column_density_table(&self) -> String {
        vm_results::column_density_table(&self.result)
    }

    pub fn agreement_check(&self) -> String {
        vm_results::agreement_check(&self.result)
    }
}

/// Outcome of a run the user can act on: results, or the reason there are none.
pub type RunAttempt = Result<RunResponse, RunFailure>;

/// Execute a run request against `backend`.
///
/// The outer `Err` is reserved for faults. Every input problem and every
/// recoverable model failure comes back as `Ok(Err(RunFailure))`.
pub fn dispatch<B: VectorialBackend>(
    backend: &mut B,
    request: &RunRequest,
) -> AppResult<RunAttempt> {
    let mode = request.source.mode();
    let span = tracing::info_span!("dispatch", ?mode);
    let _enter = span.enter();
    let started = Instant::now();
    let now = chrono::Local::now().naive_local();

    let attempt = match request.source {
        RunSource::Manual(form) => run_manual(backend, form, request, now, started),
        RunSource::Yaml(path) => run_yaml(backend, path, request, now, started),
        RunSource::Blob(path) => run_blob(backend, path, started),
    }?;

    match &attempt {
        Ok(response) => tracing::info!(
            run_id = response.run_id.as_deref().unwrap_or("-"),
            elapsed_s = response.elapsed_s,
            "run completed"
        ),
        Err(failure) => tracing::warn!(kind = failure.kind(), %failure, "run rejected"),
    }
    Ok(attempt)
}

fn run_manual<B: VectorialBackend>(
    backend: &mut B,
    form: &ManualForm,
    request: &RunRequest,
    now: NaiveDateTime,
    started: Instant,
) -> AppResult<RunAttempt> {
    let inputs = match form.validate() {
        Ok(inputs) => inputs,
        Err(err) => return Ok(Err(err.into())),
    };
    let coma_pickle = request.coma_pickle.map(Path::to_path_buf);
    let config = match vm_config::assemble_manual(&inputs, coma_pickle, now) {
        Ok(config) => config,
        Err(err) => return Ok(Err(err.into())),
    };

    let path = &request.options.manual_config_path;
    vm_config::save_yaml(path, &config).map_err(|source| AppError::ConfigFileWrite {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "manual configuration written");

    let attempt = run_document(backend, path, RunMode::Manual, started);

    if !request.options.keep_file {
        if let Err(err) = vm_config::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %err, "could not remove manual configuration");
        }
    }
    attempt
}

fn run_yaml<B: VectorialBackend>(
    backend: &mut B,
    path: Option<&Path>,
    request: &RunRequest,
    now: NaiveDateTime,
    started: Instant,
) -> AppResult<RunAttempt> {
    let Some(path) = path.filter(|p| p.is_file()) else {
        return Ok(Err(RunFailure::NoFileSelected));
    };

    let coma_pickle = request.coma_pickle.map(Path::to_path_buf);
    match vm_config::validate_file(path, coma_pickle, now) {
        Ok(_) => {}
        Err(ConfigError::Document(err)) => {
            return Ok(Err(RunFailure::DocumentSchema {
                locator: err.locator,
            }));
        }
        Err(ConfigError::Yaml(err)) => {
            tracing::debug!(error = %err, "configuration is not valid YAML");
            return Ok(Err(RunFailure::DocumentSchema {
                locator: FieldPath::root(),
            }));
        }
        Err(err) => return Err(err.into()),
    }

    run_document(backend, path, RunMode::Yaml, started)
}

fn run_blob<B: VectorialBackend>(
    backend: &mut B,
    path: Option<&Path>,
    started: Instant,
) -> AppResult<RunAttempt> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(Err(RunFailure::NoFileSelected));
    };
    if !can_deserialize(backend, path)? {
        return Ok(Err(RunFailure::UnreadableBlob {
            path: path.to_path_buf(),
        }));
    }

    let result = backend.read_results(path)?;
    Ok(Ok(RunResponse {
        mode: RunMode::Blob,
        run_id: None,
        config: SimulationConfig::placeholder(),
        result,
        aperture_report: None,
        elapsed_s: started.elapsed().as_secs_f64(),
    }))
}

/// Load, run and report on a configuration document already on disk.
fn run_document<B: VectorialBackend>(
    backend: &mut B,
    path: &Path,
    mode: RunMode,
    started: Instant,
) -> AppResult<RunAttempt> {
    match simulate(backend, path) {
        Ok((config, result, aperture_report)) => Ok(Ok(RunResponse {
            mode,
            run_id: Some(vm_results::compute_run_id(&config)),
            config: SimulationConfig::Loaded(config),
            result,
            aperture_report: Some(aperture_report),
            elapsed_s: started.elapsed().as_secs_f64(),
        })),
        Err(err) if err.is_recoverable() => Ok(Err(RunFailure::SimulationFailed {
            reason: err.to_string(),
        })),
        Err(err) => Err(err.into()),
    }
}

fn simulate<B: VectorialBackend>(
    backend: &mut B,
    path: &Path,
) -> Result<(RunConfiguration, VectorialResult, String), BackendError> {
    let config = backend.load_config(path)?;
    let coma = backend.run_model(&config)?;
    let result = backend.result_from_coma(&coma)?;
    let recovery = backend.aperture_recovery(&coma)?;
    Ok((config, result, vm_results::aperture_check(&recovery)))
}

/// Probe whether `path` holds results the backend can read.
///
/// Unreadable files answer `false`; faults still propagate.
pub fn can_deserialize<B: VectorialBackend>(backend: &mut B, path: &Path) -> AppResult<bool> {
    match backend.read_results(path) {
        Ok(_) => Ok(true),
        Err(BackendError::Unreadable(reason)) => {
            tracing::debug!(path = %path.display(), %reason, "results file rejected");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
