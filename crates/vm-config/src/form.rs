//! Manual-entry form validation.
//!
//! Turns the raw text of every form field into typed scalars, stopping at the
//! first field that does not parse. Errors carry the label shown next to the
//! field so the user can fix exactly that entry.

use vm_core::{parse_float, parse_int};

use crate::schema::{TimeVariationKind, TransformMethod};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Incorrect manual data entry for: \"{label}\"")]
    FieldInvalid { label: &'static str },

    #[error("No input boxes selected for: \"{group}\"")]
    MissingSelection { group: &'static str },

    #[error("Too many input boxes selected for: \"{group}\"")]
    OverSelection { group: &'static str },
}

pub const TIME_VARIATION_GROUP: &str = "Time Variation";
pub const TRANSFORM_GROUP: &str = "Transformation Method";

/// Raw contents of the manual-entry form.
#[derive(Debug, Clone, Default)]
pub struct ManualForm {
    pub base_q: String,
    pub time_variation: TimeVariationForm,

    pub parent_name: String,
    pub v_outflow: String,
    pub tau_d: String,
    pub sigma: String,
    pub t_to_d_ratio: String,

    pub fragment_name: String,
    pub v_photo: String,
    pub tau_t: String,

    pub comet_name: String,
    pub rh: String,
    pub comet_delta: String,
    pub transform: TransformSelectors,

    pub angular_points: String,
    pub radial_points: String,
    pub radial_substeps: String,
}

/// Time-variation radio group and the parameter boxes behind each option.
#[derive(Debug, Clone)]
pub struct TimeVariationForm {
    pub sine: bool,
    pub gaussian: bool,
    pub square_pulse: bool,
    pub none: bool,

    pub sine_amplitude: String,
    pub sine_period: String,
    pub sine_delta: String,
    pub gaussian_amplitude: String,
    pub gaussian_std_dev: String,
    pub gaussian_t_max: String,
    pub square_amplitude: String,
    pub square_duration: String,
    pub square_t_start: String,
}

impl Default for TimeVariationForm {
    fn default() -> Self {
        Self {
            sine: false,
            gaussian: false,
            square_pulse: false,
            none: true,
            sine_amplitude: String::new(),
            sine_period: String::new(),
            sine_delta: String::new(),
            gaussian_amplitude: String::new(),
            gaussian_std_dev: String::new(),
            gaussian_t_max: String::new(),
            square_amplitude: String::new(),
            square_duration: String::new(),
            square_t_start: String::new(),
        }
    }
}

/// The three mutually exclusive transform-method checkboxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformSelectors {
    pub cochran_schleicher_93: bool,
    pub festou_fortran: bool,
    pub none: bool,
}

impl TransformSelectors {
    pub fn resolve(self) -> Result<Option<TransformMethod>, InputError> {
        select_one(
            TRANSFORM_GROUP,
            &[
                (
                    self.cochran_schleicher_93,
                    Some(TransformMethod::CochranSchleicher93),
                ),
                (self.festou_fortran, Some(TransformMethod::FestouFortran)),
                (self.none, None),
            ],
        )
    }
}

/// Parameters of every time-variation variant. Only the active variant's
/// three are filled in after validation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariationParams {
    pub sine_amplitude: Option<f64>,
    pub sine_period: Option<f64>,
    pub sine_delta: Option<f64>,
    pub gaussian_amplitude: Option<f64>,
    pub gaussian_std_dev: Option<f64>,
    pub gaussian_t_max: Option<f64>,
    pub square_amplitude: Option<f64>,
    pub square_duration: Option<f64>,
    pub square_t_start: Option<f64>,
}

/// Type-checked scalars from the manual form.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualInputs {
    pub base_q: f64,
    pub time_variation: Option<TimeVariationKind>,
    pub variation_params: VariationParams,

    pub parent_name: Option<String>,
    pub v_outflow: f64,
    pub tau_d: f64,
    pub sigma: f64,
    pub t_to_d_ratio: f64,

    pub fragment_name: Option<String>,
    pub v_photo: f64,
    pub tau_t: f64,

    pub comet_name: Option<String>,
    pub rh: f64,
    pub comet_delta: Option<f64>,
    pub transform_method: Option<TransformMethod>,

    pub angular_points: u32,
    pub radial_points: u32,
    pub radial_substeps: u32,
}

impl ManualForm {
    pub fn validate(&self) -> Result<ManualInputs, InputError> {
        let base_q = float_field(&self.base_q, "Base Q")?;
        let (time_variation, variation_params) = self.time_variation.validate()?;

        let v_outflow = float_field(&self.v_outflow, "Outflow Velocity")?;
        let tau_d = float_field(&self.tau_d, "Tau_D")?;
        let sigma = float_field(&self.sigma, "Sigma")?;
        let t_to_d_ratio = float_field(&self.t_to_d_ratio, "T to D Ratio")?;

        let v_photo = float_field(&self.v_photo, "VPhoto")?;
        let tau_t = float_field(&self.tau_t, "Tau_T")?;

        let rh = float_field(&self.rh, "Rh")?;
        let transform_method = self.transform.resolve()?;

        let angular_points = int_field(&self.angular_points, "Angular Points")?;
        let radial_points = int_field(&self.radial_points, "Radial Points")?;
        let radial_substeps = int_field(&self.radial_substeps, "Radial Substeps")?;

        Ok(ManualInputs {
            base_q,
            time_variation,
            variation_params,
            parent_name: optional_text(&self.parent_name),
            v_outflow,
            tau_d,
            sigma,
            t_to_d_ratio,
            fragment_name: optional_text(&self.fragment_name),
            v_photo,
            tau_t,
            comet_name: optional_text(&self.comet_name),
            rh,
            comet_delta: geocentric_distance(&self.comet_delta),
            transform_method,
            angular_points,
            radial_points,
            radial_substeps,
        })
    }
}

impl TimeVariationForm {
    pub fn validate(&self) -> Result<(Option<TimeVariationKind>, VariationParams), InputError> {
        let kind = select_one(
            TIME_VARIATION_GROUP,
            &[
                (self.sine, Some(TimeVariationKind::Sine)),
                (self.gaussian, Some(TimeVariationKind::Gaussian)),
                (self.square_pulse, Some(TimeVariationKind::SquarePulse)),
                (self.none, None),
            ],
        )?;

        let mut params = VariationParams::default();
        match kind {
            Some(TimeVariationKind::Sine) => {
                params.sine_amplitude = Some(float_field(&self.sine_amplitude, "Amplitude")?);
                params.sine_period = Some(float_field(&self.sine_period, "Period")?);
                params.sine_delta = Some(float_field(&self.sine_delta, "Delta")?);
            }
            Some(TimeVariationKind::Gaussian) => {
                params.gaussian_amplitude =
                    Some(float_field(&self.gaussian_amplitude, "Amplitude")?);
                params.gaussian_std_dev =
                    Some(float_field(&self.gaussian_std_dev, "Standard Deviation")?);
                params.gaussian_t_max = Some(float_field(&self.gaussian_t_max, "Time at Peak")?);
            }
            Some(TimeVariationKind::SquarePulse) => {
                params.square_amplitude = Some(float_field(&self.square_amplitude, "Amplitude")?);
                params.square_duration = Some(float_field(&self.square_duration, "Duration")?);
                params.square_t_start =
                    Some(float_field(&self.square_t_start, "Start of Pulse")?);
            }
            None => {}
        }
        Ok((kind, params))
    }
}

/// Pick the value of the single checked option in a mutually exclusive group.
pub fn select_one<T: Copy>(group: &'static str, options: &[(bool, T)]) -> Result<T, InputError> {
    let mut checked = options.iter().filter(|(on, _)| *on).map(|(_, value)| *value);
    let first = checked
        .next()
        .ok_or(InputError::MissingSelection { group })?;
    if checked.next().is_some() {
        return Err(InputError::OverSelection { group });
    }
    Ok(first)
}

fn float_field(raw: &str, label: &'static str) -> Result<f64, InputError> {
    parse_float(raw, label).map_err(|_| InputError::FieldInvalid { label })
}

fn int_field(raw: &str, label: &'static str) -> Result<u32, InputError> {
    parse_int(raw, label).map_err(|_| InputError::FieldInvalid { label })
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Blank or unparseable geocentric distance yields None.
fn geocentric_distance(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::warn!(raw = trimmed, "ignoring unparseable comet delta");
            None
        }
    }
}
