//! Builds a complete [`RunConfiguration`] from either input path.

use chrono::NaiveDateTime;
use serde_yaml::Value;
use std::path::PathBuf;

use crate::ConfigResult;
use crate::form::{InputError, ManualInputs, VariationParams};
use crate::schema::{
    Comet, EtcSection, Fragment, Grid, Parent, Production, RunConfiguration, TimeVariation,
    TimeVariationKind,
};

/// Assemble a configuration from validated manual scalars.
///
/// Only the three parameters of the active time variation are carried into
/// `production.params`; the block is left out entirely when there is none.
/// `etc` is always built fresh.
pub fn assemble_manual(
    inputs: &ManualInputs,
    coma_pickle: Option<PathBuf>,
    now: NaiveDateTime,
) -> Result<RunConfiguration, InputError> {
    let time_variation = inputs
        .time_variation
        .map(|kind| select_variation(kind, &inputs.variation_params))
        .transpose()?;

    Ok(RunConfiguration {
        production: Production {
            base_q: inputs.base_q,
            time_variation,
        },
        parent: Parent {
            name: inputs.parent_name.clone(),
            v_outflow: inputs.v_outflow,
            tau_d: inputs.tau_d,
            sigma: inputs.sigma,
            t_to_d_ratio: inputs.t_to_d_ratio,
        },
        fragment: Fragment {
            name: inputs.fragment_name.clone(),
            v_photo: inputs.v_photo,
            tau_t: inputs.tau_t,
        },
        comet: Comet {
            name: inputs.comet_name.clone(),
            rh: inputs.rh,
            delta: inputs.comet_delta,
            transform_method: inputs.transform_method,
            transform_applied: inputs.transform_method.is_some(),
        },
        grid: Grid {
            angular_points: inputs.angular_points,
            radial_points: inputs.radial_points,
            radial_substeps: inputs.radial_substeps,
        },
        etc: EtcSection::fresh(coma_pickle, now),
    })
}

fn select_variation(
    kind: TimeVariationKind,
    params: &VariationParams,
) -> Result<TimeVariation, InputError> {
    let need = |value: Option<f64>, label: &'static str| {
        value.ok_or(InputError::FieldInvalid { label })
    };
    Ok(match kind {
        TimeVariationKind::Sine => TimeVariation::Sine {
            amplitude: need(params.sine_amplitude, "Amplitude")?,
            period: need(params.sine_period, "Period")?,
            delta: need(params.sine_delta, "Delta")?,
        },
        TimeVariationKind::Gaussian => TimeVariation::Gaussian {
            amplitude: need(params.gaussian_amplitude, "Amplitude")?,
            std_dev: need(params.gaussian_std_dev, "Standard Deviation")?,
            t_max: need(params.gaussian_t_max, "Time at Peak")?,
        },
        TimeVariationKind::SquarePulse => TimeVariation::SquarePulse {
            amplitude: need(params.square_amplitude, "Amplitude")?,
            duration: need(params.square_duration, "Duration")?,
            t_start: need(params.square_t_start, "Start of Pulse")?,
        },
    })
}

/// Read a document that already passed [`crate::check_document`] and had its
/// `etc` refreshed. Nothing is added or dropped on the way through.
pub fn from_document(doc: Value) -> ConfigResult<RunConfiguration> {
    Ok(serde_yaml::from_value(doc)?)
}
