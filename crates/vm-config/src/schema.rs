//! Run configuration schema definitions.
//!
//! Field names and nesting mirror the YAML document consumed by the
//! vectorial model and must not change.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::PathBuf;
use vm_core::parse_float;

use crate::lenient;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfiguration {
    pub production: Production,
    pub parent: Parent,
    pub fragment: Fragment,
    pub comet: Comet,
    pub grid: Grid,
    pub etc: EtcSection,
}

impl RunConfiguration {
    /// True when every section except `etc` matches.
    pub fn same_model(&self, other: &RunConfiguration) -> bool {
        self.production == other.production
            && self.parent == other.parent
            && self.fragment == other.fragment
            && self.comet == other.comet
            && self.grid == other.grid
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ProductionDoc", into = "ProductionDoc")]
pub struct Production {
    pub base_q: f64,
    pub time_variation: Option<TimeVariation>,
}

/// Time dependence of the parent production rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeVariation {
    Sine {
        amplitude: f64,
        period: f64,
        delta: f64,
    },
    Gaussian {
        amplitude: f64,
        std_dev: f64,
        t_max: f64,
    },
    SquarePulse {
        amplitude: f64,
        duration: f64,
        t_start: f64,
    },
}

impl TimeVariation {
    pub fn kind(&self) -> TimeVariationKind {
        match self {
            TimeVariation::Sine { .. } => TimeVariationKind::Sine,
            TimeVariation::Gaussian { .. } => TimeVariationKind::Gaussian,
            TimeVariation::SquarePulse { .. } => TimeVariationKind::SquarePulse,
        }
    }

    /// Parameter values in the order of [`TimeVariationKind::param_keys`].
    pub fn param_values(&self) -> [f64; 3] {
        match *self {
            TimeVariation::Sine {
                amplitude,
                period,
                delta,
            } => [amplitude, delta, period],
            TimeVariation::Gaussian {
                amplitude,
                std_dev,
                t_max,
            } => [amplitude, std_dev, t_max],
            TimeVariation::SquarePulse {
                amplitude,
                duration,
                t_start,
            } => [amplitude, duration, t_start],
        }
    }
}

/// Discriminator for [`TimeVariation`] without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeVariationKind {
    Sine,
    Gaussian,
    SquarePulse,
}

impl TimeVariationKind {
    pub const ALL: [TimeVariationKind; 3] = [
        TimeVariationKind::Sine,
        TimeVariationKind::Gaussian,
        TimeVariationKind::SquarePulse,
    ];

    /// Value of `production.time_variation_type` for this variant.
    pub fn name(self) -> &'static str {
        match self {
            TimeVariationKind::Sine => "sine wave",
            TimeVariationKind::Gaussian => "gaussian",
            TimeVariationKind::SquarePulse => "square pulse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Keys required under `production.params`, in checking order.
    pub fn param_keys(self) -> [&'static str; 3] {
        match self {
            TimeVariationKind::Sine => ["amplitude", "delta", "period"],
            TimeVariationKind::Gaussian => ["amplitude", "std_dev", "t_max"],
            TimeVariationKind::SquarePulse => ["amplitude", "duration", "t_start"],
        }
    }
}

impl std::fmt::Display for TimeVariationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parent {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub v_outflow: f64,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub tau_d: f64,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub sigma: f64,
    #[serde(rename = "T_to_d_ratio", deserialize_with = "lenient::non_negative")]
    pub t_to_d_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub v_photo: f64,
    #[serde(rename = "tau_T", deserialize_with = "lenient::non_negative")]
    pub tau_t: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comet {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub rh: f64,
    /// Geocentric distance. Carried through but never used by the model.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub delta: Option<f64>,
    #[serde(default)]
    pub transform_method: Option<TransformMethod>,
    pub transform_applied: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransformMethod {
    #[serde(rename = "cochran_schleicher_93")]
    CochranSchleicher93,
    #[serde(rename = "festou_fortran")]
    FestouFortran,
}

impl TransformMethod {
    pub fn name(self) -> &'static str {
        match self {
            TransformMethod::CochranSchleicher93 => "cochran_schleicher_93",
            TransformMethod::FestouFortran => "festou_fortran",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [TransformMethod::CochranSchleicher93, TransformMethod::FestouFortran]
            .into_iter()
            .find(|method| method.name() == name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grid {
    #[serde(deserialize_with = "lenient::count")]
    pub angular_points: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub radial_points: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub radial_substeps: u32,
}

/// Output-control block injected into every configuration.
///
/// Only `pyv_coma_pickle` varies between runs; the flags are always on and the
/// timestamp is taken when the block is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtcSection {
    pub print_binned_times: bool,
    pub print_column_density: bool,
    pub print_progress: bool,
    pub print_radial_density: bool,
    #[serde(default)]
    pub pyv_coma_pickle: Option<PathBuf>,
    #[serde(with = "lenient::timestamp")]
    pub pyv_date_of_run: NaiveDateTime,
    pub show_3d_column_density_centered: bool,
    pub show_3d_column_density_off_center: bool,
    pub show_agreement_check: bool,
    pub show_aperture_checks: bool,
    pub show_column_density_plots: bool,
    pub show_fragment_sputter: bool,
    pub show_radial_plots: bool,
}

impl EtcSection {
    pub fn fresh(coma_pickle: Option<PathBuf>, now: NaiveDateTime) -> Self {
        Self {
            print_binned_times: true,
            print_column_density: true,
            print_progress: true,
            print_radial_density: true,
            pyv_coma_pickle: coma_pickle,
            pyv_date_of_run: now,
            show_3d_column_density_centered: true,
            show_3d_column_density_off_center: true,
            show_agreement_check: true,
            show_aperture_checks: true,
            show_column_density_plots: true,
            show_fragment_sputter: true,
            show_radial_plots: true,
        }
    }
}

// On-disk shape of the production section: a string discriminator plus an
// untyped params mapping. Only the active variant's keys are read or written.
#[derive(Serialize, Deserialize)]
struct ProductionDoc {
    #[serde(deserialize_with = "lenient::non_negative")]
    base_q: f64,
    #[serde(default)]
    time_variation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl TryFrom<ProductionDoc> for Production {
    type Error = String;

    fn try_from(doc: ProductionDoc) -> Result<Self, Self::Error> {
        let Some(type_name) = doc.time_variation_type else {
            return Ok(Production {
                base_q: doc.base_q,
                time_variation: None,
            });
        };
        let kind = TimeVariationKind::from_name(&type_name)
            .ok_or_else(|| format!("unknown time_variation_type '{type_name}'"))?;
        let params = doc
            .params
            .ok_or_else(|| format!("time_variation_type '{type_name}' requires params"))?;
        let read = |key: &'static str| -> Result<f64, String> {
            let value = params
                .get(key)
                .ok_or_else(|| format!("missing production.params.{key} for '{type_name}'"))?;
            parse_float(lenient::scalar(value), key).map_err(|e| e.to_string())
        };
        let time_variation = match kind {
            TimeVariationKind::Sine => TimeVariation::Sine {
                amplitude: read("amplitude")?,
                period: read("period")?,
                delta: read("delta")?,
            },
            TimeVariationKind::Gaussian => TimeVariation::Gaussian {
                amplitude: read("amplitude")?,
                std_dev: read("std_dev")?,
                t_max: read("t_max")?,
            },
            TimeVariationKind::SquarePulse => TimeVariation::SquarePulse {
                amplitude: read("amplitude")?,
                duration: read("duration")?,
                t_start: read("t_start")?,
            },
        };
        Ok(Production {
            base_q: doc.base_q,
            time_variation: Some(time_variation),
        })
    }
}

impl From<Production> for ProductionDoc {
    fn from(production: Production) -> Self {
        let params = production.time_variation.map(|variation| {
            let params: Mapping = variation
                .kind()
                .param_keys()
                .into_iter()
                .zip(variation.param_values())
                .map(|(key, value)| (Value::from(key), Value::from(value)))
                .collect();
            Value::Mapping(params)
        });
        ProductionDoc {
            base_q: production.base_q,
            time_variation_type: production
                .time_variation
                .map(|variation| variation.kind().name().to_string()),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_variation_omits_params() {
        let production = Production {
            base_q: 5.0,
            time_variation: None,
        };
        let value = serde_yaml::to_value(&production).unwrap();
        assert!(value.get("params").is_none());
        assert!(value["time_variation_type"].is_null());
    }

    #[test]
    fn gaussian_writes_only_its_keys() {
        let production = Production {
            base_q: 1e28,
            time_variation: Some(TimeVariation::Gaussian {
                amplitude: 3e28,
                std_dev: 20.0,
                t_max: 24.0,
            }),
        };
        let value = serde_yaml::to_value(&production).unwrap();
        assert_eq!(value["time_variation_type"].as_str(), Some("gaussian"));
        let params = value["params"].as_mapping().unwrap();
        assert_eq!(params.len(), 3);
        assert!(params.contains_key("std_dev"));
        assert!(!params.contains_key("period"));
    }

    #[test]
    fn inactive_params_are_ignored() {
        let yaml = "base_q: 1.0\ntime_variation_type: sine wave\nparams:\n  amplitude: 2.0\n  period: 10.0\n  delta: 0.5\n  std_dev: -4\n  t_start: junk\n";
        let production: Production = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            production.time_variation,
            Some(TimeVariation::Sine {
                amplitude: 2.0,
                period: 10.0,
                delta: 0.5,
            })
        );
    }

    #[test]
    fn negative_active_param_names_its_key() {
        let yaml = "base_q: 1.0\ntime_variation_type: gaussian\nparams:\n  amplitude: 2.0\n  std_dev: -4\n  t_max: 1.0\n";
        let err = serde_yaml::from_str::<Production>(yaml).unwrap_err();
        assert!(err.to_string().contains("std_dev"));
    }

    #[test]
    fn unknown_variation_name_is_rejected() {
        let yaml = "base_q: 1.0\ntime_variation_type: sawtooth\n";
        let err = serde_yaml::from_str::<Production>(yaml).unwrap_err();
        assert!(err.to_string().contains("sawtooth"));
    }

    #[test]
    fn transform_method_names_roundtrip() {
        for method in [TransformMethod::CochranSchleicher93, TransformMethod::FestouFortran] {
            assert_eq!(TransformMethod::from_name(method.name()), Some(method));
            let yaml = serde_yaml::to_string(&method).unwrap();
            assert_eq!(yaml.trim(), method.name());
        }
    }

    #[test]
    fn variation_names_resolve() {
        assert_eq!(
            TimeVariationKind::from_name("square pulse"),
            Some(TimeVariationKind::SquarePulse)
        );
        assert_eq!(TimeVariationKind::from_name("Sine"), None);
    }
}
