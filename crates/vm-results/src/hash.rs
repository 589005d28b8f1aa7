//! Content-based fingerprints for run configurations.

use sha2::{Digest, Sha256};
use vm_config::RunConfiguration;

/// Hash every section that affects the model. `etc` is left out so the same
/// inputs run at different times share an id.
pub fn compute_run_id(config: &RunConfiguration) -> String {
    let mut hasher = Sha256::new();

    let sections = [
        serde_json::to_string(&config.production),
        serde_json::to_string(&config.parent),
        serde_json::to_string(&config.fragment),
        serde_json::to_string(&config.comet),
        serde_json::to_string(&config.grid),
    ];
    for section in sections {
        hasher.update(section.unwrap_or_default().as_bytes());
    }

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vm_config::*;

    fn config(rh: f64, day: u32) -> RunConfiguration {
        let at = NaiveDate::from_ymd_opt(2022, 8, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        RunConfiguration {
            production: Production {
                base_q: 1e28,
                time_variation: None,
            },
            parent: Parent {
                name: Some("H2O".to_string()),
                v_outflow: 0.85,
                tau_d: 86000.0,
                sigma: 3e-16,
                t_to_d_ratio: 0.93,
            },
            fragment: Fragment {
                name: Some("OH".to_string()),
                v_photo: 1.05,
                tau_t: 160000.0,
            },
            comet: Comet {
                name: None,
                rh,
                delta: None,
                transform_method: None,
                transform_applied: false,
            },
            grid: Grid {
                angular_points: 30,
                radial_points: 50,
                radial_substeps: 12,
            },
            etc: EtcSection::fresh(None, at),
        }
    }

    #[test]
    fn hash_ignores_run_date() {
        assert_eq!(compute_run_id(&config(1.0, 1)), compute_run_id(&config(1.0, 2)));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(compute_run_id(&config(1.0, 1)), compute_run_id(&config(1.1, 1)));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let id = compute_run_id(&config(1.0, 1));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
