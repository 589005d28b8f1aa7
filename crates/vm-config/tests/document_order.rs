use serde_yaml::Value;
use vm_config::{FieldPath, TimeVariation, check_document, from_document, refresh_etc};

const COMPLETE: &str = r#"
production:
  base_q: 5.0
  time_variation_type: sine wave
  params:
    amplitude: 1.0
    period: 20.0
    delta: 0.1
parent:
  v_outflow: 0.85
  tau_d: 80000
  sigma: 3.0e-9
  T_to_d_ratio: 0.93
fragment:
  v_photo: 1.05
  tau_T: 100000
comet:
  rh: 1.0
  transform_method: festou_fortran
  transform_applied: true
grid:
  angular_points: 30
  radial_points: 50
  radial_substeps: 12
"#;

fn complete() -> Value {
    serde_yaml::from_str(COMPLETE).unwrap()
}

fn remove(doc: &mut Value, section: &str, field: &str) {
    doc[section].as_mapping_mut().unwrap().remove(field);
}

#[test]
fn complete_document_passes() {
    check_document(&complete()).unwrap();
}

#[test]
fn comet_is_reported_before_grid() {
    let mut doc = complete();
    remove(&mut doc, "comet", "rh");
    remove(&mut doc, "grid", "angular_points");
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator, FieldPath::new(&["comet", "rh"]));

    // Same answer however many times it is asked.
    for _ in 0..3 {
        assert_eq!(check_document(&doc).unwrap_err(), err);
    }
}

#[test]
fn grid_is_reported_before_parent() {
    let mut doc = complete();
    remove(&mut doc, "parent", "sigma");
    doc["grid"]["radial_substeps"] = Value::from(-3);
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator.to_string(), "grid.radial_substeps");
}

#[test]
fn sine_without_delta_fails_on_delta() {
    let mut doc = complete();
    doc["production"]["params"]
        .as_mapping_mut()
        .unwrap()
        .remove("delta");
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator, FieldPath::new(&["production", "params", "delta"]));
    assert_eq!(err.locator.segments(), &["production", "params", "delta"]);
}

#[test]
fn gaussian_needs_its_own_keys() {
    let mut doc = complete();
    doc["production"]["time_variation_type"] = Value::from("gaussian");
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator.to_string(), "production.params.std_dev");
}

#[test]
fn missing_params_block_fails_on_first_key() {
    let mut doc = complete();
    doc["production"]["time_variation_type"] = Value::from("square pulse");
    remove(&mut doc, "production", "params");
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator.to_string(), "production.params.amplitude");
}

#[test]
fn quoted_numbers_are_accepted() {
    let mut doc = complete();
    doc["comet"]["rh"] = Value::from("1.25");
    doc["grid"]["angular_points"] = Value::from("30.0");
    check_document(&doc).unwrap();
}

#[test]
fn fragment_lifetime_is_required() {
    let mut doc = complete();
    remove(&mut doc, "fragment", "tau_T");
    let err = check_document(&doc).unwrap_err();
    assert_eq!(err.locator.to_string(), "fragment.tau_T");
}

#[test]
fn stray_inactive_params_pass_and_load() {
    let mut doc = complete();
    doc["production"]["params"]["std_dev"] = Value::from(-4);
    doc["production"]["params"]["t_start"] = Value::from("soon");
    check_document(&doc).unwrap();

    let now = chrono::NaiveDate::from_ymd_opt(2022, 8, 29)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    refresh_etc(&mut doc, None, now).unwrap();
    let config = from_document(doc).unwrap();
    assert_eq!(
        config.production.time_variation,
        Some(TimeVariation::Sine {
            amplitude: 1.0,
            period: 20.0,
            delta: 0.1,
        })
    );
}
