use rstest::rstest;
use sweep_config::{Config, load_toml};

#[rstest]
fn empty_config_uses_firmware_defaults() {
    let cfg = load_toml("").unwrap();
    cfg.validate().unwrap();
    assert!((cfg.thresholds.move_gyro - 0.075).abs() < 1e-12);
    assert!((cfg.thresholds.move_accel - 0.03).abs() < 1e-12);
    assert!((cfg.thresholds.move_angle - 0.015).abs() < 1e-12);
    assert!((cfg.thresholds.filter_angle_per_sec - 50.0).abs() < 1e-12);
    assert!((cfg.thresholds.outlier_criteria - 0.5).abs() < 1e-12);
}

#[rstest]
fn partial_override_keeps_other_defaults() {
    let cfg = load_toml(
        r#"
[thresholds]
move_gyro = 0.2
outlier_criteria = 0.25
"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert!((cfg.thresholds.move_gyro - 0.2).abs() < 1e-12);
    assert!((cfg.thresholds.outlier_criteria - 0.25).abs() < 1e-12);
    // untouched fields keep their defaults
    assert!((cfg.thresholds.move_angle - 0.015).abs() < 1e-12);
}

#[rstest]
fn logging_section_parses() {
    let cfg = load_toml(
        r#"
[logging]
file = "tracker.log"
level = "debug"
"#,
    )
    .unwrap();
    assert_eq!(cfg.logging.file.as_deref(), Some("tracker.log"));
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
}

#[rstest]
#[case("[thresholds]\nmove_gyro = -0.1")]
#[case("[thresholds]\nmove_accel = nan")]
#[case("[thresholds]\nmove_angle = inf")]
#[case("[thresholds]\nfilter_angle_per_sec = 0.0")]
fn validate_rejects_bad_thresholds(#[case] toml: &str) {
    let cfg = load_toml(toml).unwrap();
    assert!(cfg.validate().is_err(), "should reject: {toml}");
}

#[rstest]
fn unknown_sections_are_parse_errors_or_ignored() {
    // serde default behavior: unknown fields are ignored, sections too.
    let cfg: Config = load_toml("[something_else]\nfoo = 1").unwrap();
    cfg.validate().unwrap();
}
