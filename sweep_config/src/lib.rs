#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the sensor-activation ledger.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every threshold carries a documented default matching the shipped
//!   firmware tuning, so an empty config file is a working config file.
use serde::Deserialize;

/// Movement and outlier-filter thresholds.
///
/// All values are floating point; defaults apply field by field, so a config
/// file only needs to name the thresholds it overrides.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Thresholds {
    /// Gyro norm (rad/s) above which an IMU sample counts as movement.
    pub move_gyro: f64,
    /// Accelerometer delta norm above which an IMU sample counts as movement.
    pub move_accel: f64,
    /// Optical angle delta (rad) above which an accepted reading counts as movement.
    pub move_angle: f64,
    /// Reject light readings whose angular rate of change exceeds this (rad/s).
    pub filter_angle_per_sec: f64,
    /// Chauvenet floor: likelihood times population below this rejects the sample.
    pub outlier_criteria: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            move_gyro: 0.075,
            move_accel: 0.03,
            move_angle: 0.015,
            filter_angle_per_sec: 50.0,
            outlier_criteria: 0.5,
        }
    }
}

/// Log sink options for the embedding process; this crate only parses them.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    /// Path to a .log file (JSON lines); stderr when absent.
    pub file: Option<String>,
    /// "info", "debug", ...
    pub level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let t = &self.thresholds;
        for (name, v) in [
            ("thresholds.move_gyro", t.move_gyro),
            ("thresholds.move_accel", t.move_accel),
            ("thresholds.move_angle", t.move_angle),
            ("thresholds.filter_angle_per_sec", t.filter_angle_per_sec),
            ("thresholds.outlier_criteria", t.outlier_criteria),
        ] {
            if !v.is_finite() {
                eyre::bail!("{name} must be finite");
            }
            if v < 0.0 {
                eyre::bail!("{name} must be >= 0");
            }
        }
        if t.filter_angle_per_sec == 0.0 {
            eyre::bail!("thresholds.filter_angle_per_sec must be > 0");
        }
        Ok(())
    }
}
