//! Filter and movement thresholds owned by each ledger instance.
//!
//! Every ledger owns its own copy so tracked objects can be tuned
//! independently.

/// Movement and outlier-filter thresholds, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Gyro norm (rad/s) above which an IMU sample counts as movement.
    pub move_gyro: f64,
    /// Accelerometer delta norm above which an IMU sample counts as movement.
    pub move_accel: f64,
    /// Optical angle delta (rad) above which an accepted reading counts as movement.
    pub move_angle: f64,
    /// Reject light readings whose angular rate of change exceeds this (rad/s).
    pub filter_angle_per_sec: f64,
    /// Chauvenet floor: likelihood times population below this rejects.
    pub outlier_criteria: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        sweep_config::Thresholds::default().into()
    }
}

impl From<sweep_config::Thresholds> for Thresholds {
    fn from(t: sweep_config::Thresholds) -> Self {
        Self {
            move_gyro: t.move_gyro,
            move_accel: t.move_accel,
            move_angle: t.move_angle,
            filter_angle_per_sec: t.filter_angle_per_sec,
            outlier_criteria: t.outlier_criteria,
        }
    }
}
