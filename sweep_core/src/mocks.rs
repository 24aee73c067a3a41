//! Test and helper mocks for sweep_core

use sweep_traits::TrackedContext;

/// Fixed-shape tracked object: `sensors` photo sensors, `lighthouses`
/// active base stations, every position solved (or none, see `positioned`).
pub struct FixedContext {
    pub sensors: usize,
    pub lighthouses: usize,
    pub positioned: bool,
    pub name: String,
}

impl FixedContext {
    #[must_use]
    pub fn new(sensors: usize, lighthouses: usize) -> Self {
        Self {
            sensors,
            lighthouses,
            positioned: true,
            name: "mock".to_owned(),
        }
    }

    /// Same shape, but no lighthouse has a known position.
    #[must_use]
    pub fn unpositioned(sensors: usize, lighthouses: usize) -> Self {
        Self {
            positioned: false,
            ..Self::new(sensors, lighthouses)
        }
    }
}

impl TrackedContext for FixedContext {
    fn sensor_count(&self) -> usize {
        self.sensors
    }
    fn active_lighthouses(&self) -> usize {
        self.lighthouses
    }
    fn position_known(&self, _lh: usize) -> bool {
        self.positioned
    }
    fn name(&self) -> &str {
        &self.name
    }
}
