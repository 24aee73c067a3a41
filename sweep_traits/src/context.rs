//! Seam between the activation ledger and whatever owns the tracked object.

/// Read-only view of a tracked object's shape and calibration status.
///
/// The ledger never owns the object; it only needs a handful of counters to
/// scope its freshness queries and to scale the outlier criterion, plus a
/// short name for log lines.
pub trait TrackedContext {
    /// Number of photo sensors physically present on the object.
    fn sensor_count(&self) -> usize;

    /// Number of lighthouse slots the runtime currently considers active.
    fn active_lighthouses(&self) -> usize;

    /// Whether the position of lighthouse `lh` has been solved.
    fn position_known(&self, lh: usize) -> bool;

    /// Short identifier used in diagnostics.
    fn name(&self) -> &str;
}
