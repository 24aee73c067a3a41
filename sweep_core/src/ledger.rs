//! Per-object activation ledger: optical records, inertial fusion, movement
//! and clock bookkeeping, freshness queries.

use std::sync::Arc;

use sweep_traits::TrackedContext;

use crate::config::Thresholds;
use crate::error::LedgerError;
use crate::stats::{CenterStat, norm_pdf};
use crate::timecode::extend_timecode;
use crate::util::{dist3, norm3};
use crate::{DEFAULT_TOLERANCE, TICK_FREQUENCY};

/// Maximum photo sensors on one tracked object.
pub const MAX_SENSORS: usize = 32;
/// Maximum supported base stations.
pub const MAX_LIGHTHOUSES: usize = 16;
/// The gen1 protocol only ever addresses two base stations.
pub const GEN1_LIGHTHOUSES: usize = 2;
/// Sweep planes per lighthouse.
pub const AXES: usize = 2;

/// IMU samples consumed before fusion starts.
const IMU_WARMUP: u32 = 30;
/// Forward light-timecode jump treated as a timing anomaly (ticks).
const LIGHT_JUMP_LIMIT: u64 = 480_000_000;
/// Light/IMU clock disagreement treated as a timing anomaly (seconds).
const CLOCK_DRIFT_LIMIT: f64 = 1.0;
/// Timing anomalies tolerated before ingest escalates to a fatal error.
const ANOMALY_LIMIT: u32 = 10;
/// External runtime clock units (microseconds) per hardware tick.
const MICROS_PER_TICK: f64 = 1e6 / TICK_FREQUENCY as f64;

/// One of the two orthogonal sweep planes of a lighthouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
}

impl Axis {
    /// Gen1 hardware encodes the plane in the low bit of the acode.
    #[inline]
    #[must_use]
    pub fn from_parity(acode: u8) -> Self {
        if acode & 1 == 0 { Self::X } else { Self::Y }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Which hardware protocol variant feeds this ledger. Pinned on first ingest;
/// the two ingest paths are mutually exclusive per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Generation {
    #[default]
    Unset,
    Gen1,
    Gen2,
}

/// Generation-1 sweep event as decoded by the acquisition layer.
#[derive(Debug, Clone, Copy)]
pub struct LightGen1 {
    pub sensor: usize,
    pub lighthouse: usize,
    /// Sweep code; the low bit selects the axis.
    pub acode: u8,
    /// Raw 32-bit hardware timecode, light clock domain.
    pub timecode: u32,
    /// Sweep angle in radians.
    pub angle: f64,
    /// Pulse length in seconds.
    pub length: f64,
}

/// Generation-2 sweep event.
#[derive(Debug, Clone, Copy)]
pub struct LightGen2 {
    pub sensor: usize,
    pub lighthouse: usize,
    pub axis: Axis,
    /// Raw 32-bit hardware timecode, light clock domain.
    pub timecode: u32,
    /// Sweep angle in radians.
    pub angle: f64,
}

/// Inertial sample in the IMU clock domain.
#[derive(Debug, Clone, Copy)]
pub struct ImuSample {
    /// Raw 32-bit hardware timecode, IMU clock domain.
    pub timecode: u32,
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
    pub mag: [f64; 3],
}

/// Last accepted reading for one sensor/lighthouse/axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpticalSlot {
    /// Last accepted sweep angle; `None` until the first acceptance.
    pub angle: Option<f64>,
    /// Reconstructed 64-bit timecode of that reading (0 = never stamped).
    pub timecode: u64,
    /// Pulse length in ticks (gen1 only; 0 = unseen).
    pub pulse_ticks: u32,
    /// Accepted-reading counter (gen1 only).
    pub hits: u32,
}

/// Freshness summary handed to the pose solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSummary {
    /// Individual readings newer than the tolerance window.
    pub measurements: u32,
    /// Lighthouses with at least one fresh reading.
    pub lighthouses: u32,
    /// Sensor slots (per lighthouse) with at least one fresh axis.
    pub axes: u32,
    /// Fresh readings per lighthouse and axis.
    pub per_lh_axis: [[u32; AXES]; MAX_LIGHTHOUSES],
}

impl Default for CoverageSummary {
    fn default() -> Self {
        Self {
            measurements: 0,
            lighthouses: 0,
            axes: 0,
            per_lh_axis: [[0; AXES]; MAX_LIGHTHOUSES],
        }
    }
}

/// Per-tracked-object sensor-activation ledger.
///
/// Owns the last accepted optical reading per sensor/lighthouse/axis, the
/// smoothed inertial state, and the clock/movement bookkeeping the pose
/// solver queries. Exactly one producer feeds a ledger; readers consult it
/// between ingest calls. Distinct objects are fully independent.
pub struct Activations {
    thresholds: Thresholds,
    ctx: Option<Arc<dyn TrackedContext>>,
    generation: Generation,

    slots: Box<[[[OpticalSlot; AXES]; MAX_LIGHTHOUSES]; MAX_SENSORS]>,
    centers: [[CenterStat; AXES]; MAX_LIGHTHOUSES],

    // Inertial fusion; accel doubles as the "seeded" flag.
    accel: Option<[f64; 3]>,
    gyro: [f64; 3],
    mag: [f64; 3],
    imu_warmup: u32,

    last_light: u64,
    last_imu: u64,
    last_movement: u64,
    last_light_change: u64,
    runtime_offset: f64,
    bad_time_count: u32,
}

impl core::fmt::Debug for Activations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Activations")
            .field("name", &self.name())
            .field("generation", &self.generation)
            .field("last_light", &self.last_light)
            .field("last_imu", &self.last_imu)
            .field("last_movement", &self.last_movement)
            .finish()
    }
}

impl Activations {
    /// Build a ledger with explicit thresholds and an optional back-reference
    /// to the owning object's context.
    #[must_use]
    pub fn new(thresholds: Thresholds, ctx: Option<Arc<dyn TrackedContext>>) -> Self {
        let mut this = Self {
            thresholds,
            ctx,
            generation: Generation::Unset,
            slots: Box::new([[[OpticalSlot::default(); AXES]; MAX_LIGHTHOUSES]; MAX_SENSORS]),
            centers: [[CenterStat::default(); AXES]; MAX_LIGHTHOUSES],
            accel: None,
            gyro: [0.0; 3],
            mag: [0.0; 3],
            imu_warmup: IMU_WARMUP,
            last_light: 0,
            last_imu: 0,
            last_movement: 0,
            last_light_change: 0,
            runtime_offset: 0.0,
            bad_time_count: 0,
        };
        this.reset();
        this
    }

    /// Build from a parsed config file, validating thresholds first.
    pub fn from_config(
        cfg: &sweep_config::Config,
        ctx: Option<Arc<dyn TrackedContext>>,
    ) -> crate::error::Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.thresholds.into(), ctx))
    }

    /// Reinitialize every record to the unseen baseline and restart the IMU
    /// warm-up. Thresholds and the context back-reference survive.
    pub fn reset(&mut self) {
        self.generation = Generation::Unset;
        *self.slots = [[[OpticalSlot::default(); AXES]; MAX_LIGHTHOUSES]; MAX_SENSORS];
        self.centers = [[CenterStat::default(); AXES]; MAX_LIGHTHOUSES];
        self.accel = None;
        self.gyro = [0.0; 3];
        self.mag = [0.0; 3];
        self.imu_warmup = IMU_WARMUP;
        self.last_light = 0;
        self.last_imu = 0;
        self.last_movement = 0;
        self.last_light_change = 0;
        self.runtime_offset = 0.0;
        self.bad_time_count = 0;
    }

    fn name(&self) -> &str {
        self.ctx
            .as_deref()
            .map_or("<unattached>", TrackedContext::name)
    }

    /// Reconstruct a 64-bit light-domain timecode from the wire's 32 bits.
    #[inline]
    #[must_use]
    pub fn long_timecode_light(&self, timecode: u32) -> u64 {
        extend_timecode(self.last_light, timecode)
    }

    /// Reconstruct a 64-bit IMU-domain timecode from the wire's 32 bits.
    #[inline]
    #[must_use]
    pub fn long_timecode_imu(&self, timecode: u32) -> u64 {
        extend_timecode(self.last_imu, timecode)
    }

    /// Accept or reject one angle reading and nudge the baseline either way
    /// (learning rate 0.1 on accept, 0.05 on reject). Returns true to accept.
    fn check_outlier(
        &mut self,
        sensor: usize,
        lh: usize,
        axis: usize,
        timecode: u64,
        angle: f64,
    ) -> bool {
        let slot = self.slots[sensor][lh][axis];
        let center = self.centers[lh][axis];
        let prev_was_unseen = slot.angle.is_none();

        let mut accept = true;

        // Rate-of-change gate. A repeated timecode for the same slot is an
        // infinite rate and always rejects.
        if slot.timecode != 0 {
            let dt = timecode.wrapping_sub(slot.timecode);
            if dt == 0 {
                accept = false;
            } else if let Some(old) = slot.angle {
                let rate = (old - angle).abs() / dt as f64 * TICK_FREQUENCY as f64;
                if rate > self.thresholds.filter_angle_per_sec {
                    accept = false;
                }
            }
        }

        // Until a baseline exists, everything that survives the rate gate is
        // accepted so the tracker can bootstrap.
        if accept && center.deviation != 0.0 {
            let dev = center.deviation.max(0.1);
            let pdf = norm_pdf(angle, center.mean, dev);
            let population = self
                .ctx
                .as_deref()
                .map_or(center.samples as usize, TrackedContext::sensor_count);
            let criterion = pdf * population as f64;
            if criterion < self.thresholds.outlier_criteria {
                accept = false;
                tracing::debug!(
                    name = self.name(),
                    sensor,
                    lh,
                    axis,
                    angle,
                    old = ?slot.angle,
                    pdf,
                    criterion,
                    "rejecting outlier"
                );
            }
        } else if !accept {
            tracing::debug!(
                name = self.name(),
                sensor,
                lh,
                axis,
                angle,
                old = ?slot.angle,
                "rejecting reading, angle changed too fast"
            );
        }

        let alpha = if accept { 0.1 } else { 0.05 };
        self.centers[lh][axis].update(alpha, prev_was_unseen, angle);
        accept
    }

    fn pin_generation(&mut self, wanted: Generation) -> Result<(), LedgerError> {
        match self.generation {
            Generation::Unset => {
                self.generation = wanted;
                Ok(())
            }
            pinned if pinned == wanted => Ok(()),
            pinned => Err(LedgerError::GenerationMismatch {
                pinned,
                event: wanted,
            }),
        }
    }

    /// Ingest a generation-1 sweep event.
    ///
    /// `Ok(true)` stored the reading, `Ok(false)` rejected it (outlier or
    /// out-of-range index) without touching the slot. Timing anomalies are
    /// logged and counted; past the limit the call fails with
    /// [`LedgerError::ClockUnstable`].
    pub fn add_gen1(&mut self, ev: &LightGen1) -> Result<bool, LedgerError> {
        self.pin_generation(Generation::Gen1)?;
        if ev.sensor >= MAX_SENSORS || ev.lighthouse >= GEN1_LIGHTHOUSES {
            return Ok(false);
        }

        let axis = Axis::from_parity(ev.acode).index();
        let timecode = self.long_timecode_light(ev.timecode);
        if !self.check_outlier(ev.sensor, ev.lighthouse, axis, timecode, ev.angle) {
            return Ok(false);
        }

        let move_angle = self.thresholds.move_angle;
        let slot = &mut self.slots[ev.sensor][ev.lighthouse][axis];
        slot.hits += 1;
        let moved = slot.pulse_ticks == 0
            || slot
                .angle
                .is_some_and(|old| (old - ev.angle).abs() > move_angle);
        if moved {
            self.last_light_change = timecode;
            self.last_movement = timecode;
        }
        slot.angle = Some(ev.angle);
        slot.timecode = timecode;
        slot.pulse_ticks = (ev.length * TICK_FREQUENCY as f64).round() as u32;

        if timecode > self.last_light {
            if self.last_light != 0 && timecode - self.last_light > LIGHT_JUMP_LIMIT {
                self.bad_time_count += 1;
                tracing::warn!(
                    name = self.name(),
                    jump = timecode - self.last_light,
                    "light timecode jumped forward"
                );
            }
            self.last_light = timecode;
        }

        if self.last_imu != 0 {
            let drift =
                (timecode as f64 - self.last_imu as f64).abs() / TICK_FREQUENCY as f64;
            if drift > CLOCK_DRIFT_LIMIT {
                self.bad_time_count += 1;
                tracing::warn!(
                    name = self.name(),
                    light_s = timecode as f64 / TICK_FREQUENCY as f64,
                    imu_s = self.last_imu as f64 / TICK_FREQUENCY as f64,
                    "light and IMU clocks disagree"
                );
            }
        }
        if self.bad_time_count > ANOMALY_LIMIT {
            return Err(LedgerError::ClockUnstable {
                anomalies: self.bad_time_count,
            });
        }
        Ok(true)
    }

    /// Ingest a generation-2 sweep event.
    ///
    /// `Ok(true)` stored the reading; `Ok(false)` rejected it. No pulse
    /// length or hit counting exists in this generation.
    pub fn add_gen2(&mut self, ev: &LightGen2) -> Result<bool, LedgerError> {
        self.pin_generation(Generation::Gen2)?;
        if ev.sensor >= MAX_SENSORS || ev.lighthouse >= MAX_LIGHTHOUSES {
            return Ok(false);
        }

        let axis = ev.axis.index();
        let timecode = self.long_timecode_light(ev.timecode);
        if !self.check_outlier(ev.sensor, ev.lighthouse, axis, timecode, ev.angle) {
            return Ok(false);
        }

        let move_angle = self.thresholds.move_angle;
        let slot = &mut self.slots[ev.sensor][ev.lighthouse][axis];
        match slot.angle {
            Some(old) if (old - ev.angle).abs() > move_angle => {
                self.last_light_change = timecode;
                self.last_movement = timecode;
            }
            None => self.last_light_change = timecode,
            Some(_) => {}
        }
        slot.angle = Some(ev.angle);
        slot.timecode = timecode;

        if timecode > self.last_light {
            self.last_light = timecode;
        }
        Ok(true)
    }

    /// Ingest one IMU sample: EMA fusion plus movement detection.
    ///
    /// The first 30 samples only advance `last_imu`; the sample after
    /// warm-up seeds the averages and stamps a movement.
    pub fn add_imu(&mut self, ev: &ImuSample) {
        let timecode = self.long_timecode_imu(ev.timecode);
        self.last_imu = timecode;

        if self.imu_warmup > 0 {
            self.imu_warmup -= 1;
            return;
        }

        match self.accel {
            None => {
                self.accel = Some(ev.accel);
                self.gyro = ev.gyro;
                self.mag = ev.mag;
                self.last_movement = timecode;
            }
            Some(ref mut accel) => {
                for i in 0..3 {
                    accel[i] = 0.98 * accel[i] + 0.02 * ev.accel[i];
                    self.gyro[i] = 0.98 * self.gyro[i] + 0.02 * ev.gyro[i];
                    self.mag[i] = 0.98 * self.mag[i] + 0.02 * ev.mag[i];
                }
            }
        }

        let accel_moved = self
            .accel
            .is_some_and(|a| dist3(&a, &ev.accel) > self.thresholds.move_accel);
        if norm3(&ev.gyro) > self.thresholds.move_gyro || accel_moved {
            self.last_movement = timecode;
            tracing::trace!(name = self.name(), timecode, "inertial movement");
        }
    }

    /// Blend a wall/runtime clock observation (microseconds) into the
    /// tick-to-runtime offset. Never fails.
    pub fn register_runtime(&mut self, timecode: u64, runtime_clock: u64) {
        let offset = runtime_clock as f64 - timecode as f64 * MICROS_PER_TICK;
        if self.runtime_offset == 0.0 {
            self.runtime_offset = offset;
        } else {
            self.runtime_offset = 0.9 * self.runtime_offset + 0.1 * offset;
        }
    }

    /// Map a tick-domain timecode onto the external runtime clock.
    #[must_use]
    pub fn runtime(&self, timecode: u64) -> u64 {
        (self.runtime_offset + timecode as f64 * MICROS_PER_TICK) as u64
    }

    /// Timecode of the last valid reading for a slot, `None` when unseen.
    #[must_use]
    pub fn last_reading(&self, sensor: usize, lh: usize, axis: Axis) -> Option<u64> {
        let slot = &self.slots[sensor][lh][axis.index()];
        if self.generation != Generation::Gen2 && lh < GEN1_LIGHTHOUSES && slot.pulse_ticks == 0 {
            return None;
        }
        slot.angle?;
        Some(slot.timecode)
    }

    /// Ticks between a slot's last reading and `last_light`. Unseen slots
    /// and readings newer than `last_light` report `u32::MAX`.
    #[must_use]
    pub fn time_since_last_reading(&self, sensor: usize, lh: usize, axis: Axis) -> u64 {
        let Some(last) = self.last_reading(sensor, lh, axis) else {
            return u64::from(u32::MAX);
        };
        if last > self.last_light {
            return u64::from(u32::MAX);
        }
        self.last_light - last
    }

    /// Whether a slot's reading is at most `tolerance` ticks old.
    #[must_use]
    pub fn is_reading_valid(&self, tolerance: u64, sensor: usize, lh: usize, axis: Axis) -> bool {
        self.time_since_last_reading(sensor, lh, axis) <= tolerance
    }

    /// Whether both axes of a sensor/lighthouse pair are seen and within
    /// `tolerance` ticks of `now`.
    #[must_use]
    pub fn is_pair_valid(&self, tolerance: u64, now: u64, sensor: usize, lh: usize) -> bool {
        let pair = &self.slots[sensor][lh];
        if self.generation != Generation::Gen2
            && (pair[0].pulse_ticks == 0 || pair[1].pulse_ticks == 0)
        {
            return false;
        }
        if pair[0].angle.is_none() || pair[1].angle.is_none() {
            return false;
        }
        now.wrapping_sub(pair[0].timecode) <= tolerance
            && now.wrapping_sub(pair[1].timecode) <= tolerance
    }

    /// Most recent event timecode across both clock domains.
    #[must_use]
    pub fn last_time(&self) -> u64 {
        self.last_light.max(self.last_imu)
    }

    /// Ticks since the last detected movement; 0 until anything has moved.
    #[must_use]
    pub fn stationary_time(&self) -> u64 {
        if self.last_movement == 0 {
            return 0;
        }
        let last = self.last_time();
        debug_assert!(self.last_movement <= last);
        last.saturating_sub(self.last_movement)
    }

    /// Count fresh readings across active, positioned lighthouses.
    /// `tolerance == 0` selects [`DEFAULT_TOLERANCE`].
    #[must_use]
    pub fn valid_counts(&self, tolerance: u64) -> CoverageSummary {
        let window = if tolerance == 0 {
            DEFAULT_TOLERANCE
        } else {
            tolerance
        };
        let mut summary = CoverageSummary::default();
        let Some(ctx) = self.ctx.as_deref() else {
            return summary;
        };

        let lighthouses = ctx.active_lighthouses().min(MAX_LIGHTHOUSES);
        let sensors = ctx.sensor_count().min(MAX_SENSORS);
        for lh in 0..lighthouses {
            if !ctx.position_known(lh) {
                continue;
            }
            let mut seen_lh = false;
            for sensor in 0..sensors {
                let mut seen_axis = false;
                for axis in [Axis::X, Axis::Y] {
                    // Explicitly skip unseen slots; the u32::MAX sentinel of
                    // time_since_last_reading would pass very wide windows.
                    let fresh = self.last_reading(sensor, lh, axis).is_some_and(|last| {
                        last <= self.last_light && self.last_light - last < window
                    });
                    if fresh {
                        summary.measurements += 1;
                        if !seen_axis {
                            summary.axes += 1;
                        }
                        if !seen_lh {
                            summary.lighthouses += 1;
                        }
                        seen_axis = true;
                        seen_lh = true;
                        summary.per_lh_axis[lh][axis.index()] += 1;
                    }
                }
            }
        }
        summary
    }

    /// Mean squared angle difference over every slot both ledgers hold gen1
    /// data for. `None` when no slot is comparable.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0u32;
        for sensor in 0..MAX_SENSORS {
            for lh in 0..GEN1_LIGHTHOUSES {
                for axis in 0..AXES {
                    let a = &self.slots[sensor][lh][axis];
                    let b = &other.slots[sensor][lh][axis];
                    if a.pulse_ticks > 0 && b.pulse_ticks > 0
                        && let (Some(x), Some(y)) = (a.angle, b.angle)
                    {
                        let d = x - y;
                        sum += d * d;
                        count += 1;
                    }
                }
            }
        }
        (count > 0).then(|| sum / f64::from(count))
    }

    // Read-only accessors for the pose solver and diagnostics.

    /// Last accepted reading for one sensor/lighthouse/axis.
    #[must_use]
    pub fn slot(&self, sensor: usize, lh: usize, axis: Axis) -> &OpticalSlot {
        &self.slots[sensor][lh][axis.index()]
    }

    /// Smoothed accelerometer vector; `None` until the IMU is seeded.
    #[must_use]
    pub fn accel(&self) -> Option<[f64; 3]> {
        self.accel
    }

    /// Smoothed gyro vector.
    #[must_use]
    pub fn gyro(&self) -> [f64; 3] {
        self.gyro
    }

    /// Smoothed magnetometer vector.
    #[must_use]
    pub fn mag(&self) -> [f64; 3] {
        self.mag
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn last_light(&self) -> u64 {
        self.last_light
    }

    #[must_use]
    pub fn last_imu(&self) -> u64 {
        self.last_imu
    }

    #[must_use]
    pub fn last_movement(&self) -> u64 {
        self.last_movement
    }

    /// Timecode of the last accepted reading that changed an angle.
    #[must_use]
    pub fn last_light_change(&self) -> u64 {
        self.last_light_change
    }
}
