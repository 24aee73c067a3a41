//! Online exponentially-weighted baseline for the outlier filter.

/// Running mean/deviation of accepted angles for one lighthouse/axis,
/// shared by every sensor on the object.
///
/// `samples == 0` iff `deviation == 0` iff nothing has been accepted yet;
/// once seeded, the averages decay exponentially and only a full ledger
/// reset clears them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CenterStat {
    pub mean: f64,
    pub deviation: f64,
    pub samples: u32,
}

impl CenterStat {
    /// Fold `angle` into the running baseline with learning rate `alpha`.
    ///
    /// `prev_was_unseen` marks the first reading for a sensor slot; it grows
    /// the effective population without touching the averages.
    pub fn update(&mut self, alpha: f64, prev_was_unseen: bool, angle: f64) {
        if self.samples == 0 {
            self.samples = 1;
            self.mean = angle;
            self.deviation = 0.0;
            return;
        }

        let beta = 1.0 - alpha;
        self.mean *= beta;
        self.deviation *= beta;
        if prev_was_unseen {
            self.samples += 1;
        }

        // Deviation accumulates against the decayed pre-update mean,
        // online-variance style.
        let var = self.mean - angle;
        self.deviation += alpha * var * var;
        self.mean += alpha * angle;
    }
}

/// Gaussian probability density of `x` under `N(mean, std)`.
#[inline]
#[must_use]
pub fn norm_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let scale = 1.0 / core::f64::consts::TAU.sqrt();
    let ratio = (x - mean) / std;
    scale * (-0.5 * ratio * ratio).exp()
}

#[cfg(test)]
mod tests {
    use super::{CenterStat, norm_pdf};

    #[test]
    fn first_sample_seeds_exactly() {
        let mut c = CenterStat::default();
        c.update(0.1, true, 0.42);
        assert_eq!(c.samples, 1);
        assert!((c.mean - 0.42).abs() < 1e-12);
        assert_eq!(c.deviation, 0.0);
    }

    #[test]
    fn constant_stream_converges_tight() {
        let mut c = CenterStat::default();
        for _ in 0..100 {
            c.update(0.1, false, 0.2);
        }
        // The decayed pre-update mean differs from the sample by alpha*mean,
        // so deviation settles at a small positive floor instead of zero.
        assert!((c.mean - 0.2).abs() < 1e-9);
        assert!(c.deviation > 0.0);
        assert!(c.deviation < 1e-3);
    }

    #[test]
    fn unseen_slots_grow_population() {
        let mut c = CenterStat::default();
        c.update(0.1, true, 0.0);
        c.update(0.1, true, 0.01);
        c.update(0.1, false, 0.02);
        assert_eq!(c.samples, 2);
    }

    #[test]
    fn outlier_inflates_deviation() {
        let mut c = CenterStat::default();
        for _ in 0..50 {
            c.update(0.1, false, 0.0);
        }
        let before = c.deviation;
        c.update(0.05, false, 5.0);
        assert!(c.deviation > before + 1.0);
    }

    #[test]
    fn pdf_peaks_at_mean() {
        let peak = norm_pdf(0.0, 0.0, 1.0);
        assert!((peak - 0.3989422804014327).abs() < 1e-12);
        assert!(norm_pdf(1.0, 0.0, 1.0) < peak);
        assert!((norm_pdf(1.0, 0.0, 1.0) - norm_pdf(-1.0, 0.0, 1.0)).abs() < 1e-15);
    }
}
