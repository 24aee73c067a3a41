use std::sync::Arc;

use proptest::prelude::*;
use sweep_core::ledger::{Activations, Axis, ImuSample, LightGen1, LightGen2};
use sweep_core::mocks::FixedContext;
use sweep_core::timecode::extend_timecode;
use sweep_core::Thresholds;

fn ledger_with_ctx() -> Activations {
    Activations::new(
        Thresholds::default(),
        Some(Arc::new(FixedContext::new(32, 16))),
    )
}

prop_compose! {
    // Strictly increasing 64-bit tick sequence with every step well inside
    // the half-wrap window the reconstruction can disambiguate.
    fn monotonic_truth()(
        start in 0u64..(1u64 << 40),
        steps in prop::collection::vec(1u64..(1u64 << 30), 1..50),
    ) -> (u64, Vec<u64>) {
        (start, steps)
    }
}

proptest! {
    #[test]
    fn timecode_reconstruction_recovers_monotonic_truth((start, steps) in monotonic_truth()) {
        let mut prev = start;
        let mut truth = start;
        for step in steps {
            truth += step;
            let got = extend_timecode(prev, truth as u32);
            prop_assert_eq!(got, truth);
            prev = got;
        }
    }

    #[test]
    fn coverage_is_monotonic_in_tolerance(
        gaps in prop::collection::vec(1u64..1_000_000, 1..=32),
        angles in prop::collection::vec(-1.0f64..1.0, 32),
        tol in 1u64..10_000_000,
        extra in 0u64..10_000_000,
    ) {
        let mut led = ledger_with_ctx();
        // One event per slot and per statistical center, so every reading
        // bootstraps in regardless of the generated angle.
        let mut tc = 1_000u64;
        let n = gaps.len();
        for (i, gap) in gaps.into_iter().enumerate() {
            tc += gap;
            let stored = led
                .add_gen2(&LightGen2 {
                    sensor: i,
                    lighthouse: i / 2,
                    axis: if i % 2 == 0 { Axis::X } else { Axis::Y },
                    timecode: tc as u32,
                    angle: angles[i],
                })
                .unwrap();
            prop_assert!(stored);
        }

        let narrow = led.valid_counts(tol);
        let wide = led.valid_counts(tol + extra);
        prop_assert!(narrow.measurements <= wide.measurements);
        prop_assert!(narrow.lighthouses <= wide.lighthouses);
        prop_assert!(narrow.axes <= wide.axes);

        // The whole trace spans under 32M ticks, so a wide enough window
        // sees every reading.
        prop_assert_eq!(led.valid_counts(100_000_000).measurements, n as u32);
    }

    #[test]
    fn gen1_difference_is_symmetric(
        left in prop::collection::vec((0usize..32, 0usize..2, 0u8..4, -0.5f64..0.5), 0..40),
        right in prop::collection::vec((0usize..32, 0usize..2, 0u8..4, -0.5f64..0.5), 0..40),
    ) {
        let mut a = ledger_with_ctx();
        let mut b = ledger_with_ctx();
        for (led, events) in [(&mut a, &left), (&mut b, &right)] {
            let mut tc = 1_000u32;
            for &(sensor, lighthouse, acode, angle) in events {
                tc += 4_800_000;
                led.add_gen1(&LightGen1 {
                    sensor,
                    lighthouse,
                    acode,
                    timecode: tc,
                    angle,
                    length: 1e-4,
                })
                .unwrap();
            }
        }
        prop_assert_eq!(a.difference(&b), b.difference(&a));
    }

    #[test]
    fn stationary_time_grows_while_still(
        gaps in prop::collection::vec(1u32..100_000, 1..80),
    ) {
        let mut led = ledger_with_ctx();
        let mut tc = 1_000u32;
        // Warm-up plus the seeding sample.
        for _ in 0..31 {
            led.add_imu(&ImuSample {
                timecode: tc,
                accel: [0.0, 0.0, 9.8],
                gyro: [0.0; 3],
                mag: [0.0; 3],
            });
            tc += 4_800;
        }

        let mut previous = led.stationary_time();
        for gap in gaps {
            tc += gap;
            led.add_imu(&ImuSample {
                timecode: tc,
                accel: [0.0, 0.0, 9.8],
                gyro: [0.0; 3],
                mag: [0.0; 3],
            });
            let now = led.stationary_time();
            prop_assert!(now >= previous);
            previous = now;
        }
    }
}
