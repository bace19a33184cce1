use ph_core::{
    CalibrationModel, CalibrationPoint, DoseController, DoseState, MovingAverage, PumpCommand,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn filter_mean_stays_within_window_bounds(
        cap in 1usize..32,
        samples in prop::collection::vec(0.0f32..5.0, 1..100),
    ) {
        let mut f = MovingAverage::new(cap);
        for (i, s) in samples.iter().enumerate() {
            let m = f.push(*s);
            let start = (i + 1).saturating_sub(cap);
            let window = &samples[start..=i];
            let lo = window.iter().cloned().fold(f32::INFINITY, f32::min);
            let hi = window.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(m >= lo - 1e-4 && m <= hi + 1e-4, "mean {} outside [{}, {}]", m, lo, hi);
        }
    }

    #[test]
    fn constant_input_converges_exactly(cap in 1usize..32, v in 0.0f32..5.0, before in 0.0f32..5.0) {
        let mut f = MovingAverage::new(cap);
        f.push(before);
        let mut m = 0.0;
        for _ in 0..cap {
            m = f.push(v);
        }
        prop_assert!((m - v).abs() < 1e-4);
    }

    #[test]
    fn partial_window_mean_is_unbiased(cap in 2usize..32, v in 0.1f32..5.0) {
        let mut f = MovingAverage::new(cap);
        for k in 1..cap {
            let m = f.push(v);
            prop_assert_eq!(f.len(), k);
            prop_assert!((m - v).abs() < 1e-4);
        }
    }

    #[test]
    fn applied_ph_is_always_in_range(
        v1 in 0.0f32..5.0, v2 in 0.0f32..5.0, v3 in 0.0f32..5.0,
        probe in -10.0f32..10.0,
    ) {
        let m = CalibrationModel::fit(&[
            CalibrationPoint::new(v1, 4.0),
            CalibrationPoint::new(v2, 7.0),
            CalibrationPoint::new(v3, 10.0),
        ]);
        let ph = m.apply(probe);
        prop_assert!((0.0..=14.0).contains(&ph));
    }

    #[test]
    fn never_both_active_and_gap_respected(
        phs in prop::collection::vec(0.0f32..14.0, 1..200),
        step_ms in 1u64..5_000,
    ) {
        let c = DoseController::default();
        let gap = c.dosing().min_gap_ms;
        let mut s = DoseState::default();
        let mut last_fire: Option<u64> = None;
        for (i, ph) in phs.iter().enumerate() {
            let now = (i as u64 + 1) * step_ms;
            let cmd = c.step(&mut s, *ph, now);
            prop_assert!(!(s.base_active && s.acid_active));
            if cmd != PumpCommand::None {
                if let Some(prev) = last_fire {
                    prop_assert!(now - prev > gap);
                }
                prop_assert!(now > gap);
                last_fire = Some(now);
                prop_assert_eq!(s.last_dose_ms, now);
            }
        }
    }

    #[test]
    fn dead_band_never_doses(ph in 6.46f32..7.54, now in 0u64..1_000_000) {
        let c = DoseController::default();
        let mut s = DoseState::default();
        prop_assert_eq!(c.step(&mut s, ph, now), PumpCommand::None);
    }
}
