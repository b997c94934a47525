//! Property-based tests for calibration: capture extremes and normalization bounds.

#[cfg(test)]
mod proptest_calibration {
    use paddle_calibration::{ADC_MAX, CalibrationEngine, CalibrationRange, normalize};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        // --- Uncalibrated: identity for every 12-bit sample ---

        #[test]
        fn uncalibrated_is_identity(
            raw in 0u16..=ADC_MAX,
            min in any::<u16>(),
            max in any::<u16>(),
        ) {
            let engine = CalibrationEngine::new();
            prop_assert_eq!(engine.normalize(raw, min, max), raw);
        }

        // --- Calibrated: output always within [0, ADC_MAX] ---

        #[test]
        fn output_always_bounded(
            raw in 0u16..=ADC_MAX,
            min in 0u16..=ADC_MAX,
            max in 0u16..=ADC_MAX,
        ) {
            let out = normalize(raw, min, max);
            prop_assert!(out <= ADC_MAX, "normalize({}, {}, {}) = {} exceeds ADC_MAX", raw, min, max, out);
        }

        // --- Below min clamps to zero, above max clamps to full scale ---

        #[test]
        fn at_or_below_min_is_zero(
            min in 0u16..ADC_MAX,
            spread in 1u16..=ADC_MAX,
            below in 0u16..=ADC_MAX,
        ) {
            let max = min.saturating_add(spread).min(ADC_MAX);
            prop_assume!(max > min);
            let raw = below.min(min);
            prop_assert_eq!(normalize(raw, min, max), 0);
        }

        #[test]
        fn at_or_above_max_is_full_scale(
            min in 0u16..ADC_MAX,
            spread in 1u16..=ADC_MAX,
            above in 0u16..=ADC_MAX,
        ) {
            let max = min.saturating_add(spread).min(ADC_MAX);
            prop_assume!(max > min);
            let raw = above.max(max);
            prop_assert_eq!(normalize(raw, min, max), ADC_MAX);
        }

        // --- Monotonic inside the range ---

        #[test]
        fn monotonic_in_raw(
            min in 0u16..2000,
            max in 2001u16..=ADC_MAX,
            a in 0u16..=ADC_MAX,
            b in 0u16..=ADC_MAX,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(normalize(lo, min, max) <= normalize(hi, min, max));
        }

        // --- Degenerate and inverted ranges never panic and yield zero ---

        #[test]
        fn degenerate_range_is_zero(raw in any::<u16>(), bound in any::<u16>()) {
            prop_assert_eq!(normalize(raw, bound, bound), 0);
        }

        #[test]
        fn inverted_range_is_zero(raw in any::<u16>(), max in 0u16..4000, gap in 1u16..100) {
            let min = max + gap;
            prop_assert_eq!(normalize(raw, min, max), 0);
        }

        // --- Capture: committed range equals the observed extremes ---

        #[test]
        fn capture_tracks_extremes(
            samples in proptest::collection::vec((0u16..=ADC_MAX, 0u16..=ADC_MAX), 1..64),
        ) {
            let mut engine = CalibrationEngine::new();
            prop_assert!(engine.start(u64::MAX, 0).is_ok());
            for (i, &(l, r)) in samples.iter().enumerate() {
                prop_assert_eq!(engine.observe(l, r, i as u64), None);
            }
            let range = engine.stop();
            prop_assert!(range.is_ok());
            let range = range.unwrap_or_default();

            let left_min = samples.iter().map(|s| s.0).min().unwrap_or(0);
            let left_max = samples.iter().map(|s| s.0).max().unwrap_or(0);
            let right_min = samples.iter().map(|s| s.1).min().unwrap_or(0);
            let right_max = samples.iter().map(|s| s.1).max().unwrap_or(0);
            prop_assert_eq!(range, CalibrationRange::new(left_min, left_max, right_min, right_max));
        }

        // --- set(get()) is a no-op ---

        #[test]
        fn set_get_roundtrip(
            l0 in any::<u16>(), l1 in any::<u16>(),
            r0 in any::<u16>(), r1 in any::<u16>(),
            calibrated in any::<bool>(),
            raw in 0u16..=ADC_MAX,
        ) {
            let range = CalibrationRange { left_min: l0, left_max: l1, right_min: r0, right_max: r1, calibrated };
            let mut engine = CalibrationEngine::with_range(range);
            let before = (engine.normalize_left(raw), engine.normalize_right(raw));
            engine.set(engine.get());
            prop_assert_eq!(engine.get(), range);
            prop_assert_eq!((engine.normalize_left(raw), engine.normalize_right(raw)), before);
        }
    }
}
