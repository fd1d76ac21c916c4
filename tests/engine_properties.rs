use proptest::prelude::*;
use rumble_pattern::envelope::intensity_multiplier;
use rumble_pattern::{Mode, PatternConfig, PatternEngine, Phase};

fn mode_strategy() -> impl Strategy<Value = Mode> {
    (0..Mode::ALL.len()).prop_map(|i| Mode::ALL[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn output_stays_in_device_range(
        seed in any::<u64>(),
        mode in mode_strategy(),
        weak in 0.0..400.0f64,
        strong in 0.0..400.0f64,
        max in 0.0..400.0f64,
        breathing_amount in 0.0..2.0f64,
        breathing_period in -5.0..30.0f64,
        resonance_intensity in 0.0..3.0f64,
        trigger_intensity in 0.0..3.0f64,
        dt in 0.001..0.2f64,
    ) {
        let config = PatternConfig {
            weak,
            strong,
            max,
            breathing_amount,
            breathing_period,
            resonance_probability: 0.5,
            resonance_check_interval: 1.0,
            resonance_intensity,
            trigger_intensity,
            trigger_delay: 0.0,
            mode,
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, seed).unwrap();
        for _ in 0..1500 {
            let out = engine.tick(dt);
            prop_assert!((0.0..=255.0).contains(&out.left));
            prop_assert!((0.0..=255.0).contains(&out.right));
        }
    }

    #[test]
    fn envelope_is_monotone_without_breathing(
        peak_time in 0.1..600.0f64,
        a in 0.0..1.0f64,
        b in 0.0..1.0f64,
    ) {
        let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
        let m1 = intensity_multiplier(t1 * peak_time * 1.5, peak_time, 0.0, 15.0);
        let m2 = intensity_multiplier(t2 * peak_time * 1.5, peak_time, 0.0, 15.0);
        prop_assert!(m1 <= m2);
        prop_assert_eq!(intensity_multiplier(peak_time, peak_time, 0.0, 15.0), 1.0);
    }

    #[test]
    fn breathing_pulse_stays_between_bounds(
        seed in any::<u64>(),
        low in 0.0..255.0f64,
        high in 0.0..255.0f64,
        period in 0.5..20.0f64,
        sync_period in 1.0..60.0f64,
        gap in 0.0..2.0f64,
    ) {
        let config = PatternConfig {
            max: high,
            breathing_pulse_min_intensity: low,
            breathing_pulse_period: period,
            breathing_pulse_sync_period: sync_period,
            breathing_pulse_gap: gap,
            mode: Mode::BreathingPulse,
            ..Default::default()
        };
        let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
        let mut engine = PatternEngine::seeded(config, seed).unwrap();
        for _ in 0..3000 {
            let out = engine.tick(0.01);
            if engine.state().breathing.phase == Phase::Gap {
                prop_assert!(out.is_silent());
            } else if !out.is_silent() {
                prop_assert!(out.left >= lo - 1e-9 && out.left <= hi + 1e-9);
                prop_assert!(out.right >= lo - 1e-9 && out.right <= hi + 1e-9);
            }
        }
    }
}

#[test]
fn never_three_buzzes_on_one_motor() {
    for seed in 0..20 {
        let config = PatternConfig {
            alternation_bias: 0.0,
            resonance_enabled: false,
            buzz_min: 20.0,
            buzz_max: 60.0,
            gap_min: 10.0,
            max_gap: 40.0,
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, seed).unwrap();
        let mut selections = Vec::new();
        let mut previous = Phase::Gap;
        for _ in 0..20_000 {
            engine.tick(0.01);
            let stochastic = &engine.state().stochastic;
            if previous == Phase::Gap && stochastic.phase == Phase::Buzz {
                selections.push(stochastic.active_motor);
            }
            previous = stochastic.phase;
        }
        assert!(selections.len() > 100);
        for run in selections.windows(3) {
            assert!(!(run[0] == run[1] && run[1] == run[2]));
        }
    }
}
