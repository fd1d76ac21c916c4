//! Envelope model
//!
//! Global scaling for stochastic and resonance output: a slow ease-in ramp
//! from 30% to full scale over `peak_time`, multiplied by a breathing wave.

use std::f64::consts::TAU;

use crate::util::{ease_in_quad, frequency, START_INTENSITY_MULTIPLIER};

/// Ramp + breathing factor at session time `elapsed`.
///
/// A non-positive `breathing_period` disables the breathing wave.
pub fn intensity_multiplier(
    elapsed: f64,
    peak_time: f64,
    breathing_amount: f64,
    breathing_period: f64,
) -> f64 {
    let progress = if peak_time <= 0.0 || elapsed >= peak_time {
        1.0
    } else {
        elapsed / peak_time
    };

    let eased = ease_in_quad(progress);
    // Lerp written from the top so full progress lands on exactly 1.0
    let base = 1.0 - (1.0 - START_INTENSITY_MULTIPLIER) * (1.0 - eased);

    let breathing = 1.0 + breathing_amount * (TAU * frequency(breathing_period) * elapsed).sin();

    (base * breathing).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_thirty_percent() {
        let m = intensity_multiplier(0.0, 60.0, 0.0, 15.0);
        assert!((m - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_monotone_until_peak_then_flat() {
        let mut prev = 0.0;
        for step in 0..=1200 {
            let t = step as f64 * 0.05;
            let m = intensity_multiplier(t, 30.0, 0.0, 15.0);
            assert!(m >= prev);
            prev = m;
            if t >= 30.0 {
                assert_eq!(m, 1.0);
            }
        }
    }

    #[test]
    fn test_ease_in_is_below_linear() {
        // Halfway through the ramp the eased progress is 0.25
        let m = intensity_multiplier(10.0, 20.0, 0.0, 15.0);
        assert!((m - (0.30 + 0.70 * 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_no_ramp_without_peak_time() {
        assert_eq!(intensity_multiplier(0.0, 0.0, 0.0, 15.0), 1.0);
        assert_eq!(intensity_multiplier(3.0, -1.0, 0.0, 15.0), 1.0);
    }

    #[test]
    fn test_breathing_wave() {
        // Quarter period: sin = 1
        let m = intensity_multiplier(2.5, 0.0, 0.2, 10.0);
        assert!((m - 1.2).abs() < 1e-12);
        let m = intensity_multiplier(7.5, 0.0, 0.2, 10.0);
        assert!((m - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_breathing_period_is_fail_soft() {
        let m = intensity_multiplier(4.0, 0.0, 0.5, 0.0);
        assert_eq!(m, 1.0);
    }
}
