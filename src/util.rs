//! Shared constants and small numeric helpers

use rand::Rng;

/// Nominal driver tick interval [ms]
pub const UPDATE_INTERVAL_MS: u64 = 10;
/// Session-start ramp applied to stochastic buzzes [ms]
pub const STARTUP_RAMP_MS: f64 = 40.0;
/// End-of-session fade-out applied by the driver [ms]
pub const FADEOUT_MS: f64 = 500.0;
/// Fade-in after a motor hand-off [ms]
pub const CROSSFADE_MS: f64 = 100.0;
/// Full-scale motor intensity
pub const MAX_INTENSITY: f64 = 255.0;
/// Envelope multiplier at session start, before the ramp
pub const START_INTENSITY_MULTIPLIER: f64 = 0.30;

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Clamp to the motor range [0, 255]
pub fn clamp_intensity(value: f64) -> f64 {
    clamp(value, 0.0, MAX_INTENSITY)
}

/// Quadratic ease-in: slow start, accelerating rise
pub fn ease_in_quad(t: f64) -> f64 {
    t * t
}

/// Frequency of a period in seconds; non-positive periods yield 0
pub fn frequency(period: f64) -> f64 {
    if period > 0.0 {
        1.0 / period
    } else {
        0.0
    }
}

/// Uniform draw between `a` and `b` in either order.
///
/// Unlike `gen_range` this never panics on an empty or reversed range.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    a + (b - a) * rng.gen::<f64>()
}

/// `(min, max)` of two bounds that may arrive swapped
pub fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
