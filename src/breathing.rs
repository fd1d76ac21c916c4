//! Breathing pulse generator
//!
//! Two sines at close frequencies, one per motor, so the motors drift in and
//! out of phase ("beating"). After `cycles` base periods the buzz either
//! rests for `breathing_pulse_gap` seconds or restarts in place.

use std::f64::consts::TAU;

use log::debug;

use crate::config::PatternConfig;
use crate::state::{Phase, Rumble};
use crate::util::frequency;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingPulse {
    /// Buzz unless resting
    pub phase: Phase,
    /// Time into the current buzz [s]
    pub buzz_time: f64,
    /// Time into the current rest [s]
    pub gap_time: f64,
}

impl BreathingPulse {
    pub fn new() -> Self {
        Self {
            phase: Phase::Buzz,
            buzz_time: 0.0,
            gap_time: 0.0,
        }
    }

    pub fn step(&mut self, dt: f64, config: &PatternConfig) -> Rumble {
        match self.phase {
            Phase::Buzz => {
                self.buzz_time += dt;

                let buzz_length =
                    f64::from(config.breathing_pulse_cycles) * config.breathing_pulse_period;
                if self.buzz_time >= buzz_length {
                    if config.breathing_pulse_gap > 0.0 {
                        self.phase = Phase::Gap;
                        self.gap_time = 0.0;
                        debug!("breathing pulse: resting {:.2}s", config.breathing_pulse_gap);
                        return Rumble::silent();
                    }
                    // Restart in place; keeps the counter bounded over long sessions
                    self.buzz_time = 0.0;
                }

                breathing_levels(self.buzz_time, config)
            }
            Phase::Gap => {
                self.gap_time += dt;
                if self.gap_time >= config.breathing_pulse_gap {
                    self.phase = Phase::Buzz;
                    self.buzz_time = 0.0;
                }
                Rumble::silent()
            }
        }
    }
}

impl Default for BreathingPulse {
    fn default() -> Self {
        Self::new()
    }
}

/// Left at the base frequency, right at base + beat, both swinging between
/// `breathing_pulse_min_intensity` and `max`
pub fn breathing_levels(t: f64, config: &PatternConfig) -> Rumble {
    let base_freq = frequency(config.breathing_pulse_period);
    let beat_freq = frequency(config.breathing_pulse_sync_period);

    let low = config.breathing_pulse_min_intensity;
    let high = config.max;
    let center = (high + low) / 2.0;
    let amplitude = (high - low) / 2.0;

    let left = center + amplitude * (TAU * base_freq * t).sin();
    let right = center + amplitude * (TAU * (base_freq + beat_freq) * t).sin();
    Rumble::new(left, right).clamped()
}
