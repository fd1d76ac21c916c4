//! Stochastic pattern engine
//!
//! Two-phase state machine: a silent gap followed by a single-motor buzz,
//! with randomized durations, biased motor alternation and a sympathetic
//! kick on the idle motor during long strong buzzes.

use std::collections::VecDeque;

use log::debug;
use rand::Rng;
use rand_distr::{Beta, Distribution};

use crate::config::PatternConfig;
use crate::state::{Motor, Phase, Rumble};
use crate::util::{clamp, clamp_intensity, uniform, CROSSFADE_MS, STARTUP_RAMP_MS};

/// Number of recent motor selections considered for alternation
pub const HISTORY_LEN: usize = 5;
/// Consecutive buzzes on one motor before a switch is forced
pub const FORCE_SWITCH_AFTER: u32 = 2;

/// Shape parameters of the gap-length distribution, biased towards short gaps
pub const GAP_SHAPE_ALPHA: f64 = 2.0;
pub const GAP_SHAPE_BETA: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StochasticState {
    pub phase: Phase,
    /// Time spent in the current phase [s]; frozen while resonance runs
    pub phase_elapsed: f64,
    /// Drawn length of the current phase [s]
    pub phase_duration: f64,
    /// Motor of the current (or most recent) buzz
    pub active_motor: Motor,
    pub history: VecDeque<Motor>,
    pub left_consecutive: u32,
    pub right_consecutive: u32,
    /// Session time of the last gap -> buzz hand-off [s]
    pub motor_switch_time: f64,
}

impl StochasticState {
    /// Zero-length gap, so the first tick starts a buzz
    pub fn new() -> Self {
        Self {
            phase: Phase::Gap,
            phase_elapsed: 0.0,
            phase_duration: 0.0,
            active_motor: Motor::Left,
            history: VecDeque::with_capacity(HISTORY_LEN),
            left_consecutive: 0,
            right_consecutive: 0,
            motor_switch_time: 0.0,
        }
    }

    fn consecutive(&self, motor: Motor) -> u32 {
        match motor {
            Motor::Left => self.left_consecutive,
            Motor::Right => self.right_consecutive,
        }
    }

    fn count(&self, motor: Motor) -> usize {
        self.history.iter().filter(|&&m| m == motor).count()
    }

    /// Pick the motor for the next buzz.
    pub fn select_next_motor<R: Rng + ?Sized>(&self, alternation_bias: f64, rng: &mut R) -> Motor {
        for motor in [Motor::Left, Motor::Right] {
            if self.consecutive(motor) >= FORCE_SWITCH_AFTER {
                return motor.other();
            }
        }

        let left = self.count(Motor::Left);
        let right = self.count(Motor::Right);
        let (over, under) = match left.cmp(&right) {
            std::cmp::Ordering::Greater => (Motor::Left, Motor::Right),
            std::cmp::Ordering::Less => (Motor::Right, Motor::Left),
            std::cmp::Ordering::Equal => {
                return if rng.gen_bool(0.5) {
                    Motor::Left
                } else {
                    Motor::Right
                };
            }
        };

        if rng.gen::<f64>() < alternation_bias {
            under
        } else {
            over
        }
    }

    /// Push a selection into the bounded history and update the run counters.
    pub fn record_selection(&mut self, motor: Motor, now: f64) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(motor);

        match motor {
            Motor::Left => {
                self.left_consecutive += 1;
                self.right_consecutive = 0;
            }
            Motor::Right => {
                self.right_consecutive += 1;
                self.left_consecutive = 0;
            }
        }

        self.active_motor = motor;
        self.motor_switch_time = now;
    }

    /// Advance the phase clock by `dt` and produce this tick's output.
    ///
    /// `now` is the session time and `envelope` the multiplier at `now`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        now: f64,
        envelope: f64,
        config: &PatternConfig,
        gap_shape: &Beta<f64>,
        rng: &mut R,
    ) -> Rumble {
        self.phase_elapsed += dt;

        if self.phase_elapsed >= self.phase_duration {
            match self.phase {
                Phase::Gap => {
                    self.phase = Phase::Buzz;
                    self.phase_duration = buzz_duration(config, rng);
                    let motor = self.select_next_motor(config.alternation_bias, rng);
                    self.record_selection(motor, now);
                }
                Phase::Buzz => {
                    self.phase = Phase::Gap;
                    self.phase_duration = gap_duration(config, gap_shape, rng);
                }
            }
            self.phase_elapsed = 0.0;
            debug!(
                "stochastic: {} for {:.3}s (motor {}, t={:.3})",
                self.phase.as_str(),
                self.phase_duration,
                self.active_motor.as_str(),
                now
            );
        }

        match self.phase {
            Phase::Gap => Rumble::silent(),
            Phase::Buzz => self.buzz_output(now, envelope, config, rng),
        }
    }

    fn buzz_output<R: Rng + ?Sized>(
        &self,
        now: f64,
        envelope: f64,
        config: &PatternConfig,
        rng: &mut R,
    ) -> Rumble {
        let (low, high) = config.intensity_bounds();
        let base = clamp_intensity(uniform(rng, low, high));
        let mut level = base * envelope;

        let crossfade_s = CROSSFADE_MS / 1000.0;
        level *= clamp((now - self.motor_switch_time) / crossfade_s, 0.0, 1.0);

        let startup_s = STARTUP_RAMP_MS / 1000.0;
        level *= clamp(now / startup_s, 0.0, 1.0);

        let mut output = Rumble::single(self.active_motor, level);

        if config.trigger_enabled && level > high && self.phase_elapsed > config.trigger_delay {
            let kick = low * config.trigger_intensity * envelope;
            match self.active_motor {
                Motor::Left => output.right = kick,
                Motor::Right => output.left = kick,
            }
        }

        output.clamped()
    }
}

impl Default for StochasticState {
    fn default() -> Self {
        Self::new()
    }
}

/// Buzz length [s], uniform within the configured ms bounds
pub fn buzz_duration<R: Rng + ?Sized>(config: &PatternConfig, rng: &mut R) -> f64 {
    uniform(rng, config.buzz_min, config.buzz_max) / 1000.0
}

/// Gap length [s]: `gap_min + Beta(2,3) * (max_gap - gap_min)`
pub fn gap_duration<R: Rng + ?Sized>(
    config: &PatternConfig,
    gap_shape: &Beta<f64>,
    rng: &mut R,
) -> f64 {
    let t = gap_shape.sample(rng);
    (config.gap_min + t * (config.max_gap - config.gap_min)) / 1000.0
}
