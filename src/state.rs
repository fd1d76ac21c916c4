//! Engine state representation
//!
//! One flat struct owned by the tick context. Every generator keeps its own
//! sub-state so switching mode mid-session leaves the other clocks intact.

use crate::breathing::BreathingPulse;
use crate::pulse::{ConstantPulse, CyclePulse};
use crate::resonance::Resonance;
use crate::stochastic::StochasticState;
use crate::util::clamp_intensity;

/// Buzz (motor active) or gap (silent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    Buzz,
    #[default]
    Gap,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Buzz => "buzz",
            Phase::Gap => "gap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motor {
    Left,
    Right,
}

impl Motor {
    pub fn other(self) -> Self {
        match self {
            Motor::Left => Motor::Right,
            Motor::Right => Motor::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Motor::Left => "left",
            Motor::Right => "right",
        }
    }
}

/// Intensity pair for the two motors, nominally in [0, 255]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rumble {
    pub left: f64,
    pub right: f64,
}

impl Rumble {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn both(level: f64) -> Self {
        Self::new(level, level)
    }

    /// `level` on `motor`, the other one silent
    pub fn single(motor: Motor, level: f64) -> Self {
        match motor {
            Motor::Left => Self::new(level, 0.0),
            Motor::Right => Self::new(0.0, level),
        }
    }

    pub fn clamped(self) -> Self {
        Self::new(clamp_intensity(self.left), clamp_intensity(self.right))
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.left * factor, self.right * factor)
    }

    pub fn is_silent(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// Complete mutable state of one session
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Session time [s]
    pub elapsed: f64,
    pub stochastic: StochasticState,
    pub resonance: Resonance,
    pub constant: ConstantPulse,
    pub cycle: CyclePulse,
    pub breathing: BreathingPulse,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            stochastic: StochasticState::new(),
            resonance: Resonance::new(),
            constant: ConstantPulse::new(),
            cycle: CyclePulse::new(),
            breathing: BreathingPulse::new(),
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = EngineState::new();
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.stochastic.phase, Phase::Gap);
        assert_eq!(state.stochastic.phase_duration, 0.0);
        assert!(state.stochastic.history.is_empty());
        assert!(!state.resonance.is_active());
    }

    #[test]
    fn test_rumble_clamped() {
        let r = Rumble::new(-4.0, 512.0).clamped();
        assert_eq!(r, Rumble::new(0.0, 255.0));
        assert_eq!(Rumble::single(Motor::Right, 9.0), Rumble::new(0.0, 9.0));
    }
}
