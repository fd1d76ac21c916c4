//! Constant and cyclic pulse generators
//!
//! Fixed 200 ms on / 100 ms off duty cycle, no randomness and no envelope.
//! Clocks run in milliseconds so a steady 10 ms tick lands exactly on the
//! period boundaries.

use crate::config::{ConstantLevel, PatternConfig};
use crate::state::{Motor, Phase, Rumble};

pub const PULSE_BUZZ_MS: f64 = 200.0;
pub const PULSE_GAP_MS: f64 = 100.0;
pub const PULSE_PERIOD_MS: f64 = PULSE_BUZZ_MS + PULSE_GAP_MS;

/// Steps in the rotating cycle mode
pub const CYCLE_PHASES: u8 = 4;

/// Millisecond clock shared by the duty-cycle generators
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PulseClock {
    pub time_ms: f64,
}

impl PulseClock {
    pub fn advance(&mut self, dt: f64) {
        self.time_ms += dt * 1000.0;
    }

    /// Number of whole periods elapsed
    pub fn period_index(&self) -> u64 {
        (self.time_ms / PULSE_PERIOD_MS).floor() as u64
    }

    pub fn phase(&self) -> Phase {
        if self.time_ms % PULSE_PERIOD_MS < PULSE_BUZZ_MS {
            Phase::Buzz
        } else {
            Phase::Gap
        }
    }
}

fn level_intensity(level: ConstantLevel, config: &PatternConfig) -> f64 {
    match level {
        ConstantLevel::Weak => config.weak,
        ConstantLevel::Strong => config.strong,
        ConstantLevel::Max => config.max,
    }
}

/// Steady and alternating ("AC") pulses
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantPulse {
    pub clock: PulseClock,
}

impl ConstantPulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both motors at `level` during the active window
    pub fn step(&mut self, dt: f64, level: ConstantLevel, config: &PatternConfig) -> Rumble {
        self.clock.advance(dt);
        match self.clock.phase() {
            Phase::Buzz => Rumble::both(level_intensity(level, config)).clamped(),
            Phase::Gap => Rumble::silent(),
        }
    }

    /// `max` on one motor, swapping sides every full period
    pub fn step_ac(&mut self, dt: f64, config: &PatternConfig) -> Rumble {
        self.clock.advance(dt);
        match self.clock.phase() {
            Phase::Buzz => Rumble::single(self.ac_motor(), config.max).clamped(),
            Phase::Gap => Rumble::silent(),
        }
    }

    /// Left on even periods, right on odd
    pub fn ac_motor(&self) -> Motor {
        if self.clock.period_index() % 2 == 0 {
            Motor::Left
        } else {
            Motor::Right
        }
    }
}

/// Four-step rotation: strong both, max both, max left, max right
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CyclePulse {
    pub clock: PulseClock,
    pub phase_index: u8,
    /// Period index the rotation was last advanced for
    pub last_period: u64,
}

impl CyclePulse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, dt: f64, config: &PatternConfig) -> Rumble {
        self.clock.advance(dt);

        // Compare period indices rather than counting ticks so one long tick
        // spanning several boundaries still rotates once per period.
        let period = self.clock.period_index();
        if period > self.last_period {
            let steps = (period - self.last_period) % u64::from(CYCLE_PHASES);
            self.phase_index = ((u64::from(self.phase_index) + steps) % u64::from(CYCLE_PHASES)) as u8;
            self.last_period = period;
        }

        if self.clock.phase() == Phase::Gap {
            return Rumble::silent();
        }

        let output = match self.phase_index {
            0 => Rumble::both(config.strong),
            1 => Rumble::both(config.max),
            2 => Rumble::single(Motor::Left, config.max),
            _ => Rumble::single(Motor::Right, config.max),
        };
        output.clamped()
    }

    /// Motor driven alone in the current step, if any
    pub fn motor(&self) -> Option<Motor> {
        match self.phase_index {
            2 => Some(Motor::Left),
            3 => Some(Motor::Right),
            _ => None,
        }
    }
}
