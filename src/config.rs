//! Session configuration
//!
//! A flat set of named numeric knobs, read-only to the engine for the whole
//! session. Durations named `buzz_*`/`*_gap` are milliseconds; every other
//! time value is seconds.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PatternError;

/// Intensity used by the steady pulse modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantLevel {
    Weak,
    Strong,
    Max,
}

/// Generation mode selected by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    Stochastic,
    Constant(ConstantLevel),
    ConstantAc,
    Cycle,
    BreathingPulse,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Stochastic,
        Mode::Constant(ConstantLevel::Weak),
        Mode::Constant(ConstantLevel::Strong),
        Mode::Constant(ConstantLevel::Max),
        Mode::ConstantAc,
        Mode::Cycle,
        Mode::BreathingPulse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Stochastic => "stochastic",
            Mode::Constant(ConstantLevel::Weak) => "constant_weak",
            Mode::Constant(ConstantLevel::Strong) => "constant_strong",
            Mode::Constant(ConstantLevel::Max) => "constant_max",
            Mode::ConstantAc => "constant_ac",
            Mode::Cycle => "cycle",
            Mode::BreathingPulse => "breathing_pulse",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| PatternError::UnknownMode(s.to_string()))
    }
}

impl TryFrom<String> for Mode {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Total session length [s]
    pub session_length: f64,
    /// Time for the stochastic envelope to reach full scale [s]
    pub peak_time: f64,
    /// Lower random-intensity bound
    pub weak: f64,
    /// Upper random-intensity bound
    pub strong: f64,
    /// Intensity for the max/AC/cycle modes and breathing-pulse peak
    pub max: f64,
    /// Shortest buzz [ms]
    pub buzz_min: f64,
    /// Longest buzz [ms]
    pub buzz_max: f64,
    /// Shortest gap [ms]
    pub gap_min: f64,
    /// Longest gap [ms]
    pub max_gap: f64,
    /// Probability of switching away from the over-represented motor
    pub alternation_bias: f64,
    /// Depth of the slow envelope wave
    pub breathing_amount: f64,
    /// Period of the slow envelope wave [s]
    pub breathing_period: f64,
    pub trigger_enabled: bool,
    /// Phase time before the sympathetic kick may fire [s]
    pub trigger_delay: f64,
    /// Kick level as a fraction of `weak`
    pub trigger_intensity: f64,
    pub resonance_enabled: bool,
    pub resonance_probability: f64,
    /// Time between resonance rolls [s]
    pub resonance_check_interval: f64,
    pub resonance_duration_min: f64,
    pub resonance_duration_max: f64,
    /// Resonance waveform frequency [Hz]
    pub resonance_frequency: f64,
    pub resonance_intensity: f64,
    pub mode: Mode,
    /// Left-motor breathing period [s]
    pub breathing_pulse_period: f64,
    /// Time for the two motors to drift back into phase [s]
    pub breathing_pulse_sync_period: f64,
    pub breathing_pulse_min_intensity: f64,
    /// Breathing periods per buzz
    pub breathing_pulse_cycles: u32,
    /// Silent rest after each buzz, 0 disables [s]
    pub breathing_pulse_gap: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            session_length: 60.0,
            peak_time: 60.0,
            weak: 60.0,
            strong: 160.0,
            max: 255.0,
            buzz_min: 100.0,
            buzz_max: 2000.0,
            gap_min: 100.0,
            max_gap: 270.0,
            alternation_bias: 0.7,
            breathing_amount: 0.1,
            breathing_period: 15.0,
            trigger_enabled: true,
            trigger_delay: 0.5,
            trigger_intensity: 0.5,
            resonance_enabled: true,
            resonance_probability: 0.1,
            resonance_check_interval: 5.0,
            resonance_duration_min: 2.0,
            resonance_duration_max: 5.0,
            resonance_frequency: 2.0,
            resonance_intensity: 1.0,
            mode: Mode::Stochastic,
            breathing_pulse_period: 8.0,
            breathing_pulse_sync_period: 30.0,
            breathing_pulse_min_intensity: 80.0,
            breathing_pulse_cycles: 1,
            breathing_pulse_gap: 0.0,
        }
    }
}

impl PatternConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, PatternError> {
        let config: PatternConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, PatternError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String, PatternError> {
        toml::to_string(self).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject values that would make a session meaningless.
    ///
    /// Swapped `weak`/`strong` bounds and non-positive periods are accepted;
    /// the engine normalizes those per tick.
    pub fn validate(&self) -> Result<(), PatternError> {
        let numeric = [
            ("session_length", self.session_length),
            ("peak_time", self.peak_time),
            ("weak", self.weak),
            ("strong", self.strong),
            ("max", self.max),
            ("buzz_min", self.buzz_min),
            ("buzz_max", self.buzz_max),
            ("gap_min", self.gap_min),
            ("max_gap", self.max_gap),
            ("alternation_bias", self.alternation_bias),
            ("breathing_amount", self.breathing_amount),
            ("breathing_period", self.breathing_period),
            ("trigger_delay", self.trigger_delay),
            ("trigger_intensity", self.trigger_intensity),
            ("resonance_probability", self.resonance_probability),
            ("resonance_check_interval", self.resonance_check_interval),
            ("resonance_duration_min", self.resonance_duration_min),
            ("resonance_duration_max", self.resonance_duration_max),
            ("resonance_frequency", self.resonance_frequency),
            ("resonance_intensity", self.resonance_intensity),
            ("breathing_pulse_period", self.breathing_pulse_period),
            ("breathing_pulse_sync_period", self.breathing_pulse_sync_period),
            ("breathing_pulse_min_intensity", self.breathing_pulse_min_intensity),
            ("breathing_pulse_gap", self.breathing_pulse_gap),
        ];

        if let Some((name, _)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PatternError::InvalidConfig(format!("{name} must be finite")));
        }

        if self.session_length <= 0.0 {
            return Err(PatternError::InvalidConfig(
                "session_length must be greater than zero".to_string(),
            ));
        }

        let intensities = [
            ("weak", self.weak),
            ("strong", self.strong),
            ("max", self.max),
            ("breathing_pulse_min_intensity", self.breathing_pulse_min_intensity),
        ];
        if let Some((name, _)) = intensities.iter().find(|(_, v)| *v < 0.0) {
            return Err(PatternError::InvalidConfig(format!(
                "{name} must be non-negative"
            )));
        }

        let durations = [
            ("buzz_min", self.buzz_min),
            ("buzz_max", self.buzz_max),
            ("gap_min", self.gap_min),
            ("max_gap", self.max_gap),
            ("trigger_delay", self.trigger_delay),
            ("resonance_duration_min", self.resonance_duration_min),
            ("resonance_duration_max", self.resonance_duration_max),
            ("breathing_pulse_gap", self.breathing_pulse_gap),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, v)| *v < 0.0) {
            return Err(PatternError::InvalidConfig(format!(
                "{name} must be non-negative"
            )));
        }

        let probabilities = [
            ("alternation_bias", self.alternation_bias),
            ("resonance_probability", self.resonance_probability),
        ];
        if let Some((name, _)) = probabilities
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(v))
        {
            return Err(PatternError::InvalidConfig(format!(
                "{name} must be within [0, 1]"
            )));
        }

        if self.breathing_pulse_cycles == 0 {
            return Err(PatternError::InvalidConfig(
                "breathing_pulse_cycles must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// `(low, high)` random-intensity bounds regardless of how `weak`/`strong` were entered
    pub fn intensity_bounds(&self) -> (f64, f64) {
        crate::util::ordered(self.weak, self.strong)
    }
}
