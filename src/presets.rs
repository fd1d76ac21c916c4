//! Built-in presets
//!
//! Named configurations layered over [`PatternConfig::default`]. Storing user
//! presets is left to the host application.

use crate::config::{Mode, PatternConfig};
use crate::PatternError;

pub const BUILTIN_PRESETS: [&str; 7] = [
    "Gentle Massage",
    "Standard Session",
    "Intense Workout",
    "Quick Test",
    "Rhythmic Flow",
    "Cycle",
    "Breathing Pulse",
];

pub fn builtin_names() -> &'static [&'static str] {
    &BUILTIN_PRESETS
}

/// Full configuration for a built-in preset
pub fn builtin(name: &str) -> Result<PatternConfig, PatternError> {
    let base = PatternConfig::default();
    let config = match name {
        "Gentle Massage" => PatternConfig {
            session_length: 300.0,
            peak_time: 300.0,
            weak: 40.0,
            strong: 100.0,
            buzz_min: 200.0,
            buzz_max: 1000.0,
            gap_min: 200.0,
            max_gap: 1500.0,
            breathing_amount: 0.15,
            resonance_probability: 0.05,
            ..base
        },
        "Standard Session" => PatternConfig {
            session_length: 1620.0,
            peak_time: 1620.0,
            weak: 60.0,
            strong: 160.0,
            buzz_min: 100.0,
            buzz_max: 2000.0,
            max_gap: 1800.0,
            ..base
        },
        "Intense Workout" => PatternConfig {
            session_length: 900.0,
            peak_time: 600.0,
            weak: 100.0,
            strong: 200.0,
            max: 255.0,
            buzz_min: 150.0,
            buzz_max: 2500.0,
            gap_min: 50.0,
            max_gap: 1000.0,
            alternation_bias: 0.8,
            resonance_probability: 0.15,
            ..base
        },
        "Quick Test" => PatternConfig {
            session_length: 60.0,
            peak_time: 30.0,
            weak: 80.0,
            strong: 160.0,
            buzz_min: 200.0,
            buzz_max: 800.0,
            max_gap: 500.0,
            ..base
        },
        "Rhythmic Flow" => PatternConfig {
            session_length: 600.0,
            peak_time: 600.0,
            weak: 70.0,
            strong: 150.0,
            buzz_min: 300.0,
            buzz_max: 1200.0,
            max_gap: 1000.0,
            breathing_amount: 0.2,
            breathing_period: 10.0,
            resonance_enabled: true,
            resonance_probability: 0.2,
            resonance_duration_min: 3.0,
            resonance_duration_max: 7.0,
            ..base
        },
        "Cycle" => PatternConfig {
            session_length: 3600.0,
            peak_time: 1620.0,
            weak: 60.0,
            strong: 160.0,
            max: 255.0,
            buzz_min: 100.0,
            buzz_max: 2000.0,
            max_gap: 1800.0,
            mode: Mode::Cycle,
            ..base
        },
        "Breathing Pulse" => PatternConfig {
            session_length: 3600.0,
            strong: 150.0,
            max: 220.0,
            breathing_pulse_period: 10.0,
            breathing_pulse_sync_period: 45.0,
            breathing_pulse_min_intensity: 150.0,
            breathing_pulse_cycles: 2,
            breathing_pulse_gap: 1.5,
            mode: Mode::BreathingPulse,
            ..base
        },
        other => return Err(PatternError::UnknownPreset(other.to_string())),
    };
    Ok(config)
}
