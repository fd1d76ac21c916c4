//! Rumble pattern generation
//!
//! Computes time-varying intensity pairs (0-255) for the low/high frequency
//! rumble motors of a game controller. A session driver calls
//! [`PatternEngine::advance`] once per tick; the engine dispatches to one of
//! the generation modes:
//! - stochastic buzz/gap phases shaped by a ramp + breathing envelope, with an
//!   occasional resonance overlay
//! - fixed duty-cycle pulses (steady, alternating, 4-phase cycle)
//! - a dual-frequency breathing pulse with optional rest gaps

pub mod breathing;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod presets;
pub mod pulse;
pub mod resonance;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod stochastic;
pub mod util;

use thiserror::Error;

// Re-export main types
pub use config::{ConstantLevel, Mode, PatternConfig};
pub use engine::PatternEngine;
pub use resonance::ResonanceMode;
pub use session::{simulate, Actuator, SessionDriver, SessionOutcome, StopHandle, TickRecord};
pub use snapshot::{Snapshot, SnapshotHandle};
pub use state::{Motor, Phase, Rumble};

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown mode: {0}")]
    UnknownMode(String),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("distribution error: {0}")]
    Distribution(String),
}
