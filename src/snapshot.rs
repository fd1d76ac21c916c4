//! Observer snapshot
//!
//! The tick context publishes a copy of the display fields after every tick.
//! Everything fits in one 64-bit word, so a reader on another thread always
//! sees a consistent snapshot and the writer never waits on it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::Mode;
use crate::resonance::ResonanceMode;
use crate::state::{Motor, Phase};

/// Read-only view of the engine for visualization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub active_motor: Option<Motor>,
    pub resonance_mode: Option<ResonanceMode>,
    pub envelope_multiplier: f32,
    /// Last output, rounded to device steps
    pub last_left: u8,
    pub last_right: u8,
}

// Bit layout of the packed word
const LEFT_SHIFT: u32 = 0;
const RIGHT_SHIFT: u32 = 8;
const PHASE_SHIFT: u32 = 16;
const MOTOR_SHIFT: u32 = 17;
const RESONANCE_SHIFT: u32 = 19;
const MODE_SHIFT: u32 = 21;
const ENVELOPE_SHIFT: u32 = 32;

fn to_step(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl Snapshot {
    /// Nothing running yet
    pub fn idle(mode: Mode) -> Self {
        Self {
            mode,
            phase: Phase::Gap,
            active_motor: None,
            resonance_mode: None,
            envelope_multiplier: 0.0,
            last_left: 0,
            last_right: 0,
        }
    }

    pub fn with_levels(mut self, left: f64, right: f64) -> Self {
        self.last_left = to_step(left);
        self.last_right = to_step(right);
        self
    }

    pub fn pack(&self) -> u64 {
        let phase = match self.phase {
            Phase::Gap => 0u64,
            Phase::Buzz => 1,
        };
        let motor = match self.active_motor {
            None => 0u64,
            Some(Motor::Left) => 1,
            Some(Motor::Right) => 2,
        };
        let resonance = match self.resonance_mode {
            None => 0u64,
            Some(ResonanceMode::Mirrored) => 1,
            Some(ResonanceMode::AntiPhase) => 2,
            Some(ResonanceMode::Offset) => 3,
        };
        let mode = Mode::ALL
            .iter()
            .position(|m| *m == self.mode)
            .unwrap_or(0) as u64;

        (u64::from(self.last_left) << LEFT_SHIFT)
            | (u64::from(self.last_right) << RIGHT_SHIFT)
            | (phase << PHASE_SHIFT)
            | (motor << MOTOR_SHIFT)
            | (resonance << RESONANCE_SHIFT)
            | (mode << MODE_SHIFT)
            | (u64::from(self.envelope_multiplier.to_bits()) << ENVELOPE_SHIFT)
    }

    pub fn unpack(word: u64) -> Self {
        let phase = if (word >> PHASE_SHIFT) & 0b1 == 1 {
            Phase::Buzz
        } else {
            Phase::Gap
        };
        let active_motor = match (word >> MOTOR_SHIFT) & 0b11 {
            1 => Some(Motor::Left),
            2 => Some(Motor::Right),
            _ => None,
        };
        let resonance_mode = match (word >> RESONANCE_SHIFT) & 0b11 {
            1 => Some(ResonanceMode::Mirrored),
            2 => Some(ResonanceMode::AntiPhase),
            3 => Some(ResonanceMode::Offset),
            _ => None,
        };
        let mode_index = ((word >> MODE_SHIFT) & 0b111) as usize;
        let mode = Mode::ALL.get(mode_index).copied().unwrap_or(Mode::Stochastic);

        Self {
            mode,
            phase,
            active_motor,
            resonance_mode,
            envelope_multiplier: f32::from_bits((word >> ENVELOPE_SHIFT) as u32),
            last_left: ((word >> LEFT_SHIFT) & 0xFF) as u8,
            last_right: ((word >> RIGHT_SHIFT) & 0xFF) as u8,
        }
    }
}

/// Shared cell the engine publishes into; clone it to hand to an observer
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    cell: Arc<AtomicU64>,
}

impl SnapshotHandle {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            cell: Arc::new(AtomicU64::new(initial.pack())),
        }
    }

    pub fn publish(&self, snapshot: &Snapshot) {
        self.cell.store(snapshot.pack(), Ordering::Release);
    }

    pub fn load(&self) -> Snapshot {
        Snapshot::unpack(self.cell.load(Ordering::Acquire))
    }
}
