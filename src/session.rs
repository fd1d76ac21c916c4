//! Session driver
//!
//! Reference driver around [`PatternEngine`]: paces ticks against the wall
//! clock, applies the end-of-session fade-out, forwards levels to an
//! [`Actuator`] and honours a stop signal. [`simulate`] runs the same loop
//! offline with a fixed `dt` and records every tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::PatternConfig;
use crate::engine::PatternEngine;
use crate::resonance::ResonanceMode;
use crate::snapshot::SnapshotHandle;
use crate::state::{Motor, Phase};
use crate::util::{clamp, FADEOUT_MS, MAX_INTENSITY, UPDATE_INTERVAL_MS};
use crate::PatternError;

/// Device side of a session
pub trait Actuator {
    /// Levels in engine units (0-255); implementations rescale as needed,
    /// e.g. with [`normalize_intensity`]
    fn set_rumble(&mut self, left: f64, right: f64);
    /// Silence both motors
    fn stop(&mut self);
}

/// Map an engine level onto a device's 0..1 scale
pub fn normalize_intensity(value: f64) -> f64 {
    clamp(value / MAX_INTENSITY, 0.0, 1.0)
}

/// Linear fade over the last `FADEOUT_MS` of a session
pub fn fade_multiplier(remaining: f64) -> f64 {
    let fade_s = FADEOUT_MS / 1000.0;
    if remaining < fade_s {
        clamp(remaining / fade_s, 0.0, 1.0)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Ran for the full session length
    Completed,
    /// Stopped through a [`StopHandle`]
    Cancelled,
}

/// Cloneable stop signal for a running session
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct SessionDriver<R: Rng = StdRng> {
    engine: PatternEngine<R>,
    stop: StopHandle,
    tick_interval: Duration,
}

impl<R: Rng> SessionDriver<R> {
    pub fn new(engine: PatternEngine<R>) -> Self {
        Self {
            engine,
            stop: StopHandle::new(),
            tick_interval: Duration::from_millis(UPDATE_INTERVAL_MS),
        }
    }

    /// Override the nominal 10 ms pacing
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn observer(&self) -> SnapshotHandle {
        self.engine.observer()
    }

    pub fn engine(&self) -> &PatternEngine<R> {
        &self.engine
    }

    /// Run one session to completion or cancellation.
    ///
    /// The engine is reset first, and `actuator.stop()` is issued exactly
    /// once when the loop exits.
    pub fn run<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> SessionOutcome {
        self.engine.reset();

        let length = self.engine.config().session_length;
        info!(
            "session started: mode {}, {:.1}s",
            self.engine.config().mode,
            length
        );

        let start = Instant::now();
        let mut last = start;
        let outcome = loop {
            if self.stop.is_stopped() {
                break SessionOutcome::Cancelled;
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            let elapsed = now.duration_since(start).as_secs_f64();
            if elapsed >= length {
                break SessionOutcome::Completed;
            }

            self.step(dt, length - elapsed, actuator);
            thread::sleep(self.tick_interval);
        };

        // A stop raised before or during this run ends only this run
        self.stop.clear();
        actuator.stop();
        info!(
            "session ended: {:?} after {:.2}s",
            outcome,
            self.engine.elapsed()
        );
        outcome
    }

    /// One tick: advance, fade by the time `remaining`, forward to the device
    fn step<A: Actuator + ?Sized>(&mut self, dt: f64, remaining: f64, actuator: &mut A) {
        self.engine.tick(dt);
        let output = self.engine.scale_output(fade_multiplier(remaining));
        actuator.set_rumble(output.left, output.right);
    }
}

/// One tick of an offline run
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    /// Session time at the end of the tick [s]
    pub t: f64,
    pub left: f64,
    pub right: f64,
    pub phase: Phase,
    pub active_motor: Option<Motor>,
    pub resonance_mode: Option<ResonanceMode>,
    pub envelope_multiplier: f32,
}

/// Run a whole session without sleeping, ticking by a fixed `dt`.
///
/// Applies the same fade-out as [`SessionDriver::run`].
pub fn simulate(config: &PatternConfig, seed: u64, dt: f64) -> Result<Vec<TickRecord>, PatternError> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(PatternError::InvalidConfig(
            "simulation dt must be finite and > 0".to_string(),
        ));
    }

    let mut engine = PatternEngine::seeded(config.clone(), seed)?;
    let length = config.session_length;
    let steps = (length / dt).ceil() as usize;
    let mut records = Vec::with_capacity(steps);

    for step in 1..=steps {
        let t = step as f64 * dt;
        if t >= length {
            break;
        }

        engine.tick(dt);
        let output = engine.scale_output(fade_multiplier(length - t));
        let snapshot = engine.snapshot();
        records.push(TickRecord {
            t,
            left: output.left,
            right: output.right,
            phase: snapshot.phase,
            active_motor: snapshot.active_motor,
            resonance_mode: snapshot.resonance_mode,
            envelope_multiplier: snapshot.envelope_multiplier,
        });
    }

    Ok(records)
}
