//! Pattern engine
//!
//! Owns the configuration snapshot, the injected random source and the
//! session state, and dispatches each tick to exactly one generator.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Beta;

use crate::config::{Mode, PatternConfig};
use crate::envelope::intensity_multiplier;
use crate::snapshot::{Snapshot, SnapshotHandle};
use crate::state::{EngineState, Phase, Rumble};
use crate::stochastic::{GAP_SHAPE_ALPHA, GAP_SHAPE_BETA};
use crate::PatternError;

/// Rumble pattern engine
pub struct PatternEngine<R: Rng = StdRng> {
    config: PatternConfig,
    rng: R,
    /// Beta(2,3) gap-length shape
    gap_shape: Beta<f64>,
    state: EngineState,
    last_mode: Mode,
    last_output: Rumble,
    /// Envelope applied on the last tick; 1 for unshaped modes
    last_envelope: f64,
    observer: SnapshotHandle,
}

impl PatternEngine<StdRng> {
    /// Engine with a seeded `StdRng`; the same seed replays the same session
    pub fn seeded(config: PatternConfig, seed: u64) -> Result<Self, PatternError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PatternEngine<R> {
    /// Create an engine for one session.
    ///
    /// The configuration is validated here so a bad mode or value fails at
    /// session start rather than mid-tick.
    pub fn new(config: PatternConfig, rng: R) -> Result<Self, PatternError> {
        config.validate()?;
        let gap_shape = Beta::new(GAP_SHAPE_ALPHA, GAP_SHAPE_BETA)
            .map_err(|e| PatternError::Distribution(e.to_string()))?;
        warn_fail_soft(&config);

        let observer = SnapshotHandle::new(Snapshot::idle(config.mode));
        Ok(Self {
            last_mode: config.mode,
            config,
            rng,
            gap_shape,
            state: EngineState::new(),
            last_output: Rumble::silent(),
            last_envelope: 0.0,
            observer,
        })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Session time [s]
    pub fn elapsed(&self) -> f64 {
        self.state.elapsed
    }

    pub fn last_output(&self) -> Rumble {
        self.last_output
    }

    /// Re-initialize every clock and generator for a new session.
    ///
    /// The random source carries on; build a new engine to replay a seed.
    pub fn reset(&mut self) {
        self.state = EngineState::new();
        self.last_mode = self.config.mode;
        self.last_output = Rumble::silent();
        self.last_envelope = 0.0;
        self.observer.publish(&Snapshot::idle(self.config.mode));
        info!("engine reset ({})", self.config.mode);
    }

    /// Advance using the configured mode
    pub fn tick(&mut self, dt: f64) -> Rumble {
        self.advance(dt, self.config.mode)
    }

    /// Advance the session by `dt` seconds in `mode` and return the motor levels.
    ///
    /// Non-finite or negative `dt` counts as zero. Output is always within [0, 255].
    pub fn advance(&mut self, dt: f64, mode: Mode) -> Rumble {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.state.elapsed += dt;
        let now = self.state.elapsed;

        let output = match mode {
            Mode::Stochastic => self.advance_stochastic(dt, now),
            Mode::Constant(level) => {
                self.last_envelope = 1.0;
                self.state.constant.step(dt, level, &self.config)
            }
            Mode::ConstantAc => {
                self.last_envelope = 1.0;
                self.state.constant.step_ac(dt, &self.config)
            }
            Mode::Cycle => {
                self.last_envelope = 1.0;
                self.state.cycle.step(dt, &self.config)
            }
            Mode::BreathingPulse => {
                self.last_envelope = 1.0;
                self.state.breathing.step(dt, &self.config)
            }
        }
        .clamped();

        self.last_mode = mode;
        self.last_output = output;
        self.observer.publish(&self.snapshot());
        output
    }

    fn advance_stochastic(&mut self, dt: f64, now: f64) -> Rumble {
        let config = &self.config;
        let envelope = intensity_multiplier(
            now,
            config.peak_time,
            config.breathing_amount,
            config.breathing_period,
        );
        self.last_envelope = envelope;

        // The stochastic phase clock only moves when resonance is idle
        if let Some(output) = self
            .state
            .resonance
            .step(now, envelope, config, &mut self.rng)
        {
            return output;
        }

        self.state
            .stochastic
            .step(dt, now, envelope, config, &self.gap_shape, &mut self.rng)
    }

    /// Scale the last output and republish it, so observers see the levels
    /// the device actually receives (e.g. during a fade-out)
    pub fn scale_output(&mut self, factor: f64) -> Rumble {
        self.last_output = self.last_output.scaled(factor).clamped();
        self.observer.publish(&self.snapshot());
        self.last_output
    }

    /// Copy of the display fields as of the last tick
    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let (phase, active_motor, resonance_mode) = match self.last_mode {
            Mode::Stochastic => match state.resonance.mode() {
                Some(mode) => (state.stochastic.phase, None, Some(mode)),
                None => {
                    let phase = state.stochastic.phase;
                    let motor = (phase == Phase::Buzz).then_some(state.stochastic.active_motor);
                    (phase, motor, None)
                }
            },
            Mode::Constant(_) => (state.constant.clock.phase(), None, None),
            Mode::ConstantAc => {
                let phase = state.constant.clock.phase();
                let motor = (phase == Phase::Buzz).then(|| state.constant.ac_motor());
                (phase, motor, None)
            }
            Mode::Cycle => {
                let phase = state.cycle.clock.phase();
                let motor = if phase == Phase::Buzz {
                    state.cycle.motor()
                } else {
                    None
                };
                (phase, motor, None)
            }
            Mode::BreathingPulse => (state.breathing.phase, None, None),
        };

        Snapshot {
            mode: self.last_mode,
            phase,
            active_motor,
            resonance_mode,
            envelope_multiplier: self.last_envelope as f32,
            last_left: 0,
            last_right: 0,
        }
        .with_levels(self.last_output.left, self.last_output.right)
    }

    /// Handle for a concurrent observer; updated after every tick
    pub fn observer(&self) -> SnapshotHandle {
        self.observer.clone()
    }
}

/// Log the configuration quirks the engine will smooth over
fn warn_fail_soft(config: &PatternConfig) {
    if config.weak > config.strong {
        warn!(
            "weak ({}) exceeds strong ({}); using them as swapped bounds",
            config.weak, config.strong
        );
    }
    if config.breathing_amount != 0.0 && config.breathing_period <= 0.0 {
        warn!("breathing_period <= 0; envelope breathing wave disabled");
    }
    if config.resonance_enabled && config.resonance_check_interval <= 0.0 {
        warn!("resonance_check_interval <= 0; resonance will never trigger");
    }
    if config.breathing_pulse_period <= 0.0 {
        warn!("breathing_pulse_period <= 0; breathing pulse base frequency is 0");
    }
    if config.breathing_pulse_sync_period <= 0.0 {
        warn!("breathing_pulse_sync_period <= 0; breathing pulse beat frequency is 0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstantLevel;
    use crate::state::Motor;

    const DT: f64 = 0.01;

    #[test]
    fn test_engine_creation() {
        let engine = PatternEngine::seeded(PatternConfig::default(), 42).unwrap();
        assert_eq!(engine.elapsed(), 0.0);
        assert_eq!(engine.state().stochastic.phase, Phase::Gap);
        assert_eq!(engine.last_output(), Rumble::silent());
    }

    #[test]
    fn test_invalid_config_rejected_at_start() {
        let config = PatternConfig {
            alternation_bias: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            PatternEngine::seeded(config, 1),
            Err(PatternError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_scale_output_republishes() {
        let config = PatternConfig {
            max: 200.0,
            mode: Mode::Constant(ConstantLevel::Max),
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, 3).unwrap();
        let observer = engine.observer();
        engine.tick(DT);
        assert_eq!(observer.load().last_left, 200);

        let faded = engine.scale_output(0.25);
        assert_eq!(faded, Rumble::both(50.0));
        assert_eq!(engine.last_output(), faded);
        assert_eq!(observer.load().last_left, 50);
        assert_eq!(observer.load().last_right, 50);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = PatternEngine::seeded(PatternConfig::default(), 7).unwrap();
        let mut b = PatternEngine::seeded(PatternConfig::default(), 7).unwrap();
        for _ in 0..3000 {
            assert_eq!(a.tick(DT), b.tick(DT));
        }
    }

    #[test]
    fn test_gap_silent_without_resonance() {
        let config = PatternConfig {
            resonance_enabled: false,
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, 9).unwrap();
        for _ in 0..6000 {
            let out = engine.tick(DT);
            if engine.state().stochastic.phase == Phase::Gap {
                assert!(out.is_silent());
            }
        }
    }

    #[test]
    fn test_resonance_freezes_stochastic_state() {
        let config = PatternConfig {
            resonance_probability: 1.0,
            resonance_check_interval: 1.0,
            resonance_duration_min: 0.5,
            resonance_duration_max: 1.5,
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, 21).unwrap();
        let mut episodes = 0;
        let mut was_active = false;
        for _ in 0..2000 {
            let before = engine.state().stochastic.clone();
            engine.tick(DT);
            let resonance = &engine.state().resonance;
            if let Some(active) = resonance.active {
                assert!((0.5..=1.5).contains(&active.duration));
                assert_eq!(engine.state().stochastic, before);
                if !was_active {
                    episodes += 1;
                }
            }
            was_active = resonance.is_active();
        }
        assert!(episodes >= 2);
    }

    #[test]
    fn test_snapshot_reports_resonance() {
        let config = PatternConfig {
            resonance_probability: 1.0,
            resonance_check_interval: 0.1,
            ..Default::default()
        };
        let mut engine = PatternEngine::seeded(config, 5).unwrap();
        let observer = engine.observer();
        for _ in 0..20 {
            engine.tick(DT);
        }
        let snapshot = observer.load();
        assert!(snapshot.resonance_mode.is_some());
        assert_eq!(snapshot.mode, Mode::Stochastic);
        assert!(snapshot.envelope_multiplier > 0.0);
        assert_eq!(snapshot, engine.snapshot());
    }

    #[test]
    fn test_modes_keep_independent_clocks() {
        let mut engine = PatternEngine::seeded(PatternConfig::default(), 3).unwrap();
        for _ in 0..30 {
            engine.advance(DT, Mode::Cycle);
        }
        for _ in 0..50 {
            engine.advance(DT, Mode::BreathingPulse);
        }
        for _ in 0..17 {
            engine.advance(DT, Mode::Constant(ConstantLevel::Weak));
        }
        assert_eq!(engine.state().cycle.clock.time_ms, 300.0);
        assert_eq!(engine.state().cycle.phase_index, 1);
        assert_eq!(engine.state().constant.clock.time_ms, 170.0);
        assert!((engine.state().breathing.buzz_time - 0.5).abs() < 1e-9);
        assert!((engine.elapsed() - 0.97).abs() < 1e-9);
    }

    #[test]
    fn test_ac_snapshot_tracks_motor() {
        let mut engine = PatternEngine::seeded(PatternConfig::default(), 3).unwrap();
        engine.advance(DT, Mode::ConstantAc);
        assert_eq!(engine.snapshot().active_motor, Some(Motor::Left));
        for _ in 0..30 {
            engine.advance(DT, Mode::ConstantAc);
        }
        assert_eq!(engine.snapshot().active_motor, Some(Motor::Right));
        assert_eq!(engine.snapshot().envelope_multiplier, 1.0);
    }

    #[test]
    fn test_bad_dt_counts_as_zero() {
        let mut engine = PatternEngine::seeded(PatternConfig::default(), 3).unwrap();
        engine.advance(f64::NAN, Mode::Cycle);
        engine.advance(-1.0, Mode::Cycle);
        engine.advance(f64::INFINITY, Mode::Cycle);
        assert_eq!(engine.elapsed(), 0.0);
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let mut engine = PatternEngine::seeded(PatternConfig::default(), 3).unwrap();
        for _ in 0..500 {
            engine.tick(DT);
        }
        engine.advance(DT, Mode::BreathingPulse);
        engine.reset();
        assert_eq!(engine.elapsed(), 0.0);
        assert_eq!(engine.state().stochastic, crate::stochastic::StochasticState::new());
        assert_eq!(engine.state().breathing.buzz_time, 0.0);
        assert!(!engine.state().resonance.is_active());
        assert_eq!(engine.observer().load(), Snapshot::idle(Mode::Stochastic));
    }
}
