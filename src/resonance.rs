//! Resonance overlay
//!
//! Periodically rolls for a synchronized sine burst that preempts the
//! stochastic engine. While a burst runs the stochastic phase clock is
//! frozen; on expiry the stochastic state resumes exactly where it stopped.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use log::info;
use rand::Rng;

use crate::config::PatternConfig;
use crate::state::Rumble;
use crate::util::uniform;

/// Relationship between the left and right resonance waveforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResonanceMode {
    /// Both motors identical
    Mirrored,
    /// Right motor half a cycle behind
    AntiPhase,
    /// Right motor a quarter cycle ahead
    Offset,
}

impl ResonanceMode {
    pub const ALL: [ResonanceMode; 3] = [
        ResonanceMode::Mirrored,
        ResonanceMode::AntiPhase,
        ResonanceMode::Offset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResonanceMode::Mirrored => "mirrored",
            ResonanceMode::AntiPhase => "anti_phase",
            ResonanceMode::Offset => "offset",
        }
    }

    /// Phase added to the right-motor waveform [rad]
    pub fn right_phase_offset(&self) -> f64 {
        match self {
            ResonanceMode::Mirrored => 0.0,
            ResonanceMode::AntiPhase => PI,
            ResonanceMode::Offset => FRAC_PI_2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveResonance {
    pub mode: ResonanceMode,
    /// Session time the burst started [s]
    pub start_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resonance {
    pub active: Option<ActiveResonance>,
    /// Session time of the last probability roll [s]
    pub last_check: f64,
}

impl Resonance {
    pub fn new() -> Self {
        Self {
            active: None,
            last_check: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn mode(&self) -> Option<ResonanceMode> {
        self.active.map(|a| a.mode)
    }

    /// Roll for a new burst if one is due. Returns true when a burst starts.
    ///
    /// A non-positive check interval disables resonance entirely.
    pub fn check_trigger<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        config: &PatternConfig,
        rng: &mut R,
    ) -> bool {
        if self.active.is_some() || !config.resonance_enabled {
            return false;
        }
        if config.resonance_check_interval <= 0.0 {
            return false;
        }
        if now - self.last_check < config.resonance_check_interval {
            return false;
        }

        self.last_check = now;
        if rng.gen::<f64>() >= config.resonance_probability {
            return false;
        }

        let mode = ResonanceMode::ALL[rng.gen_range(0..ResonanceMode::ALL.len())];
        let duration = uniform(
            rng,
            config.resonance_duration_min,
            config.resonance_duration_max,
        );
        self.active = Some(ActiveResonance {
            mode,
            start_time: now,
            duration,
        });
        info!(
            "resonance: {} started at t={:.2}s for {:.2}s",
            mode.as_str(),
            now,
            duration
        );
        true
    }

    /// Run the overlay for this tick.
    ///
    /// Returns `None` when no burst is running (or one just expired), in
    /// which case the stochastic engine owns the tick.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        envelope: f64,
        config: &PatternConfig,
        rng: &mut R,
    ) -> Option<Rumble> {
        self.check_trigger(now, config, rng);

        let active = self.active?;
        let elapsed = now - active.start_time;
        if elapsed >= active.duration {
            info!(
                "resonance: {} ended at t={:.2}s",
                active.mode.as_str(),
                now
            );
            self.active = None;
            return None;
        }

        let (low, _) = config.intensity_bounds();
        let base = low * envelope * config.resonance_intensity;
        Some(waveform(active.mode, base, config.resonance_frequency, elapsed).clamped())
    }
}

impl Default for Resonance {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised-sine burst level for both motors `elapsed` seconds into a burst
pub fn waveform(mode: ResonanceMode, base: f64, frequency: f64, elapsed: f64) -> Rumble {
    let phase = TAU * frequency * elapsed;
    let left = base * (0.5 + 0.5 * phase.sin());
    let right = base * (0.5 + 0.5 * (phase + mode.right_phase_offset()).sin());
    Rumble::new(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn always_on() -> PatternConfig {
        PatternConfig {
            resonance_enabled: true,
            resonance_probability: 1.0,
            resonance_check_interval: 1.0,
            resonance_duration_min: 2.0,
            resonance_duration_max: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_waveform_shapes() {
        // Quarter cycle at 1 Hz
        let m = waveform(ResonanceMode::Mirrored, 100.0, 1.0, 0.25);
        assert!((m.left - 100.0).abs() < 1e-9);
        assert_eq!(m.left, m.right);

        let a = waveform(ResonanceMode::AntiPhase, 100.0, 1.0, 0.25);
        assert!((a.left - 100.0).abs() < 1e-9);
        assert!(a.right.abs() < 1e-9);

        let o = waveform(ResonanceMode::Offset, 100.0, 1.0, 0.0);
        assert!((o.left - 50.0).abs() < 1e-9);
        assert!((o.right - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_trigger_waits_for_interval() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = always_on();
        let mut resonance = Resonance::new();
        assert!(!resonance.check_trigger(0.5, &config, &mut rng));
        assert!(resonance.check_trigger(1.0, &config, &mut rng));
        let active = resonance.active.unwrap();
        assert!((2.0..=3.0).contains(&active.duration));
        assert_eq!(active.start_time, 1.0);
    }

    #[test]
    fn test_disabled_or_zero_interval_never_triggers() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut resonance = Resonance::new();
        let disabled = PatternConfig {
            resonance_enabled: false,
            ..always_on()
        };
        let zero_interval = PatternConfig {
            resonance_check_interval: 0.0,
            ..always_on()
        };
        for i in 0..100 {
            let t = i as f64;
            assert!(!resonance.check_trigger(t, &disabled, &mut rng));
            assert!(!resonance.check_trigger(t, &zero_interval, &mut rng));
        }
    }

    #[test]
    fn test_failed_roll_still_consumes_interval() {
        let mut rng = StdRng::seed_from_u64(13);
        let config = PatternConfig {
            resonance_probability: 0.0,
            ..always_on()
        };
        let mut resonance = Resonance::new();
        assert!(!resonance.check_trigger(1.5, &config, &mut rng));
        assert_eq!(resonance.last_check, 1.5);
    }

    #[test]
    fn test_step_expires_burst() {
        let mut rng = StdRng::seed_from_u64(14);
        let config = always_on();
        let mut resonance = Resonance::new();
        assert!(resonance.step(1.0, 1.0, &config, &mut rng).is_some());
        let duration = resonance.active.unwrap().duration;
        assert!(resonance.step(1.0 + duration / 2.0, 1.0, &config, &mut rng).is_some());
        assert!(resonance
            .step(1.0 + duration + 0.01, 1.0, &config, &mut rng)
            .is_none());
        assert!(!resonance.is_active());
    }

    #[test]
    fn test_step_output_scaled_by_weak() {
        let mut rng = StdRng::seed_from_u64(15);
        let config = PatternConfig {
            weak: 200.0,
            strong: 40.0,
            resonance_intensity: 0.5,
            ..always_on()
        };
        let mut resonance = Resonance::new();
        let out = resonance.step(1.0, 1.0, &config, &mut rng).unwrap();
        // Burst start: raised sine sits at half of base = 0.5 * 40 * 0.5
        assert!((out.left - 10.0).abs() < 1e-9);
    }
}
