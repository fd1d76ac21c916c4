//! Session trace example
//!
//! Runs a built-in preset offline and writes the per-tick levels to CSV.
//!
//! ```text
//! cargo run --example session_trace -- "Rhythmic Flow" 7
//! ```

use rumble_pattern::presets::{builtin, builtin_names};
use rumble_pattern::{simulate, Phase, PatternError, TickRecord};
use std::env;
use std::fs::{self, File};
use std::io::Write;

const DT: f64 = 0.01;

fn rms(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v * v, n + 1));
    if n == 0 {
        0.0
    } else {
        (sum / n as f64).sqrt()
    }
}

/// Number of distinct resonance overlays in the trace
fn resonance_episodes(records: &[TickRecord]) -> usize {
    let mut episodes = 0;
    let mut active = false;
    for record in records {
        let now = record.resonance_mode.is_some();
        if now && !active {
            episodes += 1;
        }
        active = now;
    }
    episodes
}

fn main() -> Result<(), PatternError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let preset = args.next().unwrap_or_else(|| "Quick Test".to_string());
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);

    let config = match builtin(&preset) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}; available presets: {}", builtin_names().join(", "));
            return Err(e);
        }
    };

    println!("Running session trace...\n");
    println!("Configuration:");
    println!("  Preset: {preset}");
    println!("  Mode: {}", config.mode);
    println!("  Session length: {:.1}s", config.session_length);
    println!("  Peak time: {:.1}s", config.peak_time);
    println!("  Seed: {seed}");
    println!();

    let records = simulate(&config, seed, DT)?;

    let buzz_ticks = records.iter().filter(|r| r.phase == Phase::Buzz).count();
    let peak_left = records.iter().map(|r| r.left).fold(0.0, f64::max);
    let peak_right = records.iter().map(|r| r.right).fold(0.0, f64::max);

    println!("Results:");
    println!("  Ticks: {}", records.len());
    println!(
        "  Buzz duty: {:.1}%",
        100.0 * buzz_ticks as f64 / records.len().max(1) as f64
    );
    println!(
        "  RMS level: left {:.1}, right {:.1}",
        rms(records.iter().map(|r| r.left)),
        rms(records.iter().map(|r| r.right))
    );
    println!("  Peak level: left {peak_left:.1}, right {peak_right:.1}");
    println!("  Resonance episodes: {}", resonance_episodes(&records));

    fs::create_dir_all("out")?;
    let path = "out/session_trace.csv";
    let mut file = File::create(path)?;
    writeln!(file, "t,left,right,phase,active_motor,resonance_mode,envelope")?;
    for r in &records {
        writeln!(
            file,
            "{:.3},{:.3},{:.3},{},{},{},{:.4}",
            r.t,
            r.left,
            r.right,
            r.phase.as_str(),
            r.active_motor.map_or("", |m| m.as_str()),
            r.resonance_mode.map_or("", |m| m.as_str()),
            r.envelope_multiplier
        )?;
    }

    println!("\nTrace written to {path}");
    Ok(())
}
