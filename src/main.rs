//! touchsynth - Four-voice touch-sensor synthesizer

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use touchsynth::calibration::{default_calibration, CalibrationStore, JsonCalibrationStore, TriplePatch};
use touchsynth::config;
use touchsynth::engine::{list_output_devices, Engine, Player, Recorder, SynthContext};
use touchsynth::NUM_VOICES;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{CalibrateAction, Cli, Commands};

/// Release tail appended to a recording when no duration is given
const TAIL_SECS: u64 = 2;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Play { config: config_path, duration } => {
            let cfg = config::load_config(&config_path)?;
            let mut store = JsonCalibrationStore::new(&cfg.calibration_file);
            let calibration = store.reload_if_changed().unwrap_or_else(|| store.load());

            let mut engine = Engine::new(cfg.clone(), calibration);
            let running = stop_on_ctrlc()?;

            let mut player = Player::new();
            player.start(&cfg.audio, |sample_rate| engine.mixer(sample_rate))?;

            info!("=== SYNTH STARTED === (Ctrl-C to stop)");
            info!("Format: S1[raw vol%] S2[raw vol%] S3[raw vol%] S4[raw vol%]");
            engine.run_control(&running, duration.map(Duration::from_secs), |ctx| {
                follow_calibration(ctx, &mut store);
                info!("{}", ctx.status_line());
            });

            player.stop();
            info!("Stopped");
        }

        Commands::Record {
            config: config_path,
            output,
            duration,
        } => {
            let cfg = config::load_config(&config_path)?;
            let calibration = JsonCalibrationStore::new(&cfg.calibration_file).load();

            let seconds = duration
                .unwrap_or_else(|| cfg.sensor.length_ms().div_ceil(1000).saturating_add(TAIL_SECS));
            let sample_rate = cfg.audio.sample_rate;
            let total_frames = u64::from(sample_rate).saturating_mul(seconds);

            info!("Recording {} seconds to {:?}...", seconds, output);

            let mut offline = Engine::new(cfg, calibration).into_offline();
            let mut recorder = Recorder::new(&output, sample_rate)?;

            offline.render(total_frames, |frame| recorder.write_frame(frame))?;

            let recorded = recorder.duration_secs();
            recorder.finalize()?;
            info!("Recorded {:.1} s to {:?}", recorded, output);
        }

        Commands::Monitor {
            config: config_path,
            interval,
            duration,
        } => {
            let mut cfg = config::load_config(&config_path)?;
            cfg.control.report_interval_ms = interval.max(1);
            let mut store = JsonCalibrationStore::new(&cfg.calibration_file);
            let calibration = store.reload_if_changed().unwrap_or_else(|| store.load());

            let mut engine = Engine::new(cfg, calibration);
            let running = stop_on_ctrlc()?;

            engine.run_control(&running, duration.map(Duration::from_secs), |ctx| {
                follow_calibration(ctx, &mut store);
                match serde_json::to_string(&ctx.monitor_snapshot()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Failed to encode readings: {}", e),
                }
            });
        }

        Commands::Calibrate {
            config: config_path,
            action,
        } => {
            let cfg = config::load_config(&config_path)?;
            let mut store = JsonCalibrationStore::new(&cfg.calibration_file);
            let mut calibration = store.load();

            match action {
                CalibrateAction::Show => {}
                CalibrateAction::Set {
                    sensor,
                    idle,
                    touch,
                    barefoot,
                } => {
                    if sensor >= NUM_VOICES {
                        bail!("Sensor must be between 0 and {}", NUM_VOICES - 1);
                    }
                    let patch = TriplePatch { idle, touch, barefoot };
                    patch.apply(&mut calibration[sensor]);
                    store
                        .save(&calibration)
                        .with_context(|| format!("failed to save {:?}", store.path()))?;
                    info!("Saved calibration to {:?}", store.path());
                }
                CalibrateAction::Reset => {
                    calibration = default_calibration();
                    store
                        .save(&calibration)
                        .with_context(|| format!("failed to save {:?}", store.path()))?;
                    info!("Restored default calibration in {:?}", store.path());
                }
            }

            println!("{}", serde_json::to_string_pretty(&calibration[..])?);
        }

        Commands::Devices => {
            println!("Available output devices:\n");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Poll interval: {} ms", cfg.control.poll_interval_ms);
                    println!("  Calibration: {:?}", cfg.calibration_file);
                    for (i, voice) in cfg.voices.iter().enumerate() {
                        println!(
                            "    - S{} starts at {:.2} Hz, notes {:?}",
                            i + 1,
                            voice.initial_pitch,
                            voice.notes
                        );
                    }
                    println!("  Gestures: {}", cfg.sensor.gestures.len());
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../touchsynth.example.yaml");

            let path = "touchsynth.yaml";
            if std::path::Path::new(path).exists() {
                println!("touchsynth.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created touchsynth.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// A flag that clears on Ctrl-C
fn stop_on_ctrlc() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("failed to install Ctrl-C handler")?;
    Ok(running)
}

/// Swap in calibration edited on disk while running
fn follow_calibration(ctx: &SynthContext, store: &mut JsonCalibrationStore) {
    if ctx.refresh_calibration(store) {
        info!("Calibration reloaded from {:?}", store.path());
    }
}
