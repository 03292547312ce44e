//! CLI interface for touchsynth

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Four-voice touch-sensor synthesizer
#[derive(Parser)]
#[command(name = "touchsynth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log note triggers and other debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the scripted performance in real time
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "touchsynth.yaml")]
        config: PathBuf,

        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Render the scripted performance to a stereo WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "touchsynth.yaml")]
        config: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds (default: end of the script plus a release tail)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Print live sensor readings as JSON
    Monitor {
        /// Configuration file path
        #[arg(short, long, default_value = "touchsynth.yaml")]
        config: PathBuf,

        /// Milliseconds between snapshots
        #[arg(short, long, default_value = "200")]
        interval: u64,

        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Show or edit sensor calibration
    Calibrate {
        /// Configuration file path
        #[arg(short, long, default_value = "touchsynth.yaml")]
        config: PathBuf,

        #[command(subcommand)]
        action: CalibrateAction,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "touchsynth.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[derive(Subcommand)]
pub enum CalibrateAction {
    /// Print the calibration table as JSON
    Show,

    /// Change one sensor's reference readings and save
    ///
    /// Empty or non-numeric values leave that reading unchanged.
    Set {
        /// Sensor index (0-3)
        #[arg(short, long)]
        sensor: usize,

        /// Reading with nothing on the sensor
        #[arg(long)]
        idle: Option<String>,

        /// Reading under a light touch
        #[arg(long)]
        touch: Option<String>,

        /// Reading under full contact
        #[arg(long)]
        barefoot: Option<String>,
    },

    /// Restore the built-in defaults and save
    Reset,
}
