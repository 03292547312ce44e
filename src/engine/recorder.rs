//! Stereo WAV capture
//!
//! Frames arrive one at a time from the offline renderer and are stored
//! as interleaved 32-bit float, left then right.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes rendered frames to a WAV file
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    frames: u64,
}

impl Recorder {
    /// Create `path` (truncating it) for a stream at `sample_rate`
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let format = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, format)
            .with_context(|| format!("cannot open {:?} for recording", path))?;

        Ok(Self {
            writer,
            sample_rate,
            frames: 0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Seconds of audio captured so far
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    /// Append one stereo frame
    pub fn write_frame(&mut self, frame: [f32; 2]) -> Result<()> {
        for sample in frame {
            self.writer
                .write_sample(sample)
                .context("WAV write failed")?;
        }
        self.frames += 1;
        Ok(())
    }

    /// Flush and patch the header; the file is truncated without this
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("cannot finalize recording")
    }
}
