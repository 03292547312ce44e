//! Real-time audio playback using cpal
//!
//! The mixer is moved into the output callback and owned there; the
//! callback shares nothing with the control loop except the atomics in
//! [`SynthContext`](super::SynthContext).

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedBufferSize,
    SupportedStreamConfig, SupportedStreamConfigRange,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::Mixer;
use crate::config::AudioConfig;

/// Real-time audio player
pub struct Player {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the output device and start rendering
    ///
    /// `make_mixer` receives the stream's actual sample rate. Returns
    /// that sample rate.
    pub fn start<F>(&mut self, audio: &AudioConfig, make_mixer: F) -> Result<u32>
    where
        F: FnOnce(f64) -> Mixer,
    {
        let host = cpal::default_host();
        let device = match &audio.device {
            Some(name) => find_output_device(&host, name)?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))?,
        };

        let supported = pick_config(&device, audio.sample_rate)?;
        let sample_format = supported.sample_format();
        let frames = audio.buffer_size as u32;
        let buffer_size = match supported.buffer_size() {
            SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&frames) => {
                BufferSize::Fixed(frames)
            }
            _ => BufferSize::Default,
        };
        let mut stream_config: StreamConfig = supported.into();
        stream_config.buffer_size = buffer_size;

        let sample_rate = stream_config.sample_rate.0;
        info!(
            "Output: {} ({} Hz, {} ch, {} frame buffer)",
            device.name().unwrap_or_default(),
            sample_rate,
            stream_config.channels,
            audio.buffer_size
        );

        let mixer = make_mixer(sample_rate as f64);

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer, running)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer, running)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer, running)?,
            _ => return Err(anyhow!("Unsupported sample format")),
        };

        stream.play()?;
        self.stream = Some(stream);

        Ok(sample_rate)
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn find_output_device(host: &cpal::Host, name: &str) -> Result<Device> {
    host.output_devices()?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| anyhow!("Output device '{}' not found", name))
}

/// Sample formats the output callback can be built for
fn is_renderable(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16)
}

/// Best stereo range covering `sample_rate` in a renderable format
///
/// Backends list ranges in no particular order, so ranges are ranked
/// with cpal's default heuristics (F32 first).
fn best_config<I>(ranges: I, sample_rate: u32) -> Option<SupportedStreamConfig>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let wanted = SampleRate(sample_rate);
    ranges
        .into_iter()
        .filter(|range| {
            range.channels() >= 2
                && is_renderable(range.sample_format())
                && range.min_sample_rate() <= wanted
                && wanted <= range.max_sample_rate()
        })
        .max_by(|a, b| a.cmp_default_heuristics(b))
        .map(|range| range.with_sample_rate(wanted))
}

/// The configured sample rate if the device supports it, else its default
fn pick_config(device: &Device, sample_rate: u32) -> Result<SupportedStreamConfig> {
    if let Ok(ranges) = device.supported_output_configs() {
        if let Some(config) = best_config(ranges, sample_rate) {
            return Ok(config);
        }
    }

    let fallback = device.default_output_config()?;
    warn!(
        "{} Hz stereo not supported, using {} Hz, {} ch",
        sample_rate,
        fallback.sample_rate().0,
        fallback.channels()
    );
    Ok(fallback)
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mut mixer: Mixer,
    running: Arc<AtomicBool>,
) -> Result<Stream> {
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            if running.load(Ordering::Relaxed) {
                mixer.fill_buffer(data, channels);
            } else {
                data.fill(T::EQUILIBRIUM);
            }
        },
        |err| {
            warn!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

/// All output devices with their default stream config
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let Ok(devices) = cpal::default_host().output_devices() else {
        return Vec::new();
    };
    devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            let config = device.default_output_config().ok()?;
            Some((name, config.into()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Range { min: 64, max: 8192 },
            format,
        )
    }

    #[test]
    fn test_skips_formats_the_callback_cannot_render() {
        // Plug devices often list 8-bit formats first
        let ranges = vec![
            range(2, 8000, 192000, SampleFormat::I8),
            range(2, 8000, 192000, SampleFormat::U8),
            range(2, 8000, 192000, SampleFormat::I16),
            range(2, 8000, 192000, SampleFormat::F32),
        ];
        let config = best_config(ranges, 32000).unwrap();
        assert_eq!(config.sample_format(), SampleFormat::F32);
        assert_eq!(config.sample_rate(), SampleRate(32000));
        assert_eq!(config.channels(), 2);
    }

    #[test]
    fn test_integer_format_when_no_float() {
        let ranges = vec![
            range(2, 8000, 48000, SampleFormat::U8),
            range(2, 8000, 48000, SampleFormat::I16),
        ];
        let config = best_config(ranges, 32000).unwrap();
        assert_eq!(config.sample_format(), SampleFormat::I16);
    }

    #[test]
    fn test_no_match_for_mono_or_missing_rate() {
        let ranges = vec![
            range(1, 8000, 48000, SampleFormat::F32),
            range(2, 44100, 48000, SampleFormat::F32),
            range(2, 8000, 48000, SampleFormat::I8),
        ];
        assert!(best_config(ranges, 32000).is_none());
    }
}
