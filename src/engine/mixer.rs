//! Mixer: the audio-rate side of the instrument
//!
//! Each frame it:
//! - glides every voice's pitch toward its published target
//! - follows every voice's published intensity with the envelope
//! - sums the oscillators weighted by loudness
//! - low-passes the mix with a cutoff that tracks total loudness
//!
//! Rendering reads shared atomics only and never allocates or blocks.

use std::sync::Arc;

use cpal::{FromSample, Sample};

use super::SynthContext;
use crate::synth::{Envelope, Filter, OscillatorBank, PitchGlide};
use crate::NUM_VOICES;

/// Filter cutoff in Hz per unit of total loudness
pub const CUTOFF_PER_LOUDNESS: f64 = 2500.0;

/// Resonance of the output filter
pub const FILTER_RESONANCE: f64 = 0.5;

/// Headroom so four loud voices do not clip
pub const OUTPUT_GAIN: f64 = 0.25;

/// Renders stereo frames from the shared voice state
pub struct Mixer {
    context: Arc<SynthContext>,
    glides: [PitchGlide; NUM_VOICES],
    envelopes: [Envelope; NUM_VOICES],
    oscillators: OscillatorBank,
    filter: Filter,
}

impl Mixer {
    /// Create a mixer whose voices start at their current target pitch
    pub fn new(context: Arc<SynthContext>, sample_rate: f64) -> Self {
        let glides = std::array::from_fn(|i| PitchGlide::new(context.voice(i).target_pitch()));

        let mut filter = Filter::new(sample_rate);
        filter.set_resonance(FILTER_RESONANCE);
        filter.set_cutoff(0.0);

        Self {
            context,
            glides,
            envelopes: std::array::from_fn(|_| Envelope::new()),
            oscillators: OscillatorBank::new(sample_rate),
            filter,
        }
    }

    /// Current (gliding) pitch of `voice`
    pub fn pitch(&self, voice: usize) -> f64 {
        self.glides[voice].current()
    }

    pub fn envelope(&self, voice: usize) -> &Envelope {
        &self.envelopes[voice]
    }

    /// Render the next stereo frame
    pub fn render_frame(&mut self) -> [f32; 2] {
        let mut mixed = 0.0;
        let mut total_loudness = 0.0;

        for voice in 0..NUM_VOICES {
            let shared = self.context.voice(voice);

            let pitch = self.glides[voice].process(shared.target_pitch());
            let loudness = self.envelopes[voice].process(shared.intensity());
            shared.publish_loudness(loudness);

            mixed += self.oscillators.generate(voice, pitch) * loudness;
            total_loudness += loudness;
        }

        self.filter.set_cutoff(CUTOFF_PER_LOUDNESS * total_loudness);
        let output = (self.filter.process(mixed) * OUTPUT_GAIN) as f32;

        [output, output]
    }

    /// Fill an interleaved buffer with `channels` channels per frame
    ///
    /// Channels past the second are written as silence. A mono buffer
    /// gets the left channel.
    pub fn fill_buffer<T>(&mut self, buffer: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in buffer.chunks_mut(channels.max(1)) {
            let stereo = self.render_frame();
            for (i, sample) in frame.iter_mut().enumerate() {
                *sample = match stereo.get(i) {
                    Some(&value) => T::from_sample(value),
                    None => T::EQUILIBRIUM,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::default_calibration;
    use crate::config::SynthConfig;
    use crate::mapping::ContactState;

    fn mixer() -> Mixer {
        let context = Arc::new(SynthContext::new(&SynthConfig::default(), default_calibration()));
        Mixer::new(context, 32000.0)
    }

    #[test]
    fn test_untouched_is_silent() {
        let mut mixer = mixer();
        for _ in 0..10000 {
            assert_eq!(mixer.render_frame(), [0.0, 0.0]);
        }
        for voice in 0..NUM_VOICES {
            assert_eq!(mixer.envelope(voice).level(), 0.0);
        }
    }

    #[test]
    fn test_touch_produces_sound() {
        let mut mixer = mixer();
        mixer.context.voice(1).publish_reading(15, ContactState::Barefoot, 1.0);

        let mut peak = 0.0f32;
        for _ in 0..3200 {
            let [left, right] = mixer.render_frame();
            assert_eq!(left, right);
            peak = peak.max(left.abs());
        }

        assert!(peak > 0.05, "Expected audible output, got {}", peak);
        assert!(peak <= 1.0);
        assert!((mixer.context.voice(1).loudness() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_release_leaves_a_tail() {
        let mut mixer = mixer();
        let voice = mixer.context.voice(0);
        voice.publish_reading(15, ContactState::Barefoot, 1.0);
        for _ in 0..1000 {
            mixer.render_frame();
        }

        mixer.context.voice(0).publish_reading(70, ContactState::Idle, 0.0);
        for _ in 0..100 {
            mixer.render_frame();
        }
        // 0.99^100
        let level = mixer.envelope(0).level();
        assert!(level > 0.3 && level < 0.4, "level {}", level);
    }

    #[test]
    fn test_pitch_glides_to_new_target() {
        let mut mixer = mixer();
        assert_eq!(mixer.pitch(2), 392.0);

        mixer.context.voice(2).publish_note(0, 293.66);
        mixer.render_frame();
        assert!(mixer.pitch(2) < 392.0 && mixer.pitch(2) > 293.66);

        for _ in 0..10000 {
            mixer.render_frame();
        }
        assert!((mixer.pitch(2) - 293.66).abs() < 1e-6);
    }

    #[test]
    fn test_all_voices_loud_stays_in_range() {
        let mut mixer = mixer();
        for voice in 0..NUM_VOICES {
            mixer.context.voice(voice).publish_reading(0, ContactState::Barefoot, 1.0);
        }
        for _ in 0..64000 {
            let [left, _] = mixer.render_frame();
            assert!(left.is_finite() && left.abs() < 1.5);
        }
    }

    #[test]
    fn test_fill_buffer_layouts() {
        let mut mixer = mixer();
        mixer.context.voice(0).publish_reading(15, ContactState::Barefoot, 1.0);

        let mut stereo = vec![0.0f32; 512];
        mixer.fill_buffer(&mut stereo, 2);
        assert!(stereo.chunks(2).all(|f| f[0] == f[1]));
        assert!(stereo.iter().any(|&s| s != 0.0));

        let mut quad = vec![1.0f32; 64];
        mixer.fill_buffer(&mut quad, 4);
        assert!(quad.chunks(4).all(|f| f[2] == 0.0 && f[3] == 0.0));
    }

    #[test]
    fn test_fill_buffer_integer_formats() {
        let mut mixer = mixer();

        // Untouched: integer silence is the format's midpoint
        let mut unsigned = vec![0u16; 64];
        mixer.fill_buffer(&mut unsigned, 2);
        assert!(unsigned.iter().all(|&s| s == u16::EQUILIBRIUM));

        mixer.context.voice(2).publish_reading(15, ContactState::Barefoot, 1.0);
        let mut signed = vec![0i16; 4096];
        mixer.fill_buffer(&mut signed, 2);
        assert!(signed.chunks(2).all(|f| f[0] == f[1]));
        assert!(signed.iter().any(|&s| s != 0));
    }
}
