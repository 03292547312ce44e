//! Offline rendering
//!
//! Interleaves control ticks with audio frames at a fixed ratio, so a
//! performance renders deterministically and faster than real time.

use anyhow::Result;

use super::{ControlLoop, Mixer, SynthContext};

/// Runs the control loop and the mixer in lockstep
pub struct OfflineRenderer {
    control: ControlLoop,
    mixer: Mixer,
    frames_per_tick: usize,
    frame: u64,
}

impl OfflineRenderer {
    pub fn new(control: ControlLoop, mixer: Mixer, frames_per_tick: usize) -> Self {
        Self {
            control,
            mixer,
            frames_per_tick: frames_per_tick.max(1),
            frame: 0,
        }
    }

    pub fn context(&self) -> &SynthContext {
        self.control.context()
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Render one frame, running a control tick first when one is due
    pub fn next_frame(&mut self) -> [f32; 2] {
        if self.frame % self.frames_per_tick as u64 == 0 {
            self.control.tick();
        }
        self.frame += 1;
        self.mixer.render_frame()
    }

    /// Render `frames` frames into `sink`
    pub fn render<F>(&mut self, frames: u64, mut sink: F) -> Result<()>
    where
        F: FnMut([f32; 2]) -> Result<()>,
    {
        for _ in 0..frames {
            sink(self.next_frame())?;
        }
        Ok(())
    }
}
