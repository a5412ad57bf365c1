//! Dual polyphonic attenuverter: `clamp(in * scale + offset, -12, 12)`.

use serde::{Deserialize, Serialize};

pub const MAX_CHANNELS: usize = 16;
pub const SCALE_RANGE: (f32, f32) = (-3.0, 3.0);
pub const OFFSET_RANGE: (f32, f32) = (-10.0, 10.0);
pub const OUTPUT_LIMIT: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuverterControls {
    pub scale: f32,
    pub offset: f32,
}

impl Default for AttenuverterControls {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl AttenuverterControls {
    /// Knob positions, clamped into their travel.
    pub fn new(scale: f32, offset: f32) -> Self {
        Self {
            scale: scale.clamp(SCALE_RANGE.0, SCALE_RANGE.1),
            offset: offset.clamp(OFFSET_RANGE.0, OFFSET_RANGE.1),
        }
    }

    #[inline]
    pub fn apply(&self, input: f32) -> f32 {
        (input * self.scale + self.offset).clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    A,
    B,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DualAttenuverter {
    pub a: AttenuverterControls,
    pub b: AttenuverterControls,
}

impl DualAttenuverter {
    pub fn controls(&self, lane: Lane) -> &AttenuverterControls {
        match lane {
            Lane::A => &self.a,
            Lane::B => &self.b,
        }
    }

    /// Processes one lane's polyphonic input into `output`.
    ///
    /// Returns the number of channels written, which follows the input up to
    /// [`MAX_CHANNELS`], or `None` when the lane's output is not observed.
    pub fn process(
        &self,
        lane: Lane,
        input: &[f32],
        observed: bool,
        output: &mut [f32],
    ) -> Option<usize> {
        if !observed {
            return None;
        }
        let controls = self.controls(lane);
        let channels = input.len().min(output.len()).min(MAX_CHANNELS);
        for (out, &value) in output.iter_mut().zip(input).take(channels) {
            *out = controls.apply(value);
        }
        Some(channels)
    }
}
