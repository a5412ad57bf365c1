//! Host-facing control values and the bounds they are clamped into.

use crate::error::AnomaliesError;
use serde::{Deserialize, Serialize};

/// Base speed range shared by every family, before the family multiplier.
pub const SPEED_RANGE: (f32, f32) = (0.001, 1.0);
pub const SPEED_DEFAULT: f32 = 0.5;

pub const AMPLITUDE_RANGE: (f32, f32) = (0.1, 10.0);
/// ±5 V bipolar output at unity gain.
pub const AMPLITUDE_DEFAULT: f32 = 5.0;
/// Brings the amplitude knob down so that its default is a gain of 1.
pub const AMPLITUDE_PRESCALE: f32 = 0.2;

/// A knob position plus whatever modulation is patched into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub value: f32,
    #[serde(default)]
    pub modulation: f32,
}

impl Control {
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            modulation: 0.0,
        }
    }

    pub const fn with_modulation(value: f32, modulation: f32) -> Self {
        Self { value, modulation }
    }

    /// Sums the knob with the modulation scaled by `depth`, then clamps into
    /// `range`. A NaN sum lands on the lower bound.
    pub fn resolve(&self, depth: f32, range: (f32, f32)) -> f32 {
        let sum = self.value + self.modulation * depth;
        if sum.is_nan() {
            range.0
        } else {
            sum.clamp(range.0, range.1)
        }
    }
}

/// Validates a host-supplied sample rate.
pub fn sample_rate(value: f32) -> Result<f32, AnomaliesError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnomaliesError::InvalidSampleRate(value))
    }
}
