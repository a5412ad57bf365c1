//! Three attractors driven from one set of controls, plus a blended bank.
//!
//! Halvorsen, Dadras and Lorenz each get the shared shape and speed fanned out
//! into their own domains. Besides each family's four channels the bank sums
//! the three trajectories per axis with fixed weights.

use crate::attractors::{
    Dadras, DadrasAttractor, Halvorsen, HalvorsenAttractor, Lorenz, LorenzAttractor,
};
use crate::conditioner::{
    amplitude_gain, ChannelFrame, ChannelMap, ObservedOutputs, OutputMapping, Voicing,
};
use crate::controls::{Control, AMPLITUDE_DEFAULT, SPEED_DEFAULT, SPEED_RANGE};
use serde::{Deserialize, Serialize};

pub const SHAPE_RANGE: (f32, f32) = (0.1, 10.0);
pub const SHAPE_DEFAULT: f32 = 5.0;

pub const SPEED_DEPTH: f32 = 0.2;
pub const SHAPE_DEPTH: f32 = 2.0;
pub const AMPLITUDE_DEPTH: f32 = 2.0;

/// Normalizes the sum of three weighted trajectories back into range.
pub const BLEND_NORMALIZATION: f32 = 0.35;

const HALVORSEN_SPEED: f32 = 0.75;
const DADRAS_SPEED: f32 = 0.5;
const LORENZ_SPEED: f32 = 0.03;

/// Lorenz channels of the bank run quieter than the standalone module.
const LORENZ_TRIM: f32 = 0.214;

const HALVORSEN_WEIGHTS: OutputMapping = OutputMapping::new(
    ChannelMap::new(0.2, 1.6),
    ChannelMap::new(0.2, 1.6),
    ChannelMap::new(0.2, 1.6),
    ChannelMap::new(0.11, 1.6),
);
const DADRAS_WEIGHTS: OutputMapping = OutputMapping::new(
    ChannelMap::new(0.74, 0.0),
    ChannelMap::new(0.9, 0.0),
    ChannelMap::new(0.9, 0.0),
    ChannelMap::new(0.41, 0.0),
);
const LORENZ_WEIGHTS: OutputMapping = OutputMapping::new(
    ChannelMap::new(0.06, 0.0),
    ChannelMap::new(0.043, 0.0),
    ChannelMap::new(0.05, -1.25),
    ChannelMap::new(0.0235, 0.75),
);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanguorControls {
    pub speed: Control,
    pub shape: Control,
    pub amplitude: Control,
}

impl Default for LanguorControls {
    fn default() -> Self {
        Self {
            speed: Control::new(SPEED_DEFAULT),
            shape: Control::new(SHAPE_DEFAULT),
            amplitude: Control::new(AMPLITUDE_DEFAULT),
        }
    }
}

/// Observation flags for the four banks of outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguorObserved {
    pub halvorsen: ObservedOutputs,
    pub dadras: ObservedOutputs,
    pub lorenz: ObservedOutputs,
    pub blend: ObservedOutputs,
}

impl LanguorObserved {
    pub const ALL: LanguorObserved = LanguorObserved {
        halvorsen: ObservedOutputs::ALL,
        dadras: ObservedOutputs::ALL,
        lorenz: ObservedOutputs::ALL,
        blend: ObservedOutputs::ALL,
    };

    /// Sixteen bits, four per bank in the order halvorsen, dadras, lorenz, blend.
    pub fn from_mask(mask: u32) -> Self {
        Self {
            halvorsen: ObservedOutputs::from_mask(mask),
            dadras: ObservedOutputs::from_mask(mask >> 4),
            lorenz: ObservedOutputs::from_mask(mask >> 8),
            blend: ObservedOutputs::from_mask(mask >> 12),
        }
    }

    pub fn any(&self) -> bool {
        self.halvorsen.any() || self.dadras.any() || self.lorenz.any() || self.blend.any()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguorFrame {
    pub halvorsen: ChannelFrame,
    pub dadras: ChannelFrame,
    pub lorenz: ChannelFrame,
    pub blend: ChannelFrame,
}

#[derive(Debug, Clone, Default)]
pub struct Languor {
    halvorsen: HalvorsenAttractor<f32>,
    dadras: DadrasAttractor<f32>,
    lorenz: LorenzAttractor<f32>,
}

impl Languor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halvorsen(&self) -> &HalvorsenAttractor<f32> {
        &self.halvorsen
    }

    pub fn dadras(&self) -> &DadrasAttractor<f32> {
        &self.dadras
    }

    pub fn lorenz(&self) -> &LorenzAttractor<f32> {
        &self.lorenz
    }

    /// Runs one sample of all three attractors, or nothing if no output of
    /// any bank is observed.
    pub fn process(
        &mut self,
        sample_rate: f32,
        controls: &LanguorControls,
        observed: &LanguorObserved,
    ) -> Option<LanguorFrame> {
        if !observed.any() {
            return None;
        }

        let shape = controls.shape.resolve(SHAPE_DEPTH, SHAPE_RANGE);
        let speed = controls.speed.resolve(SPEED_DEPTH, SPEED_RANGE);
        let amplitude = amplitude_gain(&controls.amplitude, AMPLITUDE_DEPTH);
        let dt = 1.0 / sample_rate;

        self.halvorsen.set_shape(shape / 25.0 + 1.23);
        self.halvorsen.speed = speed * HALVORSEN_SPEED;
        self.halvorsen.step(dt);

        self.dadras.set_shape(shape / 4.0 + 1.5);
        self.dadras.speed = speed * DADRAS_SPEED;
        self.dadras.step(dt);

        self.lorenz.set_shape(shape / 4.0 + 0.6);
        self.lorenz.speed = speed * LORENZ_SPEED;
        self.lorenz.step(dt);

        let h = self.halvorsen.state();
        let d = self.dadras.state();
        let l = self.lorenz.state();

        let blend = (HALVORSEN_WEIGHTS.affine(&h)
            + DADRAS_WEIGHTS.affine(&d)
            + LORENZ_WEIGHTS.affine(&l))
        .scaled(BLEND_NORMALIZATION * amplitude)
        .recover_non_finite();

        Some(LanguorFrame {
            halvorsen: <Halvorsen<f32> as Voicing>::MAPPING.map(&h, amplitude),
            dadras: <Dadras<f32> as Voicing>::MAPPING.map(&d, amplitude),
            lorenz: <Lorenz<f32> as Voicing>::MAPPING
                .with_trim(LORENZ_TRIM)
                .map(&l, amplitude),
            blend,
        })
    }
}
