//! Turns raw attractor trajectories into bounded output levels.
//!
//! A [`SignalConditioner`] owns one attractor. Each processed sample it clamps
//! the incoming controls into the family's domain, advances the trajectory by
//! `1 / sample_rate`, and maps (x, y, z, x + y - z) through the family's fixed
//! affine coefficients scaled by the amplitude control.

use crate::attractors::{
    Attractor, AttractorState, Dadras, Halvorsen, Lorenz, Sakarya, SprottLinzF, Thomas,
};
use crate::controls::{
    Control, AMPLITUDE_DEFAULT, AMPLITUDE_PRESCALE, AMPLITUDE_RANGE, SPEED_DEFAULT, SPEED_RANGE,
};
use crate::traits::Family;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// `scale * v + offset` for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelMap {
    pub scale: f32,
    pub offset: f32,
}

impl ChannelMap {
    pub const IDENTITY: ChannelMap = ChannelMap::new(1.0, 0.0);

    pub const fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        self.scale * value + self.offset
    }
}

/// Per-family output coefficients for x, y, z and the t-factor.
///
/// `trim` is an extra fixed gain applied on top of the amplitude control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputMapping {
    pub x: ChannelMap,
    pub y: ChannelMap,
    pub z: ChannelMap,
    pub t: ChannelMap,
    pub trim: f32,
}

impl OutputMapping {
    pub const fn new(x: ChannelMap, y: ChannelMap, z: ChannelMap, t: ChannelMap) -> Self {
        Self {
            x,
            y,
            z,
            t,
            trim: 1.0,
        }
    }

    pub const fn with_trim(self, trim: f32) -> Self {
        Self { trim, ..self }
    }

    /// The affine part alone, before amplitude and trim.
    pub fn affine(&self, state: &AttractorState<f32>) -> ChannelFrame {
        ChannelFrame {
            x: self.x.apply(state.x),
            y: self.y.apply(state.y),
            z: self.z.apply(state.z),
            t: self.t.apply(state.t_factor()),
        }
    }

    /// Output levels for `state`. A channel that overflows reads as zero.
    pub fn map(&self, state: &AttractorState<f32>, amplitude: f32) -> ChannelFrame {
        self.affine(state)
            .scaled(amplitude * self.trim)
            .recover_non_finite()
    }
}

/// One sample's worth of output, one value per logical channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelFrame {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub t: f32,
}

impl ChannelFrame {
    pub fn scaled(self, gain: f32) -> Self {
        Self {
            x: self.x * gain,
            y: self.y * gain,
            z: self.z * gain,
            t: self.t * gain,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.t]
    }

    pub fn recover_non_finite(self) -> Self {
        let guard = |v: f32| if v.is_finite() { v } else { 0.0 };
        Self {
            x: guard(self.x),
            y: guard(self.y),
            z: guard(self.z),
            t: guard(self.t),
        }
    }
}

impl Add for ChannelFrame {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
            t: self.t + rhs.t,
        }
    }
}

/// Which outputs the host currently has connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedOutputs {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub t: bool,
}

impl ObservedOutputs {
    pub const ALL: ObservedOutputs = ObservedOutputs {
        x: true,
        y: true,
        z: true,
        t: true,
    };
    pub const NONE: ObservedOutputs = ObservedOutputs {
        x: false,
        y: false,
        z: false,
        t: false,
    };

    /// Bits 0..=3 select x, y, z, t.
    pub fn from_mask(mask: u32) -> Self {
        Self {
            x: mask & 0b0001 != 0,
            y: mask & 0b0010 != 0,
            z: mask & 0b0100 != 0,
            t: mask & 0b1000 != 0,
        }
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z || self.t
    }

    /// Flags in channel order, matching [`ChannelFrame::to_array`].
    pub fn to_array(self) -> [bool; 4] {
        [self.x, self.y, self.z, self.t]
    }
}

/// Controls read fresh every sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorControls {
    pub speed: Control,
    pub shape: Control,
    pub amplitude: Control,
}

impl AttractorControls {
    /// Knobs at their defaults for family `F`, nothing patched.
    pub fn for_family<F: Family<f32>>() -> Self {
        Self {
            speed: Control::new(SPEED_DEFAULT),
            shape: Control::new(F::default().shape()),
            amplitude: Control::new(AMPLITUDE_DEFAULT),
        }
    }
}

/// Fixed tuning that turns a family's trajectory into usable levels.
pub trait Voicing: Family<f32> {
    /// Applied to the clamped base speed before it reaches the attractor.
    const SPEED_MULTIPLIER: f32;
    const MAPPING: OutputMapping;
}

impl Voicing for Halvorsen<f32> {
    const SPEED_MULTIPLIER: f32 = 1.5;
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::new(0.5, 1.6),
        ChannelMap::new(0.5, 1.6),
        ChannelMap::new(0.5, 1.6),
        ChannelMap::new(0.23, 1.6),
    );
}

impl Voicing for Lorenz<f32> {
    const SPEED_MULTIPLIER: f32 = 1.5;
    // trim of 1.07 turns the shared 0.2 prescale into 0.214
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::new(0.23, 0.0),
        ChannelMap::new(0.17, 0.0),
        ChannelMap::new(0.20, -5.0),
        ChannelMap::new(0.094, 3.0),
    )
    .with_trim(1.07);
}

impl Voicing for Thomas<f32> {
    const SPEED_MULTIPLIER: f32 = 5.0;
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::IDENTITY,
        ChannelMap::IDENTITY,
        ChannelMap::IDENTITY,
        ChannelMap::new(0.75, 0.0),
    );
}

impl Voicing for Sakarya<f32> {
    const SPEED_MULTIPLIER: f32 = 3.0;
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::new(0.2, 0.0),
        ChannelMap::new(0.35, 0.0),
        ChannelMap::new(0.35, -0.75),
        ChannelMap::new(0.11, 0.0),
    );
}

impl Voicing for Dadras<f32> {
    const SPEED_MULTIPLIER: f32 = 2.5;
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::new(0.37, 0.0),
        ChannelMap::new(0.45, 0.0),
        ChannelMap::new(0.45, 0.0),
        ChannelMap::new(0.205, 0.0),
    );
}

impl Voicing for SprottLinzF<f32> {
    const SPEED_MULTIPLIER: f32 = 4.5;
    const MAPPING: OutputMapping = OutputMapping::new(
        ChannelMap::new(2.2, 1.7),
        ChannelMap::new(1.92, 3.3),
        ChannelMap::new(1.8, -4.4),
        ChannelMap::new(0.83, 4.1),
    );
}

/// The family's shape domain in `f32`.
pub fn shape_range<F: Family<f32>>() -> (f32, f32) {
    (F::SHAPE_RANGE.0 as f32, F::SHAPE_RANGE.1 as f32)
}

/// Resolves the amplitude control into the gain applied to mapped outputs.
pub fn amplitude_gain(amplitude: &Control, depth: f32) -> f32 {
    amplitude.resolve(depth, AMPLITUDE_RANGE) * AMPLITUDE_PRESCALE
}

#[derive(Debug, Clone)]
pub struct SignalConditioner<F: Voicing> {
    attractor: Attractor<f32, F>,
}

impl<F: Voicing> SignalConditioner<F> {
    pub fn new() -> Self {
        Self {
            attractor: Attractor::new(),
        }
    }

    pub fn attractor(&self) -> &Attractor<f32, F> {
        &self.attractor
    }

    pub fn attractor_mut(&mut self) -> &mut Attractor<f32, F> {
        &mut self.attractor
    }

    /// Runs one sample.
    ///
    /// Returns `None` without touching the trajectory when nothing is
    /// observed. Skipped samples are not made up later: the trajectory picks
    /// up from where it stopped.
    pub fn process(
        &mut self,
        sample_rate: f32,
        controls: &AttractorControls,
        observed: ObservedOutputs,
    ) -> Option<ChannelFrame> {
        if !observed.any() {
            return None;
        }

        self.attractor
            .set_shape(controls.shape.resolve(1.0, shape_range::<F>()));
        self.attractor.speed = controls.speed.resolve(1.0, SPEED_RANGE) * F::SPEED_MULTIPLIER;
        let amplitude = amplitude_gain(&controls.amplitude, 1.0);

        self.attractor.step(1.0 / sample_rate);
        Some(F::MAPPING.map(&self.attractor.state(), amplitude))
    }
}

impl<F: Voicing> Default for SignalConditioner<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;

    fn assert_frame_finite(frame: &ChannelFrame) {
        for value in frame.to_array() {
            assert!(value.is_finite(), "non-finite output {frame:?}");
        }
    }

    #[test]
    fn unobserved_outputs_skip_integration() {
        let mut conditioner = SignalConditioner::<Lorenz<f32>>::new();
        let controls = AttractorControls::for_family::<Lorenz<f32>>();
        let before = conditioner.attractor().state();

        for _ in 0..100 {
            assert!(conditioner
                .process(SR, &controls, ObservedOutputs::NONE)
                .is_none());
        }
        assert_eq!(conditioner.attractor().state(), before);
    }

    #[test]
    fn any_single_observed_output_runs_the_step() {
        let controls = AttractorControls::for_family::<Thomas<f32>>();
        for mask in [0b0001, 0b0010, 0b0100, 0b1000] {
            let mut conditioner = SignalConditioner::<Thomas<f32>>::new();
            let before = conditioner.attractor().state();
            let frame = conditioner.process(SR, &controls, ObservedOutputs::from_mask(mask));
            assert!(frame.is_some());
            assert_ne!(conditioner.attractor().state(), before);
        }
    }

    #[test]
    fn resuming_does_not_make_up_skipped_time() {
        let controls = AttractorControls::for_family::<Halvorsen<f32>>();
        let mut paused = SignalConditioner::<Halvorsen<f32>>::new();
        let mut steady = SignalConditioner::<Halvorsen<f32>>::new();

        for _ in 0..500 {
            paused.process(SR, &controls, ObservedOutputs::ALL);
            steady.process(SR, &controls, ObservedOutputs::ALL);
        }
        for _ in 0..1_000 {
            paused.process(SR, &controls, ObservedOutputs::NONE);
        }
        let resumed = paused.process(SR, &controls, ObservedOutputs::ALL);
        let reference = steady.process(SR, &controls, ObservedOutputs::ALL);

        assert_eq!(resumed, reference);
        assert_eq!(paused.attractor().state(), steady.attractor().state());
    }

    #[test]
    fn shape_and_speed_are_clamped_into_family_domain() {
        let mut conditioner = SignalConditioner::<Dadras<f32>>::new();
        let controls = AttractorControls {
            speed: Control::with_modulation(0.9, 5.0),
            shape: Control::with_modulation(4.0, 20.0),
            amplitude: Control::new(AMPLITUDE_DEFAULT),
        };
        conditioner.process(SR, &controls, ObservedOutputs::ALL);

        let attractor = conditioner.attractor();
        assert_eq!(attractor.params.q, 9.0);
        assert!((attractor.speed - 2.5).abs() < 1e-6);

        let controls = AttractorControls {
            speed: Control::new(-1.0),
            shape: Control::new(0.0),
            amplitude: Control::new(AMPLITUDE_DEFAULT),
        };
        conditioner.process(SR, &controls, ObservedOutputs::ALL);
        let attractor = conditioner.attractor();
        assert!((attractor.params.q - 1.445).abs() < 1e-6);
        assert!((attractor.speed - 0.001 * 2.5).abs() < 1e-7);
    }

    #[test]
    fn default_amplitude_is_unity_gain() {
        let mut conditioner = SignalConditioner::<Thomas<f32>>::new();
        let controls = AttractorControls::for_family::<Thomas<f32>>();
        let frame = conditioner
            .process(SR, &controls, ObservedOutputs::ALL)
            .expect("observed");
        let state = conditioner.attractor().state();

        assert!((frame.x - state.x).abs() < 1e-7);
        assert!((frame.y - state.y).abs() < 1e-7);
        assert!((frame.z - state.z).abs() < 1e-7);
        assert!((frame.t - 0.75 * state.t_factor()).abs() < 1e-7);
    }

    #[test]
    fn amplitude_scales_every_channel_linearly() {
        let mut unity = SignalConditioner::<SprottLinzF<f32>>::new();
        let mut doubled = SignalConditioner::<SprottLinzF<f32>>::new();
        let base = AttractorControls::for_family::<SprottLinzF<f32>>();
        let loud = AttractorControls {
            amplitude: Control::new(10.0),
            ..base
        };

        let a = unity.process(SR, &base, ObservedOutputs::ALL).unwrap();
        let b = doubled.process(SR, &loud, ObservedOutputs::ALL).unwrap();
        for (lhs, rhs) in a.to_array().iter().zip(b.to_array()) {
            assert!((lhs * 2.0 - rhs).abs() < 1e-5);
        }
    }

    #[test]
    fn lorenz_outputs_carry_the_trim() {
        let mut conditioner = SignalConditioner::<Lorenz<f32>>::new();
        let controls = AttractorControls::for_family::<Lorenz<f32>>();
        let frame = conditioner
            .process(SR, &controls, ObservedOutputs::ALL)
            .unwrap();
        let state = conditioner.attractor().state();
        let gain = 5.0 * 0.214;
        assert!((frame.x - 0.23 * state.x * gain).abs() < 1e-5);
        assert!((frame.z - (0.20 * state.z - 5.0) * gain).abs() < 1e-5);
        assert!((frame.t - (0.094 * state.t_factor() + 3.0) * gain).abs() < 1e-5);
    }

    /// One sample at default controls; checks the speed multiplier and every
    /// channel's `(scale * v + offset) * trim` against literal coefficients.
    fn check_voicing<F: Voicing>(multiplier: f32, channels: [(f32, f32); 4], trim: f32) {
        let mut conditioner = SignalConditioner::<F>::new();
        let controls = AttractorControls::for_family::<F>();
        let frame = conditioner
            .process(SR, &controls, ObservedOutputs::ALL)
            .expect("observed");
        let attractor = conditioner.attractor();
        assert!(
            (attractor.speed - SPEED_DEFAULT * multiplier).abs() < 1e-6,
            "{} speed {}",
            F::NAME,
            attractor.speed
        );

        let state = attractor.state();
        let inputs = [state.x, state.y, state.z, state.t_factor()];
        for (i, ((scale, offset), value)) in channels.iter().zip(inputs).enumerate() {
            let expected = (scale * value + offset) * trim;
            let actual = frame.to_array()[i];
            assert!(
                (actual - expected).abs() < 1e-5,
                "{} channel {i}: expected {expected}, got {actual}",
                F::NAME
            );
        }
    }

    #[test]
    fn every_family_uses_its_tuning() {
        check_voicing::<Halvorsen<f32>>(
            1.5,
            [(0.5, 1.6), (0.5, 1.6), (0.5, 1.6), (0.23, 1.6)],
            1.0,
        );
        check_voicing::<Lorenz<f32>>(
            1.5,
            [(0.23, 0.0), (0.17, 0.0), (0.20, -5.0), (0.094, 3.0)],
            1.07,
        );
        check_voicing::<Thomas<f32>>(
            5.0,
            [(1.0, 0.0), (1.0, 0.0), (1.0, 0.0), (0.75, 0.0)],
            1.0,
        );
        check_voicing::<Sakarya<f32>>(
            3.0,
            [(0.2, 0.0), (0.35, 0.0), (0.35, -0.75), (0.11, 0.0)],
            1.0,
        );
        check_voicing::<Dadras<f32>>(
            2.5,
            [(0.37, 0.0), (0.45, 0.0), (0.45, 0.0), (0.205, 0.0)],
            1.0,
        );
        check_voicing::<SprottLinzF<f32>>(
            4.5,
            [(2.2, 1.7), (1.92, 3.3), (1.8, -4.4), (0.83, 4.1)],
            1.0,
        );
    }

    fn drive_hard<F: Voicing>() {
        let mut conditioner = SignalConditioner::<F>::new();
        let controls = AttractorControls {
            speed: Control::with_modulation(1.0, 1e6),
            shape: Control::with_modulation(0.0, -1e6),
            amplitude: Control::new(10.0),
        };
        // low sample rate for a coarse, unstable step
        for _ in 0..5_000 {
            let frame = conditioner
                .process(10.0, &controls, ObservedOutputs::ALL)
                .unwrap();
            assert!(conditioner.attractor().state().is_finite());
            assert_frame_finite(&frame);
        }
    }

    #[test]
    fn overflowing_channels_read_as_zero() {
        let state = AttractorState::new(f32::MAX, 1.0, 0.0);
        let frame = <SprottLinzF<f32> as Voicing>::MAPPING.map(&state, 10.0);
        assert_eq!(frame.x, 0.0);
        assert!(frame.y.is_finite() && frame.y != 0.0);
    }

    #[test]
    fn trajectories_stay_finite_for_every_family() {
        drive_hard::<Halvorsen<f32>>();
        drive_hard::<Lorenz<f32>>();
        drive_hard::<Thomas<f32>>();
        drive_hard::<Sakarya<f32>>();
        drive_hard::<Dadras<f32>>();
        drive_hard::<SprottLinzF<f32>>();
    }
}
