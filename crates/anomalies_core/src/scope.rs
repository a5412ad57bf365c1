//! Dual-channel scope capture.
//!
//! The scope writes decimated (X, Y) pairs into a fixed 512-slot buffer. In
//! Lissajous mode it overwrites circularly forever. In triggered mode a full
//! buffer waits for a rising edge on the X input, or for a 0.1 s hold timeout,
//! before a new capture epoch starts.
//!
//! The write path is allocation free. Readers get the buffer through shared
//! references; a snapshot taken between two host blocks may straddle two
//! capture epochs, which only costs one imperfect frame on screen.

use crate::controls::Control;
use serde::{Deserialize, Serialize};

pub const BUFFER_SIZE: usize = 512;
/// Longest time a full buffer waits for a trigger, in seconds.
pub const HOLD_TIME: f32 = 0.1;

pub const TIME_RANGE: (f32, f32) = (4.0, 16.0);
pub const TIME_DEFAULT: f32 = 10.0;

/// Schmitt thresholds in volts.
pub const TRIGGER_LOW: f32 = 0.0;
pub const TRIGGER_HIGH: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeSample {
    pub x: f32,
    pub y: f32,
}

impl ScopeSample {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Free-running X/Y phase plot.
    Lissajous,
    /// Time-domain capture restarted by an edge on X.
    Triggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePhase {
    Capturing,
    WaitingForTrigger,
}

/// Samples between two buffer writes for a time base of `2^-time` seconds.
pub fn frame_count(time: f32, sample_rate: f32) -> u32 {
    let frames = (2.0_f32.powf(-time) * sample_rate).ceil();
    // float-to-int casts saturate and send NaN to 0
    (frames as u32).max(1)
}

#[derive(Debug, Clone)]
pub struct ScopeBuffer {
    samples: [ScopeSample; BUFFER_SIZE],
    cursor: usize,
    frame_index: u32,
}

impl ScopeBuffer {
    pub fn new() -> Self {
        Self {
            samples: [ScopeSample::default(); BUFFER_SIZE],
            cursor: 0,
            frame_index: 0,
        }
    }

    /// Next slot to be written, in `0..=BUFFER_SIZE`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_full(&self) -> bool {
        self.cursor >= BUFFER_SIZE
    }

    pub fn samples(&self) -> &[ScopeSample; BUFFER_SIZE] {
        &self.samples
    }

    /// Counts one host sample and writes `sample` once `frame_count` samples
    /// have gone by. Returns whether a slot was filled. A full buffer ignores
    /// everything until [`ScopeBuffer::restart`].
    pub fn push(&mut self, sample: ScopeSample, frame_count: u32) -> bool {
        if self.is_full() {
            return false;
        }
        self.frame_index += 1;
        if self.frame_index < frame_count {
            return false;
        }
        self.frame_index = 0;
        self.samples[self.cursor] = sample;
        self.cursor += 1;
        true
    }

    /// Starts a new capture epoch. Old samples stay until overwritten.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.frame_index = 0;
    }

    /// Buffer contents in display order: index order for time-domain plots,
    /// oldest-first from the cursor for Lissajous plots.
    pub fn ordered(&self, mode: CaptureMode) -> impl Iterator<Item = ScopeSample> + '_ {
        let start = match mode {
            CaptureMode::Lissajous => self.cursor % BUFFER_SIZE,
            CaptureMode::Triggered => 0,
        };
        (0..BUFFER_SIZE).map(move |i| self.samples[(start + i) % BUFFER_SIZE])
    }
}

impl Default for ScopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rising-edge detector with hysteresis.
///
/// Fires once when the input reaches [`TRIGGER_HIGH`] and re-arms only after
/// it falls to [`TRIGGER_LOW`]. Starts (and resets) latched, so a signal that
/// is already high cannot fire until it has gone low first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchmittTrigger {
    latched: bool,
}

impl SchmittTrigger {
    pub fn new() -> Self {
        Self { latched: true }
    }

    pub fn reset(&mut self) {
        self.latched = true;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn process(&mut self, input: f32) -> bool {
        if self.latched {
            if input <= TRIGGER_LOW {
                self.latched = false;
            }
            false
        } else if input >= TRIGGER_HIGH {
            self.latched = true;
            true
        } else {
            false
        }
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides when a full buffer may start over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerEngine {
    detector: SchmittTrigger,
    elapsed: u32,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a wait epoch. The sample that fills the buffer is not counted
    /// as waiting; the first [`TriggerEngine::poll`] is the next sample.
    pub fn arm(&mut self) {
        self.detector.reset();
        self.elapsed = 0;
    }

    /// Samples spent waiting in the current epoch.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn detector(&self) -> &SchmittTrigger {
        &self.detector
    }

    /// Feeds one sample of the watched signal. True when capture should
    /// restart: either an edge fired or the hold timeout ran out.
    pub fn poll(&mut self, watched: f32, sample_rate: f32) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        let fired = self.detector.process(watched);
        fired || self.elapsed as f32 >= sample_rate * HOLD_TIME
    }
}

/// Per-sample scope inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeInput {
    pub x: f32,
    pub y: f32,
    /// Time base exponent; knob plus modulation.
    pub time: Control,
}

impl ScopeInput {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            time: Control::new(TIME_DEFAULT),
        }
    }

    pub fn with_time(self, time: Control) -> Self {
        Self { time, ..self }
    }

    /// Knob and modulation summed; the knob is clamped to its travel but the
    /// modulation may push past it.
    pub fn time_exponent(&self) -> f32 {
        self.time.value.clamp(TIME_RANGE.0, TIME_RANGE.1) + self.time.modulation
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    buffer: ScopeBuffer,
    trigger: TriggerEngine,
    mode: CaptureMode,
    phase: ScopePhase,
}

impl Scope {
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            buffer: ScopeBuffer::new(),
            trigger: TriggerEngine::new(),
            mode,
            phase: ScopePhase::Capturing,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Switching into Lissajous mode while waiting restarts capture at once.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        if mode == self.mode {
            return;
        }
        log::debug!("scope mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        if mode == CaptureMode::Lissajous && self.phase == ScopePhase::WaitingForTrigger {
            self.restart();
        }
    }

    pub fn phase(&self) -> ScopePhase {
        self.phase
    }

    pub fn buffer(&self) -> &ScopeBuffer {
        &self.buffer
    }

    pub fn trigger(&self) -> &TriggerEngine {
        &self.trigger
    }

    pub fn process(&mut self, input: &ScopeInput, sample_rate: f32) {
        match self.phase {
            ScopePhase::Capturing => {
                let frames = frame_count(input.time_exponent(), sample_rate);
                let wrote = self
                    .buffer
                    .push(ScopeSample::new(input.x, input.y), frames);
                if wrote && self.buffer.is_full() {
                    match self.mode {
                        CaptureMode::Lissajous => self.buffer.restart(),
                        CaptureMode::Triggered => {
                            self.phase = ScopePhase::WaitingForTrigger;
                            self.trigger.arm();
                        }
                    }
                }
            }
            ScopePhase::WaitingForTrigger => {
                if self.trigger.poll(input.x, sample_rate) {
                    self.restart();
                }
            }
        }
    }

    /// Buffer contents in the order the current mode displays them.
    pub fn display(&self) -> impl Iterator<Item = ScopeSample> + '_ {
        self.buffer.ordered(self.mode)
    }

    pub fn stats(&self) -> ScopeStats {
        ScopeStats::calculate(self.buffer.samples())
    }

    fn restart(&mut self) {
        self.buffer.restart();
        self.phase = ScopePhase::Capturing;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(CaptureMode::Lissajous)
    }
}

/// Extremes of one channel over the whole buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub min: f32,
    pub max: f32,
}

impl ChannelStats {
    /// Readings beyond this magnitude are shown as unavailable.
    pub const DISPLAY_LIMIT: f32 = 100.0;

    pub fn calculate(values: impl IntoIterator<Item = f32>) -> Self {
        values.into_iter().fold(
            Self {
                min: f32::INFINITY,
                max: f32::NEG_INFINITY,
            },
            |acc, v| Self {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        )
    }

    pub fn displayable_min(&self) -> Option<f32> {
        Self::displayable(self.min)
    }

    pub fn displayable_max(&self) -> Option<f32> {
        Self::displayable(self.max)
    }

    fn displayable(value: f32) -> Option<f32> {
        (value.abs() <= Self::DISPLAY_LIMIT).then_some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeStats {
    pub x: ChannelStats,
    pub y: ChannelStats,
}

impl ScopeStats {
    pub fn calculate(samples: &[ScopeSample]) -> Self {
        Self {
            x: ChannelStats::calculate(samples.iter().map(|s| s.x)),
            y: ChannelStats::calculate(samples.iter().map(|s| s.y)),
        }
    }
}

/// Position and gain of one display axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTransform {
    /// Volts added before scaling, in [-10, 10].
    pub offset: f32,
    /// Gain exponent in [-2, 8], snapped to whole steps.
    pub scale: f32,
}

impl Default for AxisTransform {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 0.0,
        }
    }
}

impl AxisTransform {
    pub const OFFSET_RANGE: (f32, f32) = (-10.0, 10.0);
    pub const SCALE_RANGE: (f32, f32) = (-2.0, 8.0);

    pub fn gain(&self) -> f32 {
        2.0_f32.powf(self.scale.clamp(Self::SCALE_RANGE.0, Self::SCALE_RANGE.1).round())
    }

    /// Maps a voltage to display units, where ±1 spans the screen.
    pub fn apply(&self, value: f32) -> f32 {
        let offset = self.offset.clamp(Self::OFFSET_RANGE.0, Self::OFFSET_RANGE.1);
        (value + offset) * self.gain() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44_100.0;

    /// A time base that writes a slot on every host sample at `SR`.
    fn every_sample() -> ScopeInput {
        ScopeInput::new(0.0, 0.0).with_time(Control::new(16.0))
    }

    #[test]
    fn frame_count_follows_time_base() {
        assert_eq!(frame_count(10.0, 44_100.0), 44);
        assert_eq!(frame_count(4.0, 44_100.0), 2_757);
        assert_eq!(frame_count(16.0, 44_100.0), 1);
        assert_eq!(frame_count(40.0, 44_100.0), 1);
        assert_eq!(frame_count(f32::NAN, 44_100.0), 1);
    }

    #[test]
    fn one_slot_per_frame_count_samples() {
        let mut buffer = ScopeBuffer::new();
        let mut writes = 0;
        for i in 0..300 {
            if buffer.push(ScopeSample::new(i as f32, 0.0), 3) {
                writes += 1;
            }
        }
        assert_eq!(writes, 100);
        assert_eq!(buffer.cursor(), 100);
        // the third, sixth, ... samples land in the buffer
        assert_eq!(buffer.samples()[0].x, 2.0);
        assert_eq!(buffer.samples()[1].x, 5.0);
    }

    #[test]
    fn full_buffer_ignores_pushes() {
        let mut buffer = ScopeBuffer::new();
        for _ in 0..BUFFER_SIZE {
            assert!(buffer.push(ScopeSample::default(), 1));
        }
        assert!(buffer.is_full());
        assert!(!buffer.push(ScopeSample::new(9.0, 9.0), 1));
        assert_eq!(buffer.cursor(), BUFFER_SIZE);
    }

    #[test]
    fn schmitt_needs_a_low_before_it_fires() {
        let mut trigger = SchmittTrigger::new();
        assert!(!trigger.process(5.0));
        assert!(!trigger.process(0.5));
        assert!(!trigger.process(0.0));
        assert!(!trigger.process(0.9));
        assert!(trigger.process(1.0));
        assert!(!trigger.process(5.0));
        assert!(trigger.is_latched());
    }

    #[test]
    fn lissajous_wraps_without_waiting() {
        let mut scope = Scope::new(CaptureMode::Lissajous);
        let input = every_sample();
        for i in 1..=3 * BUFFER_SIZE {
            scope.process(&input, SR);
            assert_eq!(scope.phase(), ScopePhase::Capturing);
            assert!(scope.buffer().cursor() < BUFFER_SIZE);
            assert_eq!(scope.buffer().cursor(), i % BUFFER_SIZE);
        }
    }

    #[test]
    fn triggered_mode_waits_once_full() {
        let mut scope = Scope::new(CaptureMode::Triggered);
        for i in 0..BUFFER_SIZE {
            let input = every_sample();
            scope.process(&ScopeInput { x: i as f32, ..input }, SR);
            if i + 1 < BUFFER_SIZE {
                assert_eq!(scope.phase(), ScopePhase::Capturing);
            }
        }
        assert_eq!(scope.buffer().cursor(), BUFFER_SIZE);
        assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
        assert_eq!(scope.buffer().samples()[511].x, 511.0);
        assert!(scope.trigger().detector().is_latched());
    }

    fn fill(scope: &mut Scope) {
        for _ in 0..BUFFER_SIZE {
            scope.process(&every_sample(), SR);
        }
        assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
    }

    #[test]
    fn rising_edge_restarts_capture_on_that_sample() {
        let mut scope = Scope::new(CaptureMode::Triggered);
        fill(&mut scope);

        let k = 37;
        for _ in 1..k {
            scope.process(&every_sample(), SR);
            assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
        }
        scope.process(&ScopeInput { x: 5.0, ..every_sample() }, SR);
        assert_eq!(scope.phase(), ScopePhase::Capturing);
        assert_eq!(scope.buffer().cursor(), 0);
    }

    #[test]
    fn high_signal_at_fill_does_not_retrigger_instantly() {
        let mut scope = Scope::new(CaptureMode::Triggered);
        let high = ScopeInput { x: 5.0, ..every_sample() };
        for _ in 0..BUFFER_SIZE {
            scope.process(&high, SR);
        }
        assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
        for _ in 0..10 {
            scope.process(&high, SR);
            assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
        }
    }

    #[test]
    fn hold_timeout_restarts_without_an_edge() {
        let mut scope = Scope::new(CaptureMode::Triggered);
        fill(&mut scope);
        // the filling sample does not count towards the hold time
        assert_eq!(scope.trigger().elapsed(), 0);

        let timeout = (SR * HOLD_TIME).ceil() as u32;
        let high = ScopeInput { x: 5.0, ..every_sample() };
        for waited in 1..timeout {
            scope.process(&high, SR);
            assert_eq!(scope.phase(), ScopePhase::WaitingForTrigger);
            assert_eq!(scope.trigger().elapsed(), waited);
        }
        scope.process(&high, SR);
        assert_eq!(scope.phase(), ScopePhase::Capturing);
        assert_eq!(scope.buffer().cursor(), 0);
    }

    #[test]
    fn switching_to_lissajous_releases_a_waiting_scope() {
        let mut scope = Scope::new(CaptureMode::Triggered);
        fill(&mut scope);
        scope.set_mode(CaptureMode::Lissajous);
        assert_eq!(scope.phase(), ScopePhase::Capturing);
        assert_eq!(scope.buffer().cursor(), 0);
    }

    #[test]
    fn display_order_depends_on_mode() {
        let mut scope = Scope::new(CaptureMode::Lissajous);
        for i in 0..BUFFER_SIZE + 10 {
            scope.process(&ScopeInput { x: i as f32, ..every_sample() }, SR);
        }
        // cursor sits at 10; oldest sample first
        let lissajous: Vec<f32> = scope.display().map(|s| s.x).collect();
        assert_eq!(lissajous[0], 10.0);
        assert_eq!(lissajous[BUFFER_SIZE - 1], (BUFFER_SIZE + 9) as f32);

        scope.set_mode(CaptureMode::Triggered);
        let time_domain: Vec<f32> = scope.display().map(|s| s.x).collect();
        assert_eq!(time_domain[0], BUFFER_SIZE as f32);
        assert_eq!(time_domain[10], 10.0);
    }

    #[test]
    fn stats_track_extremes_and_hide_wild_values() {
        let mut samples = [ScopeSample::default(); 4];
        samples[1] = ScopeSample::new(-3.5, 250.0);
        samples[2] = ScopeSample::new(4.25, -1.0);
        let stats = ScopeStats::calculate(&samples);

        assert_eq!(stats.x.min, -3.5);
        assert_eq!(stats.x.max, 4.25);
        assert_eq!(stats.y.displayable_max(), None);
        assert_eq!(stats.y.displayable_min(), Some(-1.0));
    }

    #[test]
    fn axis_transform_snaps_gain() {
        let axis = AxisTransform {
            offset: 1.0,
            scale: 1.4,
        };
        assert_eq!(axis.gain(), 2.0);
        assert!((axis.apply(4.0) - 1.0).abs() < 1e-6);
        assert_eq!(AxisTransform::default().apply(10.0), 1.0);
    }
}
