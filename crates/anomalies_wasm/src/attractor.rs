//! Attractor, blended bank and attenuverter bindings.
//!
//! Every `process` call renders one block. Controls are held between blocks
//! and set through the setters; outputs are planar `Float32Array`s that the
//! caller owns and that are only written where the matching output is
//! observed.

use anomalies_core::attenuverter::{AttenuverterControls, DualAttenuverter, Lane, MAX_CHANNELS};
use anomalies_core::attractors::{
    AttractorState, Dadras, FamilyKind, Halvorsen, Lorenz, Sakarya, SprottLinzF, Thomas,
};
use anomalies_core::conditioner::{
    AttractorControls, ChannelFrame, ObservedOutputs, SignalConditioner,
};
use anomalies_core::controls::{sample_rate, Control};
use anomalies_core::languor::{Languor, LanguorControls, LanguorObserved};
use anyhow::Context;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

pub(crate) enum ConditionerType {
    Halvorsen(SignalConditioner<Halvorsen<f32>>),
    Lorenz(SignalConditioner<Lorenz<f32>>),
    Thomas(SignalConditioner<Thomas<f32>>),
    Sakarya(SignalConditioner<Sakarya<f32>>),
    Dadras(SignalConditioner<Dadras<f32>>),
    SprottLinzF(SignalConditioner<SprottLinzF<f32>>),
}

impl ConditionerType {
    pub(crate) fn for_family(kind: FamilyKind) -> Self {
        match kind {
            FamilyKind::Halvorsen => ConditionerType::Halvorsen(SignalConditioner::new()),
            FamilyKind::Lorenz => ConditionerType::Lorenz(SignalConditioner::new()),
            FamilyKind::Thomas => ConditionerType::Thomas(SignalConditioner::new()),
            FamilyKind::Sakarya => ConditionerType::Sakarya(SignalConditioner::new()),
            FamilyKind::Dadras => ConditionerType::Dadras(SignalConditioner::new()),
            FamilyKind::SprottLinzF => ConditionerType::SprottLinzF(SignalConditioner::new()),
        }
    }

    pub(crate) fn default_controls(kind: FamilyKind) -> AttractorControls {
        match kind {
            FamilyKind::Halvorsen => AttractorControls::for_family::<Halvorsen<f32>>(),
            FamilyKind::Lorenz => AttractorControls::for_family::<Lorenz<f32>>(),
            FamilyKind::Thomas => AttractorControls::for_family::<Thomas<f32>>(),
            FamilyKind::Sakarya => AttractorControls::for_family::<Sakarya<f32>>(),
            FamilyKind::Dadras => AttractorControls::for_family::<Dadras<f32>>(),
            FamilyKind::SprottLinzF => AttractorControls::for_family::<SprottLinzF<f32>>(),
        }
    }

    fn process(
        &mut self,
        sample_rate: f32,
        controls: &AttractorControls,
        observed: ObservedOutputs,
    ) -> Option<ChannelFrame> {
        match self {
            ConditionerType::Halvorsen(c) => c.process(sample_rate, controls, observed),
            ConditionerType::Lorenz(c) => c.process(sample_rate, controls, observed),
            ConditionerType::Thomas(c) => c.process(sample_rate, controls, observed),
            ConditionerType::Sakarya(c) => c.process(sample_rate, controls, observed),
            ConditionerType::Dadras(c) => c.process(sample_rate, controls, observed),
            ConditionerType::SprottLinzF(c) => c.process(sample_rate, controls, observed),
        }
    }

    fn state(&self) -> AttractorState<f32> {
        match self {
            ConditionerType::Halvorsen(c) => c.attractor().state(),
            ConditionerType::Lorenz(c) => c.attractor().state(),
            ConditionerType::Thomas(c) => c.attractor().state(),
            ConditionerType::Sakarya(c) => c.attractor().state(),
            ConditionerType::Dadras(c) => c.attractor().state(),
            ConditionerType::SprottLinzF(c) => c.attractor().state(),
        }
    }

    fn set_state(&mut self, state: AttractorState<f32>) {
        match self {
            ConditionerType::Halvorsen(c) => c.attractor_mut().set_state(state),
            ConditionerType::Lorenz(c) => c.attractor_mut().set_state(state),
            ConditionerType::Thomas(c) => c.attractor_mut().set_state(state),
            ConditionerType::Sakarya(c) => c.attractor_mut().set_state(state),
            ConditionerType::Dadras(c) => c.attractor_mut().set_state(state),
            ConditionerType::SprottLinzF(c) => c.attractor_mut().set_state(state),
        }
    }

    fn reset(&mut self) {
        match self {
            ConditionerType::Halvorsen(c) => c.attractor_mut().reset(),
            ConditionerType::Lorenz(c) => c.attractor_mut().reset(),
            ConditionerType::Thomas(c) => c.attractor_mut().reset(),
            ConditionerType::Sakarya(c) => c.attractor_mut().reset(),
            ConditionerType::Dadras(c) => c.attractor_mut().reset(),
            ConditionerType::SprottLinzF(c) => c.attractor_mut().reset(),
        }
    }

    /// Renders up to `min(len)` frames into the four planar outputs.
    ///
    /// Returns the number of frames rendered; zero when nothing is observed,
    /// in which case the trajectory does not move.
    pub(crate) fn render(
        &mut self,
        sample_rate: f32,
        controls: &AttractorControls,
        observed: ObservedOutputs,
        outputs: [&mut [f32]; 4],
    ) -> usize {
        let frames = outputs.iter().map(|out| out.len()).min().unwrap_or(0);
        let [x, y, z, t] = outputs;
        for i in 0..frames {
            let Some(frame) = self.process(sample_rate, controls, observed) else {
                return 0;
            };
            write_frame(&frame, observed, i, [&mut *x, &mut *y, &mut *z, &mut *t]);
        }
        frames
    }
}

fn write_frame(
    frame: &ChannelFrame,
    observed: ObservedOutputs,
    index: usize,
    outputs: [&mut [f32]; 4],
) {
    let values = frame.to_array();
    for ((out, value), on) in outputs.into_iter().zip(values).zip(observed.to_array()) {
        if on {
            out[index] = value;
        }
    }
}

/// Family and sample rate for a new attractor source.
pub(crate) fn resolve_source(
    family: &str,
    sample_rate_hz: f32,
) -> anyhow::Result<(FamilyKind, f32)> {
    let kind: FamilyKind = family.parse().context("Failed to select attractor family.")?;
    let rate = sample_rate(sample_rate_hz).context("Failed to configure sample rate.")?;
    Ok((kind, rate))
}

#[wasm_bindgen]
pub struct WasmAttractor {
    kind: FamilyKind,
    conditioner: ConditionerType,
    controls: AttractorControls,
    sample_rate: f32,
}

#[wasm_bindgen]
impl WasmAttractor {
    #[wasm_bindgen(constructor)]
    pub fn new(family: &str, sample_rate_hz: f32) -> Result<WasmAttractor, JsValue> {
        console_error_panic_hook::set_once();

        let (kind, rate) = resolve_source(family, sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid attractor: {:#}", e)))?;
        log::info!("{} attractor at {} Hz", kind, rate);

        Ok(WasmAttractor {
            kind,
            conditioner: ConditionerType::for_family(kind),
            controls: ConditionerType::default_controls(kind),
            sample_rate: rate,
        })
    }

    pub fn family(&self) -> String {
        self.kind.to_string()
    }

    pub fn set_sample_rate(&mut self, sample_rate_hz: f32) -> Result<(), JsValue> {
        self.sample_rate = sample_rate(sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid sample rate: {}", e)))?;
        Ok(())
    }

    pub fn set_speed(&mut self, value: f32, modulation: f32) {
        self.controls.speed = Control::with_modulation(value, modulation);
    }

    pub fn set_shape(&mut self, value: f32, modulation: f32) {
        self.controls.shape = Control::with_modulation(value, modulation);
    }

    pub fn set_amplitude(&mut self, value: f32, modulation: f32) {
        self.controls.amplitude = Control::with_modulation(value, modulation);
    }

    /// Replaces all three controls from a `{ speed, shape, amplitude }` object.
    pub fn set_controls(&mut self, controls: JsValue) -> Result<(), JsValue> {
        self.controls = from_value(controls)
            .map_err(|e| JsValue::from_str(&format!("Invalid controls: {}", e)))?;
        Ok(())
    }

    pub fn get_controls(&self) -> Result<JsValue, JsValue> {
        to_value(&self.controls)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Renders one block. `observed_mask` bits 0..=3 select x, y, z, t.
    pub fn process(
        &mut self,
        observed_mask: u32,
        x: &mut [f32],
        y: &mut [f32],
        z: &mut [f32],
        t: &mut [f32],
    ) -> usize {
        self.conditioner.render(
            self.sample_rate,
            &self.controls,
            ObservedOutputs::from_mask(observed_mask),
            [x, y, z, t],
        )
    }

    pub fn get_state(&self) -> Vec<f32> {
        let state: [f32; 3] = self.conditioner.state().into();
        state.to_vec()
    }

    pub fn set_state(&mut self, x: f32, y: f32, z: f32) {
        self.conditioner.set_state(AttractorState::new(x, y, z));
    }

    pub fn reset(&mut self) {
        self.conditioner.reset();
    }
}

/// Number of planar outputs of the blended bank.
const LANGUOR_OUTPUTS: usize = 16;

pub(crate) fn render_languor(
    languor: &mut Languor,
    sample_rate: f32,
    controls: &LanguorControls,
    observed: &LanguorObserved,
    frames: usize,
    outputs: &mut [f32],
) -> usize {
    let frames = frames.min(outputs.len() / LANGUOR_OUTPUTS);
    let flags = [observed.halvorsen, observed.dadras, observed.lorenz, observed.blend];
    for i in 0..frames {
        let Some(frame) = languor.process(sample_rate, controls, observed) else {
            return 0;
        };
        let banks = [frame.halvorsen, frame.dadras, frame.lorenz, frame.blend];
        for (bank, (values, on)) in banks.into_iter().zip(flags).enumerate() {
            let channels = values.to_array().into_iter().zip(on.to_array());
            for (channel, (value, enabled)) in channels.enumerate() {
                if enabled {
                    outputs[(bank * 4 + channel) * frames + i] = value;
                }
            }
        }
    }
    frames
}

#[wasm_bindgen]
pub struct WasmLanguor {
    languor: Languor,
    controls: LanguorControls,
    sample_rate: f32,
}

#[wasm_bindgen]
impl WasmLanguor {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate_hz: f32) -> Result<WasmLanguor, JsValue> {
        console_error_panic_hook::set_once();

        let rate = sample_rate(sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid attractor bank: {}", e)))?;
        log::info!("attractor bank at {} Hz", rate);

        Ok(WasmLanguor {
            languor: Languor::new(),
            controls: LanguorControls::default(),
            sample_rate: rate,
        })
    }

    pub fn set_sample_rate(&mut self, sample_rate_hz: f32) -> Result<(), JsValue> {
        self.sample_rate = sample_rate(sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid sample rate: {}", e)))?;
        Ok(())
    }

    pub fn set_speed(&mut self, value: f32, modulation: f32) {
        self.controls.speed = Control::with_modulation(value, modulation);
    }

    pub fn set_shape(&mut self, value: f32, modulation: f32) {
        self.controls.shape = Control::with_modulation(value, modulation);
    }

    pub fn set_amplitude(&mut self, value: f32, modulation: f32) {
        self.controls.amplitude = Control::with_modulation(value, modulation);
    }

    /// Renders `frames` frames into `outputs`, laid out as sixteen planar
    /// channels of `frames` samples each: x, y, z, t of Halvorsen, Dadras,
    /// Lorenz, then the blend. `observed_mask` uses the same order, one bit
    /// per channel.
    pub fn process(&mut self, observed_mask: u32, frames: usize, outputs: &mut [f32]) -> usize {
        render_languor(
            &mut self.languor,
            self.sample_rate,
            &self.controls,
            &LanguorObserved::from_mask(observed_mask),
            frames,
            outputs,
        )
    }
}

fn lane(index: u8) -> Option<Lane> {
    match index {
        0 => Some(Lane::A),
        1 => Some(Lane::B),
        _ => None,
    }
}

/// Runs an interleaved polyphonic block through one lane.
pub(crate) fn render_attenuverter(
    module: &DualAttenuverter,
    lane: Lane,
    channels: usize,
    observed: bool,
    input: &[f32],
    output: &mut [f32],
) -> usize {
    let channels = channels.min(MAX_CHANNELS);
    if channels == 0 || !observed {
        return 0;
    }
    let mut frames = 0;
    let blocks = input.chunks_exact(channels).zip(output.chunks_exact_mut(channels));
    for (frame_in, frame_out) in blocks {
        if module.process(lane, frame_in, observed, frame_out).is_some() {
            frames += 1;
        }
    }
    frames
}

#[wasm_bindgen]
pub struct WasmAttenuverter {
    module: DualAttenuverter,
}

#[wasm_bindgen]
impl WasmAttenuverter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmAttenuverter {
        console_error_panic_hook::set_once();
        WasmAttenuverter {
            module: DualAttenuverter::default(),
        }
    }

    /// Sets lane 0 (A) or 1 (B). Knobs are clamped to their travel.
    pub fn set_lane(&mut self, lane_index: u8, scale: f32, offset: f32) -> Result<(), JsValue> {
        let controls = AttenuverterControls::new(scale, offset);
        match lane(lane_index) {
            Some(Lane::A) => self.module.a = controls,
            Some(Lane::B) => self.module.b = controls,
            None => return Err(JsValue::from_str("Unknown attenuverter lane")),
        }
        Ok(())
    }

    /// Processes an interleaved block of `channels`-wide frames and returns
    /// the number of frames written.
    pub fn process(
        &self,
        lane_index: u8,
        channels: usize,
        observed: bool,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<usize, JsValue> {
        let lane = lane(lane_index).ok_or_else(|| JsValue::from_str("Unknown attenuverter lane"))?;
        Ok(render_attenuverter(
            &self.module,
            lane,
            channels,
            observed,
            input,
            output,
        ))
    }
}

impl Default for WasmAttenuverter {
    fn default() -> Self {
        Self::new()
    }
}
