//! Scope bindings: block capture, display snapshots, stats and settings.

use anomalies_core::controls::{sample_rate, Control};
use anomalies_core::scope::{
    AxisTransform, CaptureMode, Scope, ScopeInput, ScopePhase, ScopeStats, TIME_DEFAULT,
};
use anomalies_core::settings::ScopeSettings;
use js_sys::Float32Array;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

/// Min/max readings as the panel shows them; `None` when out of display range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsReadout {
    pub x_min: Option<f32>,
    pub x_max: Option<f32>,
    pub y_min: Option<f32>,
    pub y_max: Option<f32>,
}

impl From<ScopeStats> for StatsReadout {
    fn from(stats: ScopeStats) -> Self {
        Self {
            x_min: stats.x.displayable_min(),
            x_max: stats.x.displayable_max(),
            y_min: stats.y.displayable_min(),
            y_max: stats.y.displayable_max(),
        }
    }
}

pub(crate) fn capture_block(
    scope: &mut Scope,
    sample_rate: f32,
    time: Control,
    x: &[f32],
    y: &[f32],
) -> usize {
    let frames = x.len().min(y.len());
    for (&x, &y) in x.iter().zip(y).take(frames) {
        scope.process(&ScopeInput::new(x, y).with_time(time), sample_rate);
    }
    frames
}

/// Display-ordered points mapped through the two axis transforms, as
/// interleaved `x, y` pairs.
pub(crate) fn display_points(
    scope: &Scope,
    x_axis: AxisTransform,
    y_axis: AxisTransform,
) -> Vec<f32> {
    scope
        .display()
        .flat_map(|sample| [x_axis.apply(sample.x), y_axis.apply(sample.y)])
        .collect()
}

#[wasm_bindgen]
pub struct WasmScope {
    scope: Scope,
    settings: ScopeSettings,
    time: Control,
    sample_rate: f32,
}

#[wasm_bindgen]
impl WasmScope {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate_hz: f32) -> Result<WasmScope, JsValue> {
        console_error_panic_hook::set_once();

        let rate = sample_rate(sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid scope: {}", e)))?;
        let settings = ScopeSettings::default();
        log::info!("scope at {} Hz", rate);

        Ok(WasmScope {
            scope: Scope::new(settings.capture_mode()),
            settings,
            time: Control::new(TIME_DEFAULT),
            sample_rate: rate,
        })
    }

    pub fn set_sample_rate(&mut self, sample_rate_hz: f32) -> Result<(), JsValue> {
        self.sample_rate = sample_rate(sample_rate_hz)
            .map_err(|e| JsValue::from_str(&format!("Invalid sample rate: {}", e)))?;
        Ok(())
    }

    pub fn set_time(&mut self, value: f32, modulation: f32) {
        self.time = Control::with_modulation(value, modulation);
    }

    /// Feeds one block of X/Y input. Returns the number of frames consumed.
    pub fn process(&mut self, x: &[f32], y: &[f32]) -> usize {
        capture_block(&mut self.scope, self.sample_rate, self.time, x, y)
    }

    pub fn lissajous(&self) -> bool {
        self.scope.mode() == CaptureMode::Lissajous
    }

    pub fn set_lissajous(&mut self, enabled: bool) {
        self.settings.lissajous = enabled;
        self.settings.apply_to(&mut self.scope);
    }

    pub fn show_stats(&self) -> bool {
        self.settings.show_stats
    }

    pub fn set_show_stats(&mut self, enabled: bool) {
        self.settings.show_stats = enabled;
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.settings.width = Some(width);
        self.settings.height = Some(height);
    }

    pub fn cursor(&self) -> usize {
        self.scope.buffer().cursor()
    }

    pub fn waiting_for_trigger(&self) -> bool {
        self.scope.phase() == ScopePhase::WaitingForTrigger
    }

    /// X channel in display order.
    pub fn snapshot_x(&self) -> Float32Array {
        let values: Vec<f32> = self.scope.display().map(|s| s.x).collect();
        Float32Array::from(values.as_slice())
    }

    /// Y channel in display order.
    pub fn snapshot_y(&self) -> Float32Array {
        let values: Vec<f32> = self.scope.display().map(|s| s.y).collect();
        Float32Array::from(values.as_slice())
    }

    pub fn display_points(
        &self,
        x_offset: f32,
        x_scale: f32,
        y_offset: f32,
        y_scale: f32,
    ) -> Float32Array {
        let x_axis = AxisTransform {
            offset: x_offset,
            scale: x_scale,
        };
        let y_axis = AxisTransform {
            offset: y_offset,
            scale: y_scale,
        };
        Float32Array::from(display_points(&self.scope, x_axis, y_axis).as_slice())
    }

    /// `{ xMin, xMax, yMin, yMax }`, or `null` while statistics are hidden.
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        if !self.settings.show_stats {
            return Ok(JsValue::NULL);
        }
        to_value(&StatsReadout::from(self.scope.stats()))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_settings(&self) -> Result<JsValue, JsValue> {
        to_value(&self.settings)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        self.settings = from_value(settings)
            .map_err(|e| JsValue::from_str(&format!("Invalid scope settings: {}", e)))?;
        self.settings.apply_to(&mut self.scope);
        Ok(())
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.settings
            .to_json()
            .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    }

    /// Loads persisted settings; unreadable text resets them instead of failing.
    pub fn load_settings_json(&mut self, text: &str) {
        self.settings = ScopeSettings::from_json_or_default(text);
        self.settings.apply_to(&mut self.scope);
    }

    /// Panel reset: Lissajous on, statistics off.
    pub fn reset(&mut self) {
        let size = (self.settings.width, self.settings.height);
        self.settings = ScopeSettings {
            width: size.0,
            height: size.1,
            ..ScopeSettings::default()
        };
        self.settings.apply_to(&mut self.scope);
    }
}
