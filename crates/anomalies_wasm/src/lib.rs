//! WASM bridge for `anomalies_core`.
//!
//! Exposes the attractor sources, the blended bank, the attenuverter and the
//! scope to JavaScript. Errors cross the boundary as string `JsValue`s;
//! structured values go through `serde-wasm-bindgen`.

mod attractor;
mod scope;

pub use attractor::{WasmAttenuverter, WasmAttractor, WasmLanguor};
pub use scope::WasmScope;
