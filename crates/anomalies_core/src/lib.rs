pub mod attenuverter;
pub mod attractors;
pub mod conditioner;
pub mod controls;
pub mod error;
pub mod languor;
pub mod scope;
pub mod settings;
pub mod solvers;
/// The `anomalies_core` crate turns strange attractors into bounded, bipolar
/// control and audio signals, and captures signals on a dual-channel scope.
/// Nothing here depends on a host; the `anomalies_wasm` crate bridges it to
/// JavaScript.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (vector fields), `Steppable` (solvers), `Family` (named attractor families).
/// - **Attractors**: Halvorsen, Lorenz, Thomas, Sakarya, Dadras and Sprott-Linz F, integrated by explicit Euler with a divergence guard.
/// - **Conditioner**: per-sample control clamping and per-family output mapping (`SignalConditioner`), the blended `Languor` bank and the `DualAttenuverter`.
/// - **Scope**: decimated 512-slot capture with Lissajous and edge-triggered modes, plus persisted `ScopeSettings`.
pub mod traits;
