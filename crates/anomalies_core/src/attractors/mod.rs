//! Strange attractor families.
//!
//! Each family lives in its own submodule and only describes its vector field
//! and shape parameters. [`Attractor`] adds what every family shares: the
//! trajectory, the `speed` scalar, explicit Euler integration and the
//! divergence guard.

mod dadras;
mod halvorsen;
mod lorenz;
mod sakarya;
mod sprott_linz_f;
mod thomas;

pub use dadras::{Dadras, DadrasAttractor};
pub use halvorsen::{Halvorsen, HalvorsenAttractor};
pub use lorenz::{Lorenz, LorenzAttractor};
pub use sakarya::{Sakarya, SakaryaAttractor};
pub use sprott_linz_f::{SprottLinzF, SprottLinzFAttractor};
pub use thomas::{Thomas, ThomasAttractor};

use crate::error::AnomaliesError;
use crate::solvers::Euler;
use crate::traits::{lit, Family, Scalar, Steppable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speed every family starts with.
pub const DEFAULT_SPEED: f64 = 0.5;

/// Position of a trajectory in phase space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorState<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Scalar> AttractorState<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// The derived fourth channel, x + y - z.
    pub fn t_factor(&self) -> T {
        self.x + self.y - self.z
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Resets every non-finite coordinate to zero, leaving the others alone.
    pub fn recover_non_finite(&mut self) {
        for value in [&mut self.x, &mut self.y, &mut self.z] {
            if !value.is_finite() {
                *value = T::zero();
            }
        }
    }

    fn from_f64(values: [f64; 3]) -> Self {
        Self::new(lit(values[0]), lit(values[1]), lit(values[2]))
    }
}

impl<T: Scalar> From<[T; 3]> for AttractorState<T> {
    fn from(values: [T; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl<T: Scalar> From<AttractorState<T>> for [T; 3] {
    fn from(state: AttractorState<T>) -> Self {
        [state.x, state.y, state.z]
    }
}

/// A family's vector field together with its trajectory.
///
/// `step(dt)` performs `state += f(state) * dt * speed²`. Squaring the speed
/// gives a finer control curve at low settings than a linear factor. After
/// every step each non-finite coordinate is reset to zero, so callers never
/// observe NaN or infinity regardless of the parameters in use.
#[derive(Debug, Clone)]
pub struct Attractor<T: Scalar, F: Family<T>> {
    pub params: F,
    pub speed: T,
    state: AttractorState<T>,
    stepper: Euler<T>,
}

impl<T: Scalar, F: Family<T>> Attractor<T, F> {
    pub fn new() -> Self {
        Self::with_params(F::default())
    }

    pub fn with_params(params: F) -> Self {
        Self {
            params,
            speed: lit(DEFAULT_SPEED),
            state: AttractorState::from_f64(F::INITIAL_STATE),
            stepper: Euler::new(),
        }
    }

    pub fn state(&self) -> AttractorState<T> {
        self.state
    }

    /// Moves the trajectory. Non-finite coordinates are zeroed on the way in.
    pub fn set_state(&mut self, state: AttractorState<T>) {
        self.state = state;
        self.state.recover_non_finite();
    }

    /// Returns the trajectory to the family's starting point.
    pub fn reset(&mut self) {
        self.state = AttractorState::from_f64(F::INITIAL_STATE);
    }

    pub fn shape(&self) -> T {
        self.params.shape()
    }

    pub fn set_shape(&mut self, value: T) {
        self.params.set_shape(value);
    }

    pub fn name(&self) -> &'static str {
        F::NAME
    }

    pub fn step(&mut self, dt: T) {
        let h = dt * self.speed * self.speed;
        let mut coords: [T; 3] = self.state.into();
        self.stepper.step(&self.params, &mut coords, h);
        self.state = coords.into();
        self.state.recover_non_finite();
    }
}

impl<T: Scalar, F: Family<T>> Default for Attractor<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime selector for hosts that pick a family by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    Halvorsen,
    Lorenz,
    Thomas,
    Sakarya,
    Dadras,
    SprottLinzF,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 6] = [
        FamilyKind::Halvorsen,
        FamilyKind::Lorenz,
        FamilyKind::Thomas,
        FamilyKind::Sakarya,
        FamilyKind::Dadras,
        FamilyKind::SprottLinzF,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::Halvorsen => <Halvorsen<f64> as Family<f64>>::NAME,
            FamilyKind::Lorenz => <Lorenz<f64> as Family<f64>>::NAME,
            FamilyKind::Thomas => <Thomas<f64> as Family<f64>>::NAME,
            FamilyKind::Sakarya => <Sakarya<f64> as Family<f64>>::NAME,
            FamilyKind::Dadras => <Dadras<f64> as Family<f64>>::NAME,
            FamilyKind::SprottLinzF => <SprottLinzF<f64> as Family<f64>>::NAME,
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FamilyKind {
    type Err = AnomaliesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        if normalized == "sprottlinzf" {
            return Ok(FamilyKind::SprottLinzF);
        }
        FamilyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| AnomaliesError::UnknownFamily(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_non_finite_only_touches_bad_axes() {
        let mut state = AttractorState::new(f64::NAN, 2.5, f64::NEG_INFINITY);
        state.recover_non_finite();
        assert_eq!(state, AttractorState::new(0.0, 2.5, 0.0));
    }

    #[test]
    fn t_factor_is_x_plus_y_minus_z() {
        let state = AttractorState::new(1.5_f32, -0.5, 2.0);
        assert!((state.t_factor() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn set_state_guards_incoming_values() {
        let mut attractor = LorenzAttractor::<f64>::new();
        attractor.set_state(AttractorState::new(f64::INFINITY, 3.0, 4.0));
        assert_eq!(attractor.state(), AttractorState::new(0.0, 3.0, 4.0));
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut attractor = SakaryaAttractor::<f64>::new();
        for _ in 0..100 {
            attractor.step(1.0 / 48_000.0);
        }
        attractor.reset();
        assert_eq!(attractor.state(), AttractorState::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn family_kind_parses_names_and_aliases() {
        assert_eq!("lorenz".parse::<FamilyKind>().unwrap(), FamilyKind::Lorenz);
        assert_eq!(" Thomas ".parse::<FamilyKind>().unwrap(), FamilyKind::Thomas);
        assert_eq!("slf".parse::<FamilyKind>().unwrap(), FamilyKind::SprottLinzF);
        assert_eq!(
            "sprott_linz_f".parse::<FamilyKind>().unwrap(),
            FamilyKind::SprottLinzF
        );
        for kind in FamilyKind::ALL {
            assert_eq!(kind.name().parse::<FamilyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn family_kind_rejects_unknown_names() {
        let err = "rossler".parse::<FamilyKind>().expect_err("should reject");
        assert!(err.to_string().contains("rossler"));
    }

    fn run_wild<F: Family<f64>>(shapes: &[f64]) {
        for &shape in shapes {
            let mut attractor = Attractor::<f64, F>::new();
            attractor.set_shape(shape);
            attractor.speed = 40.0;
            for _ in 0..2_000 {
                attractor.step(0.01);
                assert!(
                    attractor.state().is_finite(),
                    "{} produced a non-finite state at shape {}",
                    F::NAME,
                    shape
                );
            }
        }
    }

    #[test]
    fn every_family_stays_finite_under_extreme_parameters() {
        let shapes = [-50.0, -1.0, 0.0, 1e-3, 100.0, 1e6];
        run_wild::<Halvorsen<f64>>(&shapes);
        run_wild::<Lorenz<f64>>(&shapes);
        run_wild::<Thomas<f64>>(&shapes);
        run_wild::<Sakarya<f64>>(&shapes);
        run_wild::<Dadras<f64>>(&shapes);
        run_wild::<SprottLinzF<f64>>(&shapes);
    }

    #[test]
    fn identical_runs_produce_identical_trajectories() {
        let mut a = DadrasAttractor::<f32>::new();
        let mut b = DadrasAttractor::<f32>::new();
        for i in 0..10_000 {
            let dt = if i % 3 == 0 { 1.0 / 44_100.0 } else { 1.0 / 48_000.0 };
            a.step(dt);
            b.step(dt);
        }
        assert_eq!(a.state(), b.state());
    }
}
