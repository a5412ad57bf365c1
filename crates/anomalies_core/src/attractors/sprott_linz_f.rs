use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

/// Sprott-Linz "F" system, one of the simplest quadratic chaotic flows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprottLinzF<T> {
    pub a: T,
}

impl<T> SprottLinzF<T> {
    pub const DEFAULT_A: f64 = 0.5;
}

impl<T: Scalar> Default for SprottLinzF<T> {
    fn default() -> Self {
        Self {
            a: lit(Self::DEFAULT_A),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for SprottLinzF<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        out[0] = y + z;
        out[1] = -x + self.a * y;
        out[2] = x * x - z;
    }
}

impl<T: Scalar> Family<T> for SprottLinzF<T> {
    const NAME: &'static str = "slf";
    const INITIAL_STATE: [f64; 3] = [0.1, 0.0, 0.0];
    const SHAPE_RANGE: (f64, f64) = (0.43, 0.51);

    fn shape(&self) -> T {
        self.a
    }

    fn set_shape(&mut self, value: T) {
        self.a = value;
    }
}

pub type SprottLinzFAttractor<T> = Attractor<T, SprottLinzF<T>>;
