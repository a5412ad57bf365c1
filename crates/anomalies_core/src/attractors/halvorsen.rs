use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

/// Halvorsen's cyclically symmetric attractor.
///
/// Below `a ≈ 1.23` trajectories escape to infinity; above `a ≈ 1.63` the
/// motion is no longer chaotic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Halvorsen<T> {
    pub a: T,
}

impl<T> Halvorsen<T> {
    pub const DEFAULT_A: f64 = 1.43;
}

impl<T: Scalar> Default for Halvorsen<T> {
    fn default() -> Self {
        Self {
            a: lit(Self::DEFAULT_A),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Halvorsen<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        let four = lit::<T>(4.0);
        out[0] = -self.a * x - four * y - four * z - y * y;
        out[1] = -self.a * y - four * z - four * x - z * z;
        out[2] = -self.a * z - four * x - four * y - x * x;
    }
}

impl<T: Scalar> Family<T> for Halvorsen<T> {
    const NAME: &'static str = "halvorsen";
    const INITIAL_STATE: [f64; 3] = [1.0, 0.0, 0.0];
    const SHAPE_RANGE: (f64, f64) = (1.23, 1.63);

    fn shape(&self) -> T {
        self.a
    }

    fn set_shape(&mut self, value: T) {
        self.a = value;
    }
}

pub type HalvorsenAttractor<T> = Attractor<T, Halvorsen<T>>;
