use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

/// Thomas' cyclically symmetric attractor; `b` is the dissipation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thomas<T> {
    pub b: T,
}

impl<T> Thomas<T> {
    pub const DEFAULT_B: f64 = 0.188;
}

impl<T: Scalar> Default for Thomas<T> {
    fn default() -> Self {
        Self {
            b: lit(Self::DEFAULT_B),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Thomas<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        out[0] = -self.b * x + y.sin();
        out[1] = -self.b * y + z.sin();
        out[2] = -self.b * z + x.sin();
    }
}

impl<T: Scalar> Family<T> for Thomas<T> {
    const NAME: &'static str = "thomas";
    const INITIAL_STATE: [f64; 3] = [0.1, 0.0, 0.0];
    // under 0.10 trajectories increasingly leave the usable range, over 0.208 they settle
    const SHAPE_RANGE: (f64, f64) = (0.08, 0.23);

    fn shape(&self) -> T {
        self.b
    }

    fn set_shape(&mut self, value: T) {
        self.b = value;
    }
}

pub type ThomasAttractor<T> = Attractor<T, Thomas<T>>;
