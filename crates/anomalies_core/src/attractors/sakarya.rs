use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sakarya<T> {
    pub a: T,
    pub b: T,
}

impl<T> Sakarya<T> {
    pub const DEFAULT_A: f64 = 0.398;
    pub const DEFAULT_B: f64 = 0.3;
}

impl<T: Scalar> Default for Sakarya<T> {
    fn default() -> Self {
        Self {
            a: lit(Self::DEFAULT_A),
            b: lit(Self::DEFAULT_B),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Sakarya<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        out[0] = -x + y + y * z;
        out[1] = -x - y + self.a * x * z;
        out[2] = z - self.b * x * y;
    }
}

impl<T: Scalar> Family<T> for Sakarya<T> {
    const NAME: &'static str = "sakarya";
    const INITIAL_STATE: [f64; 3] = [1.0, -1.0, 1.0];
    const SHAPE_RANGE: (f64, f64) = (0.125, 0.5);

    fn shape(&self) -> T {
        self.b
    }

    fn set_shape(&mut self, value: T) {
        self.b = value;
    }
}

pub type SakaryaAttractor<T> = Attractor<T, Sakarya<T>>;
