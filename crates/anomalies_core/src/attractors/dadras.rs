use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

/// Dadras-Momeni attractor. `q` is the exposed shape; below about 1.445 the
/// system is stable, above 9 the shape barely changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dadras<T> {
    pub p: T,
    pub q: T,
    pub r: T,
    pub s: T,
    pub e: T,
}

impl<T> Dadras<T> {
    pub const DEFAULT_P: f64 = 3.0;
    pub const DEFAULT_Q: f64 = 2.75;
    pub const DEFAULT_R: f64 = 1.7;
    pub const DEFAULT_S: f64 = 2.0;
    pub const DEFAULT_E: f64 = 9.0;
}

impl<T: Scalar> Default for Dadras<T> {
    fn default() -> Self {
        Self {
            p: lit(Self::DEFAULT_P),
            q: lit(Self::DEFAULT_Q),
            r: lit(Self::DEFAULT_R),
            s: lit(Self::DEFAULT_S),
            e: lit(Self::DEFAULT_E),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Dadras<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        out[0] = y - self.p * x + self.q * y * z;
        out[1] = self.r * y - x * z + z;
        out[2] = self.s * x * y - self.e * z;
    }
}

impl<T: Scalar> Family<T> for Dadras<T> {
    const NAME: &'static str = "dadras";
    const INITIAL_STATE: [f64; 3] = [1.0, 1.0, 0.0];
    const SHAPE_RANGE: (f64, f64) = (1.445, 9.0);

    fn shape(&self) -> T {
        self.q
    }

    fn set_shape(&mut self, value: T) {
        self.q = value;
    }
}

pub type DadrasAttractor<T> = Attractor<T, Dadras<T>>;
