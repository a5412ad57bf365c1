use super::Attractor;
use crate::traits::{lit, DynamicalSystem, Family, Scalar};
use serde::{Deserialize, Serialize};

/// Lorenz's convection model. Only `beta` is exposed as the shape control;
/// `sigma` and `rho` keep their classic values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lorenz<T> {
    pub sigma: T,
    pub beta: T,
    pub rho: T,
}

impl<T> Lorenz<T> {
    pub const DEFAULT_SIGMA: f64 = 10.0;
    pub const DEFAULT_BETA: f64 = 8.0 / 3.0;
    pub const DEFAULT_RHO: f64 = 28.0;
}

impl<T: Scalar> Default for Lorenz<T> {
    fn default() -> Self {
        Self {
            sigma: lit(Self::DEFAULT_SIGMA),
            beta: lit(Self::DEFAULT_BETA),
            rho: lit(Self::DEFAULT_RHO),
        }
    }
}

impl<T: Scalar> DynamicalSystem<T> for Lorenz<T> {
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]) {
        let [x, y, z] = *x;
        out[0] = self.sigma * (y - x);
        out[1] = x * (self.rho - z) - y;
        out[2] = x * y - self.beta * z;
    }
}

impl<T: Scalar> Family<T> for Lorenz<T> {
    const NAME: &'static str = "lorenz";
    const INITIAL_STATE: [f64; 3] = [1.0, 1.0, 1.0];
    const SHAPE_RANGE: (f64, f64) = (0.6, 3.25);

    fn shape(&self) -> T {
        self.beta
    }

    fn set_shape(&mut self, value: T) {
        self.beta = value;
    }
}

pub type LorenzAttractor<T> = Attractor<T, Lorenz<T>>;
