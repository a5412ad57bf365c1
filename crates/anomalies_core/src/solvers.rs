use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit (forward) Euler solver.
///
/// One derivative evaluation per step and no heap storage, so it is safe to
/// call from inside a real-time audio callback.
#[derive(Debug, Clone, Copy)]
pub struct Euler<T: Scalar> {
    k: [T; 3],
}

impl<T: Scalar> Euler<T> {
    pub fn new() -> Self {
        Self { k: [T::zero(); 3] }
    }
}

impl<T: Scalar> Default for Euler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T; 3], dt: T) {
        // k = f(y)
        system.apply(state, &mut self.k);

        // y_next = y + dt * k
        for (value, slope) in state.iter_mut().zip(self.k.iter()) {
            *value = *value + *slope * dt;
        }
    }
}
