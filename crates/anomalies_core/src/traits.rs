use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in our attractors.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Converts an `f64` constant into the scalar type.
///
/// Conversions that cannot be represented come back as NaN, which the
/// divergence guard in [`crate::attractors::AttractorState`] then absorbs.
#[inline]
pub fn lit<T: Scalar>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// An autonomous three-dimensional flow.
pub trait DynamicalSystem<T: Scalar> {
    /// Evaluates the vector field.
    /// x: current state (x, y, z)
    /// out: buffer to write dx/dt, dy/dt, dz/dt
    fn apply(&self, x: &[T; 3], out: &mut [T; 3]);
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// state: current state (updated after step)
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T; 3], dt: T);
}

/// Capabilities shared by every attractor family.
///
/// A family owns only its shape parameters. Trajectory state, the `speed`
/// scalar and the integrator live in [`crate::attractors::Attractor`], so a new
/// family only has to provide its vector field and these constants.
pub trait Family<T: Scalar>: DynamicalSystem<T> + Default + Clone {
    /// Short identifier, also used by hosts to pick a family by name.
    const NAME: &'static str;
    /// Where a freshly constructed trajectory starts.
    const INITIAL_STATE: [f64; 3];
    /// Range of the exposed shape parameter in which the family stays chaotic.
    /// Values outside it are accepted; they just behave differently.
    const SHAPE_RANGE: (f64, f64);

    /// Current value of the exposed shape parameter.
    fn shape(&self) -> T;

    fn set_shape(&mut self, value: T);
}
