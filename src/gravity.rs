use nalgebra::Vector2;

/// Softening added to every pairwise distance.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Total "gravitational budget" of a run, divided among the bodies.
pub const GRAVITY_SCALE: f64 = 100.;

/// Gravitational constant and softening used by the force kernels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    pub g: f64,
    pub epsilon: f64,
}

impl Gravity {
    #[must_use]
    pub fn new(g: f64, epsilon: f64) -> Self {
        Self { g, epsilon }
    }

    /// The galaxy convention `G = 100 / N` with the default softening.
    #[must_use]
    pub fn for_bodies(n: usize) -> Self {
        Self::new(GRAVITY_SCALE / n as f64, DEFAULT_EPSILON)
    }

    /// Acceleration that a point mass `mass2` at `position2` exerts on a body at `position1`.
    ///
    /// Uses the softened distance `r + epsilon`:
    /// `a = -G * m2 / (r + epsilon)^3 * (position1 - position2)`.
    /// Coincident points contribute exactly zero.
    #[inline]
    #[must_use]
    pub fn acceleration(
        &self,
        position1: Vector2<f64>,
        mass2: f64,
        position2: Vector2<f64>,
    ) -> Vector2<f64> {
        let r = position1 - position2;
        let softened = r.norm() + self.epsilon;
        r * (-self.g * mass2 / (softened * softened * softened))
    }
}
