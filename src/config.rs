//! Run parameters of a galaxy simulation.

use crate::{barnes_hut::DEFAULT_MAX_DEPTH, gravity, BarnesHut, Error, Gravity, Result};

/// Everything a run needs besides the initial bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Number of stars read from the input file.
    pub n_bodies: usize,
    pub n_steps: usize,
    pub time_step: f64,
    /// Barnes-Hut opening threshold, 0 gives exact summation.
    pub theta: f64,
    /// Worker threads in the force phase.
    pub n_threads: usize,
    /// Softening added to every distance.
    pub epsilon: f64,
    pub gravitational_constant: f64,
    /// Quadtree depth bound.
    pub max_depth: usize,
}

impl SimulationConfig {
    /// Parameters with the galaxy defaults: `G = 100 / N`, softening `1e-3`.
    #[must_use]
    pub fn new(
        n_bodies: usize,
        n_steps: usize,
        time_step: f64,
        theta: f64,
        n_threads: usize,
    ) -> Self {
        Self {
            n_bodies,
            n_steps,
            time_step,
            theta,
            n_threads,
            epsilon: gravity::DEFAULT_EPSILON,
            gravitational_constant: gravity::GRAVITY_SCALE / n_bodies as f64,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_bodies == 0 {
            return Err(Error::InvalidConfig("at least one body is needed"));
        }
        if self.n_threads == 0 {
            return Err(Error::InvalidConfig("at least one thread is needed"));
        }
        if !self.time_step.is_finite() {
            return Err(Error::InvalidConfig("time step must be finite"));
        }
        if !(self.theta.is_finite() && self.theta >= 0.) {
            return Err(Error::InvalidConfig("theta must be finite and non-negative"));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.) {
            return Err(Error::InvalidConfig("softening must be finite and positive"));
        }
        if !self.gravitational_constant.is_finite() {
            return Err(Error::InvalidConfig("gravitational constant must be finite"));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig("quadtree depth bound must be positive"));
        }
        Ok(())
    }

    #[must_use]
    pub fn gravity(&self) -> Gravity {
        Gravity::new(self.gravitational_constant, self.epsilon)
    }

    /// The Barnes-Hut solver described by this configuration.
    ///
    /// A single thread evaluates on the calling thread.
    #[must_use]
    pub fn barnes_hut(&self) -> BarnesHut {
        let solver = BarnesHut::new(self.theta).max_depth(self.max_depth);
        if self.n_threads > 1 {
            solver.multithreaded(self.n_threads)
        } else {
            solver
        }
    }
}
