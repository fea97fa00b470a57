pub mod barnes_hut;
pub mod bodies;
pub mod config;
pub mod csv;
pub mod direct_summation;
pub mod error;
pub mod gravity;
pub mod partition;

pub use barnes_hut::BarnesHut;
pub use bodies::*;
pub use config::SimulationConfig;
pub use direct_summation::DirectSummation;
pub use error::{Error, Result};
pub use gravity::Gravity;

use log::{debug, trace};
use nalgebra::Vector2;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    SingleThreaded,
    /// Fresh scoped OS threads every step, one contiguous range of bodies each.
    Multithreaded {
        num_threads: usize,
    },
    #[cfg(feature = "rayon")]
    RayonIter,
}

/// Computes the acceleration of every body.
pub trait Solver {
    /// Overwrite `accelerations[i]` with the acceleration acting on body `i`.
    fn calculate_accelerations(
        &self,
        bodies: &Bodies,
        accelerations: &mut [Vector2<f64>],
        gravity: &Gravity,
    ) -> Result<()>;
}

/// Advance all bodies by one time step.
///
/// Semi-implicit Euler: the velocity is updated first and the new velocity
/// moves the position.
pub fn integrate(bodies: &mut Bodies, accelerations: &[Vector2<f64>], time_step: f64) {
    for ((velocity, position), acc) in bodies
        .velocities
        .iter_mut()
        .zip(bodies.positions.iter_mut())
        .zip(accelerations)
    {
        *velocity += *acc * time_step;
        *position += *velocity * time_step;
    }
}

/// Drives a galaxy simulation.
///
/// Every step evaluates the accelerations with the solver (for [`BarnesHut`]
/// this builds, uses and drops a quadtree) and then integrates all bodies.
#[derive(Clone, Debug)]
pub struct Simulation<S: Solver> {
    bodies: Bodies,
    solver: S,
    gravity: Gravity,
    accelerations: Vec<Vector2<f64>>,
    steps: usize,
}

impl<S: Solver> Simulation<S> {
    /// Create a simulation with the galaxy convention `G = 100 / N`.
    pub fn new(bodies: Bodies, solver: S) -> Self {
        let gravity = Gravity::for_bodies(bodies.len());
        Self::with_gravity(bodies, solver, gravity)
    }

    pub fn with_gravity(bodies: Bodies, solver: S, gravity: Gravity) -> Self {
        let n = bodies.len();
        Self {
            bodies,
            solver,
            gravity,
            accelerations: vec![Vector2::zeros(); n],
            steps: 0,
        }
    }

    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    pub fn into_bodies(self) -> Bodies {
        self.bodies
    }

    pub fn gravity(&self) -> &Gravity {
        &self.gravity
    }

    /// Accelerations evaluated in the last step.
    pub fn accelerations(&self) -> &[Vector2<f64>] {
        &self.accelerations
    }

    /// Number of completed steps.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step(&mut self, time_step: f64) -> Result<()> {
        trace!("step {}: evaluating accelerations", self.steps);
        self.accelerations.fill(Vector2::zeros());
        self.solver
            .calculate_accelerations(&self.bodies, &mut self.accelerations, &self.gravity)?;

        trace!("step {}: integrating", self.steps);
        integrate(&mut self.bodies, &self.accelerations, time_step);

        self.steps += 1;
        Ok(())
    }

    /// Run `num_steps` steps, calling `observer` with the bodies after each one.
    ///
    /// The first error aborts the run.
    pub fn simulate(
        &mut self,
        time_step: f64,
        num_steps: usize,
        mut observer: impl FnMut(usize, &Bodies) -> Result<()>,
    ) -> Result<()> {
        for t in 0..num_steps {
            self.step(time_step)?;
            observer(t, &self.bodies)?;

            if (t + 1) % 100 == 0 {
                debug!("{} out of {num_steps} time steps done", t + 1);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::Uniform;

    use super::*;

    fn two_bodies() -> Bodies {
        Bodies::new(
            vec![Vector2::new(0.3, 0.3), Vector2::new(0.7, 0.7)],
            vec![Vector2::zeros(); 2],
            vec![1.; 2],
            vec![0.5, 0.25],
        )
    }

    #[test]
    fn semi_implicit_euler() {
        let mut bodies = Bodies::new(
            vec![Vector2::new(1., 2.)],
            vec![Vector2::new(0.5, -0.5)],
            vec![1.],
            vec![1.],
        );

        integrate(&mut bodies, &[Vector2::new(2., 4.)], 0.5);

        // v = v + dt * a, then x = x + dt * v with the new velocity
        assert_eq!(bodies.velocities()[0], Vector2::new(1.5, 1.5));
        assert_eq!(bodies.positions()[0], Vector2::new(1.75, 2.75));
    }

    #[test]
    fn single_body_stays_put() {
        let bodies = Bodies::new(
            vec![Vector2::new(0.4, 0.6)],
            vec![Vector2::zeros()],
            vec![5.],
            vec![1.],
        );
        let mut sim = Simulation::new(bodies.clone(), BarnesHut::new(0.5));

        sim.simulate(1e-3, 50, |_, _| Ok(())).unwrap();

        assert_eq!(sim.accelerations()[0], Vector2::zeros());
        assert_eq!(sim.into_bodies(), bodies);
    }

    #[test]
    fn two_bodies_attract_symmetrically() {
        let mut sim = Simulation::new(two_bodies(), BarnesHut::new(0.5));
        assert_eq!(sim.gravity().g, 50.);

        sim.step(1e-3).unwrap();

        let acc = sim.accelerations();
        assert_abs_diff_eq!(acc[0], -acc[1], epsilon = 1e-12);
        assert!(acc[0].x > 0. && acc[0].y > 0.);

        let bodies = sim.bodies();
        let v = bodies.velocities();
        assert_abs_diff_eq!(v[0], -v[1], epsilon = 1e-12);
        assert_abs_diff_eq!(v[0], acc[0] * 1e-3, epsilon = 1e-15);
        let p = bodies.positions();
        assert!(p[0].x > 0.3 && p[1].x < 0.7);
        assert_abs_diff_eq!(p[0] + p[1], Vector2::new(1., 1.), epsilon = 1e-12);
        assert_eq!(bodies.brightness(), &[0.5, 0.25]);
    }

    #[test]
    fn observer_sees_every_step() {
        let mut sim = Simulation::new(two_bodies(), DirectSummation::new());
        let mut seen = Vec::new();

        sim.simulate(1e-4, 5, |t, bodies| {
            seen.push((t, bodies.positions()[0]));
            Ok(())
        })
        .unwrap();

        assert_eq!(sim.steps(), 5);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[4].1, sim.bodies().positions()[0]);
        assert!(seen.windows(2).all(|w| w[1].1.x > w[0].1.x));
    }

    #[test]
    fn observer_error_aborts() {
        let mut sim = Simulation::new(two_bodies(), DirectSummation::new());

        let result = sim.simulate(1e-4, 10, |t, _| {
            if t == 2 {
                Err(Error::InvalidConfig("stop"))
            } else {
                Ok(())
            }
        });

        assert!(result.is_err());
        assert_eq!(sim.steps(), 3);
    }

    #[test]
    fn solver_error_stops_the_run() {
        let bodies = Bodies::new(
            vec![Vector2::new(0.3, 0.3), Vector2::new(0.6, 0.2), Vector2::new(0.3, 0.3)],
            vec![Vector2::new(0.1, 0.); 3],
            vec![1.; 3],
            vec![1.; 3],
        );
        let mut sim = Simulation::new(bodies.clone(), BarnesHut::new(0.5));
        let mut observed = 0;

        let result = sim.simulate(1e-3, 10, |_, _| {
            observed += 1;
            Ok(())
        });

        assert!(matches!(result, Err(Error::DuplicatePosition { index: 2, .. })));
        assert_eq!(observed, 0);
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.bodies(), &bodies);
    }

    #[test]
    fn escaped_body_stops_the_run() {
        let bodies = Bodies::new(
            vec![Vector2::new(0.5, 0.5), Vector2::new(0.999, 0.5)],
            vec![Vector2::zeros(), Vector2::new(10., 0.)],
            vec![1e-6; 2],
            vec![1.; 2],
        );
        let mut sim = Simulation::new(bodies, BarnesHut::new(0.5));

        let result = sim.simulate(1e-3, 10, |_, _| Ok(()));

        assert!(matches!(result, Err(Error::OutOfBounds { index: 1, .. })));
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn compare_brute_force() {
        let bodies = DistrBodyCreator::rng(
            Uniform::new(0.5, 1.5),
            Uniform::new(0.2, 0.8),
            Uniform::new(-0.05, 0.05),
            StdRng::seed_from_u64(11),
        )
        .create_bodies(100);

        let mut brute_force = Simulation::new(bodies.clone(), DirectSummation::new());
        let mut barnes_hut = Simulation::new(bodies, BarnesHut::new(0.).multithreaded(4));

        brute_force.simulate(1e-5, 10, |_, _| Ok(())).unwrap();
        barnes_hut.simulate(1e-5, 10, |_, _| Ok(())).unwrap();

        let difference =
            max_position_difference(brute_force.bodies(), barnes_hut.bodies()).unwrap();
        assert!(difference < 1e-10, "difference {difference}");
        for (p1, p2) in brute_force
            .bodies()
            .positions()
            .iter()
            .zip(barnes_hut.bodies().positions())
        {
            assert_relative_eq!(p1, p2, max_relative = 1e-9);
        }
    }
}
