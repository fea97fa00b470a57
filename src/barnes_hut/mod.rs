use log::trace;
use nalgebra::Vector2;

mod quadtree;

pub use quadtree::*;

use crate::{partition, Bodies, Execution, Gravity, Result, Solver};

/// One of the four boxes a node is split into around its center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// Order in which subnodes are visited when summing accelerations.
    pub const TRAVERSAL_ORDER: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::NorthWest,
        Quadrant::SouthEast,
        Quadrant::NorthEast,
    ];

    /// Choose the quadrant of `center` that `point` belongs to.
    ///
    /// Points on a dividing line are assigned asymmetrically:
    /// - NW: `x <= cx && y > cy`
    /// - NE: `x > cx && y >= cy`
    /// - SW: `x < cx && y <= cy`
    /// - SE: `x >= cx && y < cy`
    ///
    /// The four rules are disjoint and leave out only the center itself, which goes to SE.
    #[must_use]
    pub fn of(point: Vector2<f64>, center: Vector2<f64>) -> Self {
        if point.x <= center.x && point.y > center.y {
            Quadrant::NorthWest
        } else if point.x > center.x && point.y >= center.y {
            Quadrant::NorthEast
        } else if point.x < center.x && point.y <= center.y {
            Quadrant::SouthWest
        } else {
            Quadrant::SouthEast
        }
    }

    /// Center of this quadrant's box, for a child box of half-width `child_half_width`.
    #[must_use]
    pub fn child_center(self, center: Vector2<f64>, child_half_width: f64) -> Vector2<f64> {
        match self {
            Quadrant::NorthWest => center + Vector2::new(-child_half_width, child_half_width),
            Quadrant::NorthEast => center + Vector2::new(child_half_width, child_half_width),
            Quadrant::SouthWest => center + Vector2::new(-child_half_width, -child_half_width),
            Quadrant::SouthEast => center + Vector2::new(child_half_width, -child_half_width),
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Barnes-Hut solver.
///
/// Every call builds a fresh [`Quadtree`] from the current positions, evaluates
/// the acceleration of every body against it and drops the tree again.
#[derive(Clone, Copy, Debug)]
pub struct BarnesHut {
    theta: f64,
    max_depth: usize,
    execution: Execution,
}

impl BarnesHut {
    #[must_use]
    pub fn new(theta: f64) -> Self {
        Self {
            theta,
            max_depth: DEFAULT_MAX_DEPTH,
            execution: Execution::SingleThreaded,
        }
    }

    /// Calculate the forces with multiple threads.
    ///
    /// The bodies are split into `num_threads` contiguous ranges and every
    /// thread evaluates its range against the shared tree.
    #[must_use]
    pub fn multithreaded(mut self, num_threads: usize) -> Self {
        self.execution = Execution::Multithreaded { num_threads };
        self
    }

    /// Use Rayon to calculate the forces with multiple threads.
    #[cfg(feature = "rayon")]
    #[must_use]
    pub fn rayon_iter(mut self) -> Self {
        self.execution = Execution::RayonIter;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    #[must_use]
    pub fn execution(&self) -> Execution {
        self.execution
    }
}

impl Solver for BarnesHut {
    fn calculate_accelerations(
        &self,
        bodies: &Bodies,
        accelerations: &mut [Vector2<f64>],
        gravity: &Gravity,
    ) -> Result<()> {
        trace!("building quadtree for {} bodies", bodies.len());
        let quadtree =
            Quadtree::from_bodies(bodies.positions(), bodies.masses(), self.max_depth)?;

        trace!("evaluating accelerations ({:?})", self.execution);
        let positions = bodies.positions();
        partition::fill_accelerations(accelerations, self.execution, |i| {
            quadtree.acceleration(positions[i], gravity, self.theta)
        });

        trace!("tearing down quadtree");
        drop(quadtree);

        Ok(())
    }
}
