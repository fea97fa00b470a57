use nalgebra::Vector2;

use crate::{partition, Bodies, Execution, Gravity, Result, Solver};

/// Exact O(N²) pairwise summation, the reference for [`BarnesHut`](crate::BarnesHut).
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectSummation {
    execution: Execution,
}

impl DirectSummation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            execution: Execution::SingleThreaded,
        }
    }

    /// Calculate the forces with multiple threads, one contiguous range of bodies per thread.
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
}

impl Solver for DirectSummation {
    fn calculate_accelerations(
        &self,
        bodies: &Bodies,
        accelerations: &mut [Vector2<f64>],
        gravity: &Gravity,
    ) -> Result<()> {
        let positions = bodies.positions();
        let masses = bodies.masses();

        partition::fill_accelerations(accelerations, self.execution, |i| {
            let mut acc = Vector2::zeros();
            for (j, (&m2, &p2)) in masses.iter().zip(positions).enumerate() {
                if i == j {
                    continue;
                }
                acc += gravity.acceleration(positions[i], m2, p2);
            }
            acc
        });

        Ok(())
    }
}
