use std::{ops::Range, thread};

use log::trace;
use nalgebra::Vector2;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::Execution;

/// Split `0..n` into `num_threads` contiguous ranges of `ceil(n / num_threads)` indices.
///
/// The last non-empty range is clipped to `n`. With more threads than indices the
/// trailing ranges are empty (`n..n`), never out of bounds.
///
/// # Panics
/// If `num_threads` is zero.
#[must_use]
pub fn partition(n: usize, num_threads: usize) -> Vec<Range<usize>> {
    assert!(num_threads > 0, "at least one thread is needed");

    let chunk = n.div_ceil(num_threads);
    (0..num_threads)
        .map(|rank| {
            let first = (chunk * rank).min(n);
            let last = (first + chunk).min(n);
            first..last
        })
        .collect()
}

/// Set `accelerations[i] = eval(i)` for every body, spread over threads according to `execution`.
///
/// With [`Execution::Multithreaded`] one scoped thread is spawned per range of
/// [`partition`] and every thread writes only its own sub-slice. All threads are
/// joined before this returns.
pub fn fill_accelerations<F>(accelerations: &mut [Vector2<f64>], execution: Execution, eval: F)
where
    F: Fn(usize) -> Vector2<f64> + Sync,
{
    match execution {
        Execution::SingleThreaded => {
            for (i, a) in accelerations.iter_mut().enumerate() {
                *a = eval(i);
            }
        }
        Execution::Multithreaded { num_threads } => {
            let ranges = partition(accelerations.len(), num_threads);
            let eval = &eval;

            thread::scope(|s| {
                let mut rest = accelerations;
                for (rank, range) in ranges.into_iter().enumerate() {
                    let (local, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                    rest = tail;

                    trace!("thread {rank} evaluates bodies {range:?}");
                    s.spawn(move || {
                        for (a, i) in local.iter_mut().zip(range) {
                            *a = eval(i);
                        }
                    });
                }
            });
        }
        #[cfg(feature = "rayon")]
        Execution::RayonIter => {
            accelerations
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, a)| *a = eval(i));
        }
    }
}
