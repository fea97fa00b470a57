use std::{io, path::PathBuf};

use nalgebra::Vector2;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a simulation run.
///
/// None of these are recoverable: a run either completes every step or
/// produces no output at all.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "'{}' holds {found} bytes, but {expected} bytes are needed for the requested bodies",
        path.display()
    )]
    TruncatedInput {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// Two bodies share exactly the same coordinates and can never be told apart by the quadtree.
    #[error("body {index} at ({}, {}) coincides with another body", position.x, position.y)]
    DuplicatePosition { index: usize, position: Vector2<f64> },

    #[error("body {index} at ({}, {}) left the unit square", position.x, position.y)]
    OutOfBounds { index: usize, position: Vector2<f64> },

    /// Insertion reached the depth bound of the quadtree before the body got its own leaf.
    #[error(
        "quadtree insertion of body at ({}, {}) exceeded depth {depth}",
        position.x,
        position.y
    )]
    DepthExceeded { position: Vector2<f64>, depth: usize },

    #[error("body {index} has a non-finite position or mass")]
    NonFiniteBody { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("expected {expected} entries, got {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
