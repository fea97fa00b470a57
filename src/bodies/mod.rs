mod creator;
mod record;

pub use creator::*;
pub use record::*;

use nalgebra::Vector2;

/// A single star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub mass: f64,
    pub brightness: f64,
}

impl Body {
    #[must_use]
    pub fn new(position: Vector2<f64>, velocity: Vector2<f64>, mass: f64, brightness: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            brightness,
        }
    }
}

/// A collection of bodies.
///
/// This struct is used to utilize the Struct-of-Arrays (SOA) architecture.
/// A body is identified by its index, which is stable for the whole run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bodies {
    pub(crate) positions: Vec<Vector2<f64>>,
    pub(crate) velocities: Vec<Vector2<f64>>,
    pub(crate) masses: Vec<f64>,
    pub(crate) brightness: Vec<f64>,
}

impl Bodies {
    #[must_use]
    pub fn new(
        positions: Vec<Vector2<f64>>,
        velocities: Vec<Vector2<f64>>,
        masses: Vec<f64>,
        brightness: Vec<f64>,
    ) -> Self {
        let len = masses.len();
        assert_eq!(len, positions.len());
        assert_eq!(len, velocities.len());
        assert_eq!(len, brightness.len());

        Self {
            positions,
            velocities,
            masses,
            brightness,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[Vector2<f64>] {
        &self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vector2<f64>] {
        &self.velocities
    }

    #[must_use]
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    #[must_use]
    pub fn brightness(&self) -> &[f64] {
        &self.brightness
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Body> {
        Some(Body::new(
            *self.positions.get(index)?,
            self.velocities[index],
            self.masses[index],
            self.brightness[index],
        ))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Body> + '_ {
        (0..self.len()).map(|i| {
            Body::new(
                self.positions[i],
                self.velocities[i],
                self.masses[i],
                self.brightness[i],
            )
        })
    }

    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }
}

impl FromIterator<Body> for Bodies {
    fn from_iter<T: IntoIterator<Item = Body>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let cap = iter.size_hint().0;
        let mut bodies = Self {
            positions: Vec::with_capacity(cap),
            velocities: Vec::with_capacity(cap),
            masses: Vec::with_capacity(cap),
            brightness: Vec::with_capacity(cap),
        };

        for body in iter {
            bodies.positions.push(body.position);
            bodies.velocities.push(body.velocity);
            bodies.masses.push(body.mass);
            bodies.brightness.push(body.brightness);
        }

        bodies
    }
}
