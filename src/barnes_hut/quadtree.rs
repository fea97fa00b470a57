use log::{log_enabled, trace, Level};
use nalgebra::Vector2;

use super::Quadrant;
use crate::{Error, Gravity, Result};

/// Half the width of the root box, which covers the unit square.
pub const ROOT_HALF_WIDTH: f64 = 0.5;

/// Deepest level an insertion may reach.
///
/// Half-widths can halve about 1074 times before they reach zero in f64, so
/// distinct bodies in the unit square separate well above this bound.
pub const DEFAULT_MAX_DEPTH: usize = 1100;

type Subnodes = [Option<Node>; 4];

/// A node of the quadtree.
///
/// A node without subnodes is a leaf holding exactly one body; its mass and
/// center of mass are those of the body. An inner node aggregates the mass and
/// the mass-weighted center of all bodies below it.
#[derive(Clone, Debug)]
pub struct Node {
    subnodes: Option<Box<Subnodes>>,
    center_of_mass: Vector2<f64>,
    mass: f64,
    box_center: Vector2<f64>,
    half_width: f64,
}

impl Node {
    fn leaf(position: Vector2<f64>, mass: f64, box_center: Vector2<f64>, half_width: f64) -> Self {
        Self {
            subnodes: None,
            center_of_mass: position,
            mass,
            box_center,
            half_width,
        }
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub fn center_of_mass(&self) -> Vector2<f64> {
        self.center_of_mass
    }

    #[must_use]
    pub fn box_center(&self) -> Vector2<f64> {
        self.box_center
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.subnodes.is_none()
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&Node> {
        self.subnodes.as_ref()?[quadrant.index()].as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = (Quadrant, &Node)> {
        Quadrant::ALL
            .into_iter()
            .filter_map(move |quadrant| Some((quadrant, self.child(quadrant)?)))
    }

    /// Merge a body into the aggregate of this node.
    fn add_mass(&mut self, position: Vector2<f64>, mass: f64) {
        let previous_mass = self.mass;
        self.mass += mass;
        self.center_of_mass =
            (self.center_of_mass * previous_mass + position * mass) / self.mass;
    }

    fn insert(
        &mut self,
        index: usize,
        position: Vector2<f64>,
        mass: f64,
        depth: usize,
        max_depth: usize,
    ) -> Result<()> {
        if self.is_leaf() && position == self.center_of_mass {
            return Err(Error::DuplicatePosition { index, position });
        }
        if depth >= max_depth {
            return Err(Error::DepthExceeded { position, depth });
        }

        let child_half_width = self.half_width / 2.;

        // Self holds a body, move it one level down before aggregating
        if self.is_leaf() {
            let quadrant = Quadrant::of(self.center_of_mass, self.box_center);
            let mut subnodes = Box::<Subnodes>::default();
            subnodes[quadrant.index()] = Some(Node::leaf(
                self.center_of_mass,
                self.mass,
                quadrant.child_center(self.box_center, child_half_width),
                child_half_width,
            ));
            self.subnodes = Some(subnodes);
        }

        self.add_mass(position, mass);

        let quadrant = Quadrant::of(position, self.box_center);
        let child_center = quadrant.child_center(self.box_center, child_half_width);
        let subnodes = self.subnodes.get_or_insert_with(Box::default);
        let slot = &mut subnodes[quadrant.index()];
        match slot {
            // Both bodies share a quadrant, split again one level deeper
            Some(child) => child.insert(index, position, mass, depth + 1, max_depth),
            None => {
                *slot = Some(Node::leaf(position, mass, child_center, child_half_width));
                Ok(())
            }
        }
    }

    fn accumulate_acceleration(
        &self,
        position: Vector2<f64>,
        gravity: &Gravity,
        theta: f64,
        acc: &mut Vector2<f64>,
    ) {
        match self.subnodes.as_deref() {
            None => *acc += gravity.acceleration(position, self.mass, self.center_of_mass),
            Some(subnodes) => {
                let d = (position - self.box_center).norm();

                if 2. * self.half_width < theta * d {
                    // node is far enough away, treat it as a single body
                    *acc += gravity.acceleration(position, self.mass, self.center_of_mass);
                } else {
                    for quadrant in Quadrant::TRAVERSAL_ORDER {
                        if let Some(node) = &subnodes[quadrant.index()] {
                            node.accumulate_acceleration(position, gravity, theta, acc);
                        }
                    }
                }
            }
        }
    }

    fn depth(&self) -> usize {
        self.children()
            .map(|(_, node)| node.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().map(|(_, node)| node.leaf_count()).sum()
        }
    }

    fn log_nodes(&self, depth: usize) {
        trace!(
            "{:indent$}mass {:.6}, box ({:.6}, {:.6}) +- {:.6}, center of mass ({:.6}, {:.6})",
            "",
            self.mass,
            self.box_center.x,
            self.box_center.y,
            self.half_width,
            self.center_of_mass.x,
            self.center_of_mass.y,
            indent = 2 * depth,
        );
        for (_, node) in self.children() {
            node.log_nodes(depth + 1);
        }
    }
}

/// Spatial index over the unit square, rebuilt from scratch every time step.
///
/// The tree owns all of its nodes; dropping it tears the whole tree down.
#[derive(Clone, Debug)]
pub struct Quadtree {
    root: Option<Node>,
    len: usize,
    max_depth: usize,
}

impl Default for Quadtree {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Quadtree {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            root: None,
            len: 0,
            max_depth,
        }
    }

    /// Build a tree by inserting the bodies in index order.
    pub fn from_bodies(
        positions: &[Vector2<f64>],
        masses: &[f64],
        max_depth: usize,
    ) -> Result<Self> {
        if positions.len() != masses.len() {
            return Err(Error::LengthMismatch {
                expected: positions.len(),
                found: masses.len(),
            });
        }

        let mut tree = Self::new(max_depth);
        for (&position, &mass) in positions.iter().zip(masses) {
            tree.insert(position, mass)?;
        }

        if log_enabled!(Level::Trace) {
            tree.log_nodes();
        }

        Ok(tree)
    }

    /// Insert a single body.
    ///
    /// Bodies are numbered in insertion order. The body must lie in the closed
    /// unit square and must not coincide with a body already in the tree.
    /// Into an empty tree the body becomes the root leaf directly.
    pub fn insert(&mut self, position: Vector2<f64>, mass: f64) -> Result<()> {
        let index = self.len;
        if !(position.x.is_finite() && position.y.is_finite() && mass.is_finite()) {
            return Err(Error::NonFiniteBody { index });
        }
        if !position.iter().all(|&x| (0. ..=2. * ROOT_HALF_WIDTH).contains(&x)) {
            return Err(Error::OutOfBounds { index, position });
        }

        match &mut self.root {
            Some(root) => root.insert(index, position, mass, 0, self.max_depth)?,
            None => {
                self.root = Some(Node::leaf(
                    position,
                    mass,
                    Vector2::from_element(ROOT_HALF_WIDTH),
                    ROOT_HALF_WIDTH,
                ));
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Number of bodies in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::leaf_count)
    }

    /// Approximate gravitational acceleration at `position`.
    ///
    /// Nodes whose box width is smaller than `theta` times their distance are
    /// treated as one body at their center of mass. `theta = 0` visits every leaf.
    #[must_use]
    pub fn acceleration(
        &self,
        position: Vector2<f64>,
        gravity: &Gravity,
        theta: f64,
    ) -> Vector2<f64> {
        let mut acc = Vector2::zeros();
        if let Some(root) = &self.root {
            root.accumulate_acceleration(position, gravity, theta, &mut acc);
        }
        acc
    }

    /// Dump every node at trace level.
    pub fn log_nodes(&self) {
        if let Some(root) = &self.root {
            root.log_nodes(0);
        }
    }
}
