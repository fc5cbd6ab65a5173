//! Quadtree cells and their geometry.

use crate::types::{Bounds, CellInfo};
use geo::Point;
use rustc_hash::FxHashSet;

/// Index of a node inside a [`super::QuadTree`] arena.
///
/// Ids are only meaningful for the tree that issued them and are invalidated
/// by a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "quadtree arena overflow");
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Child position inside a split node.
///
/// The y axis grows downwards, so "north" is the half with the smaller y.
/// Points on the vertical split line go west, points on the horizontal split
/// line go north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Set of linked neighbor nodes.
#[derive(Debug, Clone, Default)]
pub struct NeighborSet {
    ids: FxHashSet<NodeId>,
}

impl NeighborSet {
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Neighbor ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut ids: Vec<NodeId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    pub(crate) fn insert(&mut self, id: NodeId) -> bool {
        self.ids.insert(id)
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        self.ids.remove(&id)
    }

    pub(crate) fn extend(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids.extend(ids);
    }

    /// Swap `old` for `new` in one step. Nothing is inserted if `old` was absent.
    pub(crate) fn replace(&mut self, old: NodeId, new: impl IntoIterator<Item = NodeId>) -> bool {
        if !self.ids.remove(&old) {
            return false;
        }
        self.ids.extend(new);
        true
    }
}

/// One quadtree cell.
///
/// A node is either a leaf holding points directly or an internal node with
/// exactly four children. `entity_count` covers the whole subtree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) bounds: Bounds,
    pub(crate) xp: f64,
    pub(crate) yp: f64,
    pub(crate) size: f64,
    pub(crate) level: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; 4]>,
    pub(crate) points: Vec<Point<f64>>,
    pub(crate) neighbors: NeighborSet,
    pub(crate) entity_count: usize,
}

impl Node {
    pub(crate) fn new(bounds: Bounds, parent: Option<NodeId>, level: u32) -> Self {
        let (xp, yp) = bounds.centroid();
        Self {
            bounds,
            xp,
            yp,
            size: bounds.size(),
            level,
            parent,
            children: None,
            points: Vec::new(),
            neighbors: NeighborSet::default(),
            entity_count: 0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn centroid(&self) -> (f64, f64) {
        (self.xp, self.yp)
    }

    /// `min(width, height)`.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Subdivision depth from the root (root = 0).
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in [`Quadrant`] order, if split.
    pub fn children(&self) -> Option<&[NodeId; 4]> {
        self.children.as_ref()
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<NodeId> {
        self.children.map(|c| c[quadrant.index()])
    }

    /// Points held directly. Always empty for internal nodes.
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    pub fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    /// Number of points in this node's subtree.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Which child quadrant `(x, y)` belongs to.
    pub fn quadrant(&self, x: f64, y: f64) -> Quadrant {
        match (x > self.xp, y <= self.yp) {
            (true, true) => Quadrant::NorthEast,
            (false, true) => Quadrant::NorthWest,
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        }
    }

    pub(crate) fn child_bounds(&self, quadrant: Quadrant) -> Bounds {
        let b = &self.bounds;
        match quadrant {
            Quadrant::NorthEast => Bounds::new(self.xp, b.y0, b.x1, self.yp),
            Quadrant::NorthWest => Bounds::new(b.x0, b.y0, self.xp, self.yp),
            Quadrant::SouthWest => Bounds::new(b.x0, self.yp, self.xp, b.y1),
            Quadrant::SouthEast => Bounds::new(self.xp, self.yp, b.x1, b.y1),
        }
    }

    /// Geometric adjacency: a shared corner, or an edge of the smaller cell
    /// lying on an edge of the larger one with the smaller cell's midpoint
    /// strictly inside the larger cell's perpendicular span.
    ///
    /// This is purely geometric. A cell and one of its own corner children
    /// share a corner and therefore test positive; the tree excludes nested
    /// pairs separately.
    pub fn is_neighbor(&self, other: &Node) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }

        let theirs = other.bounds.corners();
        if self.bounds.corners().iter().any(|c| theirs.contains(c)) {
            return true;
        }

        let (large, small) = if self.size <= other.size {
            (other, self)
        } else {
            (self, other)
        };
        let (lb, sb) = (&large.bounds, &small.bounds);

        let vertical_edge = (lb.x0 == sb.x1 || lb.x1 == sb.x0) && small.yp > lb.y0 && small.yp < lb.y1;
        let horizontal_edge =
            (lb.y0 == sb.y1 || lb.y1 == sb.y0) && small.xp > lb.x0 && small.xp < lb.x1;

        vertical_edge || horizontal_edge
    }

    /// Distance from `(x, y)` to this cell's centroid.
    pub fn centroid_distance(&self, x: f64, y: f64) -> f64 {
        let (dx, dy) = (self.xp - x, self.yp - y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn to_info(&self) -> CellInfo {
        CellInfo {
            x0: self.bounds.x0,
            y0: self.bounds.y0,
            x1: self.bounds.x1,
            y1: self.bounds.y1,
            xp: self.xp,
            yp: self.yp,
            level: self.level,
            entity_count: self.entity_count,
            size: self.size,
            is_leaf: self.is_leaf(),
        }
    }
}
