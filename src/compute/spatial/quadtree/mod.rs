//! # Neighbor-Linked Adaptive Quadtree
//!
//! Points are routed down to the leaf whose cell contains them. A leaf that
//! overflows the split threshold subdivides into four children, each at
//! `level + 1`, unless its side length has already reached the minimum cell
//! size (such a leaf is *saturated* and simply keeps growing).
//!
//! Every node keeps a set of **linked neighbors**. Two live nodes A and B are
//! linked when:
//!
//! 1. they are geometrically adjacent (see [`Node::is_neighbor`]),
//! 2. neither contains the other, and
//! 3. they sit at the same level, or the shallower of the two is a leaf.
//!
//! The relation is symmetric. For any node S, the linked neighbors at
//! `level <= S.level` are pairwise disjoint and cover the ring of width
//! `size(S)` around S. A radius query therefore only has to visit the
//! smallest cell around the target whose side exceeds the radius plus that
//! ring, instead of the whole tree.
//!
//! ```text
//! +--------+--------+----------------+
//! |  NW    |  NE    |                |
//! +---+----+--------+      NE        |
//! |   | S  |  SE    |                |
//! +---+----+--------+----------------+
//! ```
//!
//! Splitting repairs links locally: the new children link to each other and
//! to the qualifying former neighbors of their parent, deeper former
//! neighbors have the parent replaced by its adjacent children, and the
//! parent drops its deeper neighbors. No global rebuild is ever needed.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Nodes are
//! never removed individually; a reset replaces the whole arena.

mod node;
mod query;
mod split;

#[cfg(test)]
mod tests;

pub use node::{NeighborSet, Node, NodeId, Quadrant};

use crate::config::Config;
use crate::types::{Bounds, CellInfo};
use geo::Point;
use smallvec::SmallVec;

/// Arena backed quadtree with live neighbor links.
///
/// Not internally synchronized: inserts and splits mutate shared node state,
/// so callers must serialize writers (see `SyncGeoStore` with the `sync`
/// feature). Read-only methods may run concurrently with each other.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    split_threshold: usize,
    min_cell_size: f64,
}

impl QuadTree {
    /// Id of the root node.
    pub const ROOT: NodeId = NodeId::ROOT;

    /// Create an empty tree over `bounds`.
    pub fn new(bounds: Bounds, split_threshold: usize, min_cell_size: f64) -> Self {
        Self {
            nodes: vec![Node::new(bounds, None, 0)],
            split_threshold,
            min_cell_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bounds, config.split_threshold, config.min_cell_size)
    }

    /// Fresh empty tree with the same thresholds over `bounds`.
    pub(crate) fn with_bounds(&self, bounds: Bounds) -> Self {
        Self::new(bounds, self.split_threshold, self.min_cell_size)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Borrow a node. Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn bounds(&self) -> Bounds {
        self.root().bounds
    }

    pub fn split_threshold(&self) -> usize {
        self.split_threshold
    }

    pub fn min_cell_size(&self) -> f64 {
        self.min_cell_size
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.root().entity_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes, internal ones included.
    pub fn cell_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a point. Never fails: a saturated leaf just exceeds the
    /// nominal capacity.
    pub fn insert(&mut self, point: Point<f64>) {
        let (x, y) = (point.x(), point.y());
        if !self.bounds().contains(x, y) {
            log::warn!(
                "Point ({}, {}) lies outside the index extent {:?}; radius guarantees do not cover it",
                x,
                y,
                self.bounds()
            );
        }

        let leaf = self.leaf_for(x, y);
        self.nodes[leaf.index()].points.push(point);

        let mut cursor = Some(leaf);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id.index()];
            node.entity_count += 1;
            cursor = node.parent;
        }

        let node = &self.nodes[leaf.index()];
        if node.points.len() > self.split_threshold {
            if node.size > self.min_cell_size {
                self.split(leaf);
            } else if node.points.len() == self.split_threshold + 1 {
                log::warn!(
                    "Leaf {:?} at level {} reached the minimum cell size and is saturated",
                    leaf,
                    node.level
                );
            }
        }
    }

    /// Leaf whose cell contains `(x, y)`.
    pub fn leaf_for(&self, x: f64, y: f64) -> NodeId {
        let mut id = Self::ROOT;
        loop {
            let node = self.node(id);
            match node.children {
                Some(children) => id = children[node.quadrant(x, y).index()],
                None => return id,
            }
        }
    }

    /// Height of the tree: 0 for a lone root.
    pub fn depth(&self) -> u32 {
        self.depth_of(Self::ROOT)
    }

    /// 0 for a leaf, otherwise one more than the deepest child.
    pub fn depth_of(&self, id: NodeId) -> u32 {
        let base = self.node(id).level;
        self.subtree(id)
            .iter()
            .map(|n| self.node(*n).level - base)
            .max()
            .unwrap_or(0)
    }

    /// Every node, parents before children.
    pub fn all_cells(&self) -> Vec<NodeId> {
        self.subtree(Self::ROOT)
    }

    /// Every node under `id` (inclusive), parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[NodeId; 32]> = SmallVec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(children) = self.node(current).children {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// Leaves under `id` (inclusive).
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree(id)
            .into_iter()
            .filter(|n| self.node(*n).is_leaf())
            .collect()
    }

    /// All stored points.
    pub fn all_entities(&self) -> Vec<Point<f64>> {
        self.entities_under(Self::ROOT).collect()
    }

    /// Points in the subtree of `id`.
    pub fn entities_under(&self, id: NodeId) -> impl Iterator<Item = Point<f64>> + '_ {
        self.leaves(id)
            .into_iter()
            .flat_map(move |leaf| self.node(leaf).points.iter().copied())
    }

    /// Descriptor of every node, for visualization.
    pub fn cells(&self) -> Vec<CellInfo> {
        self.all_cells()
            .into_iter()
            .map(|id| self.node(id).to_info())
            .collect()
    }

    /// Geometric adjacency between two nodes of this tree.
    pub fn is_neighbor(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.node(a).is_neighbor(self.node(b))
    }

    /// True if `ancestor` strictly contains `descendant` in the hierarchy.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let target = self.node(ancestor).level;
        let mut current = descendant;
        while self.node(current).level > target {
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        current == ancestor && ancestor != descendant
    }

    /// Whether `a` and `b` should appear in each other's neighbor sets.
    pub fn should_link(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (na, nb) = (self.node(a), self.node(b));
        let tiered = na.level == nb.level
            || (na.level < nb.level && na.is_leaf())
            || (nb.level < na.level && nb.is_leaf());

        tiered && na.is_neighbor(nb) && !self.is_ancestor(a, b) && !self.is_ancestor(b, a)
    }
}
