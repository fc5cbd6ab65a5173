pub mod quadtree;
pub use quadtree::{NeighborSet, Node, NodeId, QuadTree, Quadrant};
