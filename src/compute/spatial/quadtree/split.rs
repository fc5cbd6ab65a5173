//! Node subdivision and incremental neighbor repair.

use super::{Node, NodeId, Quadrant, QuadTree};
use smallvec::SmallVec;

impl QuadTree {
    /// Split leaf `id` into four children.
    ///
    /// Points move into the child whose quadrant contains them; the parent's
    /// point list is emptied. Children are not split recursively, so a child
    /// may hold more than the threshold until its next insertion.
    ///
    /// Returns `false` without touching the tree if `id` is already split.
    pub fn split(&mut self, id: NodeId) -> bool {
        let parent = self.node(id);
        if !parent.is_leaf() {
            return false;
        }

        let level = parent.level + 1;
        let child_nodes: [Node; 4] =
            std::array::from_fn(|i| Node::new(parent.child_bounds(Quadrant::ALL[i]), Some(id), level));
        let first = self.nodes.len();
        let children: [NodeId; 4] = std::array::from_fn(|i| NodeId::new(first + i));
        self.nodes.extend(child_nodes);

        let points = std::mem::take(&mut self.nodes[id.index()].points);
        let moved = points.len();
        for point in points {
            let quadrant = self.node(id).quadrant(point.x(), point.y());
            let child = &mut self.nodes[children[quadrant.index()].index()];
            child.points.push(point);
            child.entity_count += 1;
        }
        self.nodes[id.index()].children = Some(children);

        let former: Vec<NodeId> = self.node(id).neighbors.iter().collect();
        self.link_children(&children, &former);
        self.notify_former_neighbors(id, &children, &former);

        log::debug!(
            "Split node {:?} at level {} into {:?}, moved {} points",
            id,
            level - 1,
            children,
            moved
        );
        true
    }

    /// Give each new child its neighbor set, drawn from its siblings, the
    /// parent's former neighbors and the children of those that have split.
    fn link_children(&mut self, children: &[NodeId; 4], former: &[NodeId]) {
        let mut candidates: SmallVec<[NodeId; 32]> = SmallVec::new();
        candidates.extend(children.iter().copied());
        for &neighbor in former {
            match self.node(neighbor).children {
                Some(grandchildren) => {
                    candidates.push(neighbor);
                    candidates.extend(grandchildren);
                }
                None => candidates.push(neighbor),
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        for &child in children {
            let linked: SmallVec<[NodeId; 16]> = candidates
                .iter()
                .copied()
                .filter(|&candidate| self.should_link(child, candidate))
                .collect();
            self.nodes[child.index()].neighbors.extend(linked);
        }
    }

    /// Restore symmetry on the far side of the split.
    ///
    /// A former neighbor that still qualifies as a neighbor of the parent
    /// (same level, or a shallower leaf) keeps it and gains the adjacent
    /// children. A deeper one has the parent replaced by the adjacent
    /// children, and the parent forgets it.
    fn notify_former_neighbors(&mut self, id: NodeId, children: &[NodeId; 4], former: &[NodeId]) {
        for &neighbor in former {
            let adjacent: SmallVec<[NodeId; 4]> = children
                .iter()
                .copied()
                .filter(|&child| self.should_link(neighbor, child))
                .collect();

            if self.should_link(id, neighbor) {
                self.nodes[neighbor.index()].neighbors.extend(adjacent);
            } else {
                self.nodes[neighbor.index()].neighbors.replace(id, adjacent);
                self.nodes[id.index()].neighbors.remove(neighbor);
            }
        }
    }
}
