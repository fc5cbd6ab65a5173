//! Search-space selection and bounded radius queries.

use super::{NodeId, QuadTree};
use crate::error::{GeoStoreError, Result};
use crate::types::{Match, QueryResult};
use geo::Point;

/// Euclidean distance from `point` to `(x, y)`.
pub(crate) fn distance_to(point: &Point<f64>, x: f64, y: f64) -> f64 {
    let (dx, dy) = (point.x() - x, point.y() - y);
    (dx * dx + dy * dy).sqrt()
}

impl QuadTree {
    /// Smallest node containing `(x, y)` whose side length exceeds `radius`.
    ///
    /// Descent stops at a leaf, or at a node whose children are no larger
    /// than `radius`. The root is returned if even it is not larger.
    pub fn search_space(&self, x: f64, y: f64, radius: f64) -> NodeId {
        let mut id = Self::ROOT;
        loop {
            let node = self.node(id);
            let Some(children) = node.children else {
                return id;
            };
            if self.node(children[0]).size <= radius {
                return id;
            }
            id = children[node.quadrant(x, y).index()];
        }
    }

    /// Linked neighbors of `id` that, together with `id` itself, make up its
    /// search neighborhood: same-level nodes and shallower leaves.
    ///
    /// Their subtrees are disjoint and cover every point within `size(id)`
    /// of the cell.
    pub fn search_neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let level = self.node(id).level;
        self.node(id)
            .neighbors
            .iter()
            .filter(move |n| self.node(*n).level <= level)
    }

    /// Cheap pre-scan bound on the points reachable from `id`'s neighborhood.
    ///
    /// Approximate: it counts everything in the neighborhood, so it can
    /// overstate the true match count by a wide factor.
    pub fn candidate_estimate(&self, id: NodeId) -> usize {
        self.node(id).entity_count
            + self
                .search_neighbors(id)
                .map(|n| self.node(n).entity_count)
                .sum::<usize>()
    }

    /// Non-empty leaves a query at `(x, y, radius)` would scan.
    pub fn candidate_cells(&self, x: f64, y: f64, radius: f64) -> Vec<NodeId> {
        self.neighborhood_leaves(self.search_space(x, y, radius))
    }

    fn neighborhood_leaves(&self, id: NodeId) -> Vec<NodeId> {
        std::iter::once(id)
            .chain(self.search_neighbors(id))
            .flat_map(|root| self.leaves(root))
            .filter(|leaf| !self.node(*leaf).points.is_empty())
            .collect()
    }

    /// All points within `radius` of `(x, y)`, nearest first.
    ///
    /// If `limit` is given and the candidate estimate exceeds it, the query
    /// fails with [`GeoStoreError::CandidateOverflow`] before any point is
    /// scanned. Ties in distance are broken by x then y.
    pub fn find(&self, x: f64, y: f64, radius: f64, limit: Option<usize>) -> Result<QueryResult> {
        let search = self.search_space(x, y, radius);
        let estimate = self.candidate_estimate(search);

        if let Some(limit) = limit
            && estimate > limit
        {
            return Err(GeoStoreError::CandidateOverflow { estimate, limit });
        }

        let cells = self.neighborhood_leaves(search);
        let mut entities: Vec<Match> = cells
            .iter()
            .flat_map(|leaf| self.node(*leaf).points.iter())
            .filter_map(|point| {
                let distance = distance_to(point, x, y);
                (distance <= radius).then_some(Match {
                    distance,
                    point: *point,
                })
            })
            .collect();

        entities.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.point.x().total_cmp(&b.point.x()))
                .then_with(|| a.point.y().total_cmp(&b.point.y()))
        });

        log::trace!(
            "Radius query ({}, {}, {}) searched {:?}: estimate {}, {} cells, {} matches",
            x,
            y,
            radius,
            search,
            estimate,
            cells.len(),
            entities.len()
        );

        Ok(QueryResult {
            estimate,
            cells_visited: cells.len(),
            match_count: entities.len(),
            entities,
        })
    }

    /// Minimum distance from `(x, y)` to any point under `id`.
    ///
    /// Linear in the subtree size; meant for single leaves, not large
    /// subtrees. `None` if the subtree holds no points.
    pub fn min_entity_dist(&self, id: NodeId, x: f64, y: f64) -> Option<f64> {
        self.entities_under(id)
            .map(|p| distance_to(&p, x, y))
            .min_by(f64::total_cmp)
    }
}
