//! Structural and query tests for the neighbor-linked quadtree.

use super::*;
use crate::error::GeoStoreError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_SIZE: f64 = 1.0 / 16_777_216.0;

fn world() -> QuadTree {
    QuadTree::new(Bounds::new(0.0, 0.0, 256.0, 256.0), 2, MIN_SIZE)
}

fn child(tree: &QuadTree, id: NodeId, quadrant: Quadrant) -> NodeId {
    tree.node(id)
        .child(quadrant)
        .expect("node should have been split")
}

fn search_neighbors(tree: &QuadTree, id: NodeId) -> Vec<NodeId> {
    tree.search_neighbors(id).collect()
}

/// Every stored neighbor link must match the linking rule and vice versa.
fn assert_links_consistent(tree: &QuadTree) {
    let cells = tree.all_cells();
    for &a in &cells {
        for &b in &cells {
            if a == b {
                continue;
            }
            let stored = tree.node(a).neighbors().contains(b);
            assert_eq!(
                stored,
                tree.should_link(a, b),
                "link {:?} -> {:?} disagrees with the linking rule",
                a,
                b
            );
            assert_eq!(
                stored,
                tree.node(b).neighbors().contains(a),
                "link {:?} <-> {:?} is not symmetric",
                a,
                b
            );
            assert_eq!(tree.is_neighbor(a, b), tree.is_neighbor(b, a));
        }
    }
}

fn brute_force(points: &[Point<f64>], x: f64, y: f64, radius: f64) -> Vec<(f64, f64, f64)> {
    let mut out: Vec<(f64, f64, f64)> = points
        .iter()
        .map(|p| (query::distance_to(p, x, y), p.x(), p.y()))
        .filter(|(d, _, _)| *d <= radius)
        .collect();
    out.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| a.2.total_cmp(&b.2))
    });
    out
}

#[test]
fn test_split_tiles_parent() {
    let mut tree = world();
    assert!(tree.split(QuadTree::ROOT));

    let root = tree.root();
    let children = *root.children().unwrap();
    assert!(root.points().is_empty());
    assert!(!root.is_leaf());

    let mut area = 0.0;
    for (i, id) in children.iter().enumerate() {
        let node = tree.node(*id);
        assert_eq!(node.level(), 1);
        assert_eq!(node.parent(), Some(QuadTree::ROOT));
        assert_eq!(node.bounds(), root.child_bounds(Quadrant::ALL[i]));
        area += node.bounds().width() * node.bounds().height();
    }
    assert_eq!(area, 256.0 * 256.0);

    // No two children overlap in their interiors.
    for a in children {
        for b in children {
            if a == b {
                continue;
            }
            let (ba, bb) = (tree.node(a).bounds(), tree.node(b).bounds());
            let overlap_x = ba.x0.max(bb.x0) < ba.x1.min(bb.x1);
            let overlap_y = ba.y0.max(bb.y0) < ba.y1.min(bb.y1);
            assert!(!(overlap_x && overlap_y));
        }
    }
}

#[test]
fn test_split_twice_is_noop() {
    let mut tree = world();
    assert!(tree.split(QuadTree::ROOT));
    let cells = tree.cell_count();
    assert!(!tree.split(QuadTree::ROOT));
    assert_eq!(tree.cell_count(), cells);
}

#[test]
fn test_split_neighbor_sets() {
    let mut tree = world();
    tree.split(QuadTree::ROOT);
    let c0 = child(&tree, QuadTree::ROOT, Quadrant::NorthEast);
    let c1 = child(&tree, QuadTree::ROOT, Quadrant::NorthWest);
    let c2 = child(&tree, QuadTree::ROOT, Quadrant::SouthWest);
    let c3 = child(&tree, QuadTree::ROOT, Quadrant::SouthEast);
    assert_eq!(tree.node(c1).neighbors().len(), 3);

    tree.split(c1);
    let c13 = child(&tree, c1, Quadrant::SouthEast);
    assert_eq!(tree.node(c13).neighbors().len(), 6);
    for other in [
        c0,
        c3,
        c2,
        child(&tree, c1, Quadrant::NorthEast),
        child(&tree, c1, Quadrant::NorthWest),
        child(&tree, c1, Quadrant::SouthWest),
    ] {
        assert!(tree.is_neighbor(c13, other));
        assert!(tree.node(c13).neighbors().contains(other));
    }

    tree.split(c13);
    let c132 = child(&tree, c13, Quadrant::SouthWest);
    let c133 = child(&tree, c13, Quadrant::SouthEast);
    assert_eq!(tree.node(c132).neighbors().len(), 5);
    for other in [
        child(&tree, c13, Quadrant::NorthEast),
        child(&tree, c13, Quadrant::NorthWest),
        c133,
        child(&tree, c1, Quadrant::SouthWest),
        c2,
    ] {
        assert!(tree.node(c132).neighbors().contains(other));
    }

    tree.split(c0);
    let c02 = child(&tree, c0, Quadrant::SouthWest);
    // The leaf also links the deeper cells along its west edge; its search
    // neighborhood is the seven cells at its own level or shallower leaves.
    assert_eq!(tree.node(c02).neighbors().len(), 9);
    assert_eq!(search_neighbors(&tree, c02).len(), 7);
    for other in [
        child(&tree, c1, Quadrant::NorthEast),
        c13,
        c2,
        c3,
    ] {
        assert!(search_neighbors(&tree, c02).contains(&other));
    }
    assert!(tree.node(c02).neighbors().contains(c133));
    assert!(!search_neighbors(&tree, c02).contains(&c133));

    tree.split(c3);
    let c31 = child(&tree, c3, Quadrant::NorthWest);
    tree.split(c31);
    let c311 = child(&tree, c31, Quadrant::NorthWest);
    let neighborhood = search_neighbors(&tree, c311);
    assert_eq!(neighborhood.len(), 6);
    assert!(neighborhood.contains(&c133));
    assert!(neighborhood.contains(&c02));
    assert!(neighborhood.contains(&c2));

    assert_links_consistent(&tree);
}

#[test]
fn test_split_replaces_parent_in_deeper_neighbors() {
    let mut tree = world();
    tree.split(QuadTree::ROOT);
    let c0 = child(&tree, QuadTree::ROOT, Quadrant::NorthEast);
    let c1 = child(&tree, QuadTree::ROOT, Quadrant::NorthWest);
    tree.split(c1);
    let c10 = child(&tree, c1, Quadrant::NorthEast);
    assert!(tree.node(c10).neighbors().contains(c0));

    tree.split(c0);
    // c10 is deeper than c0, so the now-internal c0 is swapped for its
    // adjacent children.
    assert!(!tree.node(c10).neighbors().contains(c0));
    assert!(!tree.node(c0).neighbors().contains(c10));
    let c01 = child(&tree, c0, Quadrant::NorthWest);
    let c02 = child(&tree, c0, Quadrant::SouthWest);
    assert!(tree.node(c10).neighbors().contains(c01));
    assert!(tree.node(c10).neighbors().contains(c02));
    assert!(!tree.node(c10).neighbors().contains(child(&tree, c0, Quadrant::NorthEast)));
    assert_links_consistent(&tree);
}

#[test]
fn test_all_cells() {
    let mut tree = world();
    tree.split(QuadTree::ROOT);
    let c1 = child(&tree, QuadTree::ROOT, Quadrant::NorthWest);
    tree.split(c1);
    tree.split(child(&tree, c1, Quadrant::NorthEast));

    let cells = tree.all_cells();
    assert_eq!(cells.len(), 13);
    assert_eq!(cells[0], QuadTree::ROOT);
    assert_eq!(tree.cells().len(), 13);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn test_add() {
    let mut tree = world();
    tree.insert(Point::new(10.0, 10.0));
    tree.insert(Point::new(10.0, 10.0));
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.root().entity_count(), 2);

    tree.insert(Point::new(65.0, 65.0));
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.root().entity_count(), 3);
    let nw = child(&tree, QuadTree::ROOT, Quadrant::NorthWest);
    // Redistribution does not cascade: the NW child holds all three points.
    assert_eq!(tree.node(nw).entity_count(), 3);
    assert_eq!(tree.node(nw).points().len(), 3);
    for q in [Quadrant::NorthEast, Quadrant::SouthWest, Quadrant::SouthEast] {
        assert_eq!(tree.node(child(&tree, QuadTree::ROOT, q)).entity_count(), 0);
    }

    tree.insert(Point::new(66.0, 66.0));
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.root().entity_count(), 4);
    let nw_nw = child(&tree, nw, Quadrant::NorthWest);
    let nw_se = child(&tree, nw, Quadrant::SouthEast);
    assert_eq!(tree.node(nw_nw).entity_count(), 2);
    assert_eq!(tree.node(nw_nw).points(), &[Point::new(10.0, 10.0); 2]);
    assert_eq!(tree.node(nw_se).entity_count(), 2);

    tree.insert(Point::new(67.0, 67.0));
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.root().entity_count(), 5);
}

#[test]
fn test_min_entity_dist() {
    let mut tree = world();
    tree.insert(Point::new(10.0, 10.0));
    tree.insert(Point::new(10.0, 10.0));
    tree.insert(Point::new(65.0, 65.0));

    assert_eq!(tree.min_entity_dist(QuadTree::ROOT, 10.0, 10.0), Some(0.0));
    assert_eq!(tree.min_entity_dist(QuadTree::ROOT, 10.0, 11.0), Some(1.0));

    let ne = child(&tree, QuadTree::ROOT, Quadrant::NorthEast);
    assert_eq!(tree.min_entity_dist(ne, 10.0, 10.0), None);
}

fn regression_tree() -> QuadTree {
    let mut tree = world();
    for (x, y) in [
        (10.0, 10.0),
        (10.0, 10.0),
        (65.0, 65.0),
        (66.0, 66.0),
        (67.0, 67.0),
        (127.0, 127.0),
        (129.0, 129.0),
        (67.0, 127.0),
        (68.0, 129.0),
    ] {
        tree.insert(Point::new(x, y));
    }
    tree
}

#[test]
fn test_find() {
    let tree = regression_tree();

    let result = tree.find(10.0, 10.0, 0.1, None).unwrap();
    assert_eq!(result.match_count, 2);
    assert_eq!(result.entities.len(), 2);
    for m in &result.entities {
        assert_eq!(m.distance, 0.0);
        assert_eq!(m.point, Point::new(10.0, 10.0));
    }

    let one = tree.find(63.0, 63.0, 2.0 * 2f64.sqrt(), None).unwrap();
    assert_eq!(one.match_count, 1);
    assert_eq!(one.entities[0].point, Point::new(65.0, 65.0));

    let two = tree.find(63.0, 63.0, 3.0 * 2f64.sqrt(), None).unwrap();
    assert_eq!(two.match_count, 2);
    assert_eq!(two.entities[1].point, Point::new(66.0, 66.0));
    assert!(two.entities[0].distance <= two.entities[1].distance);
}

#[test]
fn test_find_reports_scan_metadata() {
    let tree = regression_tree();
    let result = tree.find(10.0, 10.0, 0.1, None).unwrap();
    assert_eq!(result.estimate, 7);
    assert_eq!(result.cells_visited, 4);
    assert_eq!(tree.candidate_cells(10.0, 10.0, 0.1).len(), result.cells_visited);
}

#[test]
fn test_find_limit() {
    let tree = regression_tree();
    let search = tree.search_space(63.0, 63.0, 3.0);
    let estimate = tree.candidate_estimate(search);

    let err = tree.find(63.0, 63.0, 3.0, Some(estimate - 1)).unwrap_err();
    match err {
        GeoStoreError::CandidateOverflow {
            estimate: e,
            limit,
        } => {
            assert_eq!(e, estimate);
            assert_eq!(limit, estimate - 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    let ok = tree.find(63.0, 63.0, 3.0, Some(estimate)).unwrap();
    assert_eq!(ok.estimate, estimate);
}

#[test]
fn test_search_space() {
    let tree = regression_tree();
    // Large radius: the root's children are not wider than 200.
    assert_eq!(tree.search_space(10.0, 10.0, 200.0), QuadTree::ROOT);

    let small = tree.search_space(10.0, 10.0, 1.0);
    let node = tree.node(small);
    assert!(node.is_leaf());
    assert!(node.size() > 1.0);
    assert!(node.bounds().contains(10.0, 10.0));

    let mid = tree.search_space(66.0, 66.0, 40.0);
    let node = tree.node(mid);
    assert!(node.size() > 40.0);
    if let Some(children) = node.children() {
        assert!(tree.node(children[0]).size() <= 40.0);
    }
}

#[test]
fn test_saturated_leaf_keeps_points() {
    let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 1.0, 1.0), 2, 0.5);
    for _ in 0..10 {
        tree.insert(Point::new(0.2, 0.2));
    }
    // Root splits once (size 1 > 0.5); its children have size 0.5 and stop.
    assert_eq!(tree.depth(), 1);
    let nw = child(&tree, QuadTree::ROOT, Quadrant::NorthWest);
    assert_eq!(tree.node(nw).points().len(), 10);
    assert_eq!(tree.len(), 10);
}

#[test]
fn test_duplicates_are_distinct() {
    let mut tree = world();
    for _ in 0..5 {
        tree.insert(Point::new(100.0, 100.0));
    }
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.all_entities().len(), 5);
    assert_eq!(tree.find(100.0, 100.0, 0.0, None).unwrap().match_count, 5);
}

#[test]
fn test_entity_count_matches_insertions() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = world();
    for i in 1..=500 {
        tree.insert(Point::new(rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0)));
        assert_eq!(tree.root().entity_count(), i);
    }

    for id in tree.all_cells() {
        let node = tree.node(id);
        let below = match node.children() {
            Some(children) => children.iter().map(|c| tree.node(*c).entity_count()).sum(),
            None => node.points().len(),
        };
        assert_eq!(node.entity_count(), below);
        if !node.is_leaf() {
            assert!(node.points().is_empty());
        }
    }
}

#[test]
fn test_random_splits_keep_links_consistent() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let mut tree = world();
        for _ in 0..40 {
            let leaves = tree.leaves(QuadTree::ROOT);
            let pick = leaves[rng.gen_range(0..leaves.len())];
            assert!(tree.split(pick));
        }
        assert_links_consistent(&tree);
    }
}

#[test]
fn test_random_inserts_keep_links_consistent() {
    let mut rng = StdRng::seed_from_u64(29);
    let mut tree = QuadTree::new(Bounds::new(-100.0, -50.0, 100.0, 350.0), 1, MIN_SIZE);
    for _ in 0..150 {
        let x = (rng.gen_range(-100.0..100.0_f64) / 8.0).floor() * 8.0;
        let y = (rng.gen_range(-50.0..350.0_f64) / 8.0).floor() * 8.0;
        tree.insert(Point::new(x, y));
    }
    assert_links_consistent(&tree);
}

#[test]
fn test_find_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    for threshold in [1, 2, 4] {
        let mut tree = QuadTree::new(Bounds::new(0.0, 0.0, 256.0, 256.0), threshold, MIN_SIZE);
        let mut points = Vec::new();
        for i in 0..400 {
            // Half uniform, half clustered, plus snapped points on split lines.
            let point = match i % 3 {
                0 => Point::new(rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0)),
                1 => Point::new(rng.gen_range(50.0..70.0), rng.gen_range(190.0..210.0)),
                _ => Point::new(
                    (rng.gen_range(0.0..256.0_f64) / 16.0).floor() * 16.0,
                    (rng.gen_range(0.0..256.0_f64) / 16.0).floor() * 16.0,
                ),
            };
            tree.insert(point);
            points.push(point);
        }

        for _ in 0..200 {
            let (x, y) = if rng.gen_bool(0.3) {
                let p = points[rng.gen_range(0..points.len())];
                (p.x(), p.y())
            } else {
                (rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0))
            };
            let radius = [0.0, 0.5, 3.0, 16.0, 33.0, 64.0, 100.0, 300.0][rng.gen_range(0..8)];

            let found: Vec<(f64, f64, f64)> = tree
                .find(x, y, radius, None)
                .unwrap()
                .entities
                .iter()
                .map(|m| (m.distance, m.point.x(), m.point.y()))
                .collect();
            assert_eq!(found, brute_force(&points, x, y, radius), "query ({x}, {y}, {radius})");
        }
    }
}

#[test]
fn test_search_neighborhood_is_disjoint() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut tree = world();
    for _ in 0..300 {
        tree.insert(Point::new(rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0)));
    }
    for _ in 0..100 {
        let (x, y) = (rng.gen_range(0.0..256.0), rng.gen_range(0.0..256.0));
        let search = tree.search_space(x, y, rng.gen_range(0.0..50.0));
        let mut leaves: Vec<NodeId> = std::iter::once(search)
            .chain(tree.search_neighbors(search))
            .flat_map(|id| tree.leaves(id))
            .collect();
        let total = leaves.len();
        leaves.sort_unstable();
        leaves.dedup();
        assert_eq!(leaves.len(), total);
    }
}

#[test]
fn test_search_neighbors_never_deeper() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut tree = world();
    for _ in 0..200 {
        tree.insert(Point::new(rng.gen_range(0.0..128.0), rng.gen_range(0.0..128.0)));
    }
    for id in tree.all_cells() {
        let level = tree.node(id).level();
        for n in tree.search_neighbors(id) {
            let neighbor = tree.node(n);
            assert!(neighbor.level() <= level);
            assert!(neighbor.level() == level || neighbor.is_leaf());
        }
    }
}
