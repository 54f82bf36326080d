mod common;

use battlegrid::grid::MATRIX_BLOCK;
use battlegrid::{Cell, MoveProfile, PathHelper};
use common::{empty_matrix, seeded_rng, settings};
use std::collections::HashSet;

fn large_profile() -> MoveProfile {
    MoveProfile {
        small: false,
        ..MoveProfile::default()
    }
}

#[test]
fn large_anchor_needs_trailing_clearance() {
    let helper = PathHelper::new(settings(10));
    assert!(helper.anchor_in_bounds(Cell::new(0, 0), true));
    assert!(!helper.anchor_in_bounds(Cell::new(0, 0), false));
    assert!(!helper.anchor_in_bounds(Cell::new(5, 0), false));
    assert!(helper.anchor_in_bounds(Cell::new(1, 1), false));
    assert!(helper.anchor_in_bounds(Cell::new(9, 9), false));
    assert!(!helper.anchor_in_bounds(Cell::new(10, 9), false));
}

#[test]
fn neighbor_anchors_respect_large_bounds() {
    let helper = PathHelper::new(settings(10));
    let visited = HashSet::new();

    let neighbors = helper.get_neighbor_cells(Cell::new(1, 1), &visited, false, true, false);
    assert_eq!(neighbors.len(), 3);
    for n in &neighbors {
        assert!(n.x >= 1 && n.y >= 1, "anchor ({},{}) hangs off the board", n.x, n.y);
    }
    assert!(neighbors.contains(&Cell::new(2, 1)));
    assert!(neighbors.contains(&Cell::new(1, 2)));
    assert!(neighbors.contains(&Cell::new(2, 2)));

    // With overhang allowed all 8 come back and the caller filters
    let overhang = helper.get_neighbor_cells(Cell::new(1, 1), &visited, false, true, true);
    assert_eq!(overhang.len(), 8);
    assert!(overhang.contains(&Cell::new(0, 1)));
}

#[test]
fn blocked_leading_edge_stops_a_large_step() {
    let helper = PathHelper::new(settings(10));
    let mut matrix = empty_matrix(10);
    matrix[3][5] = MATRIX_BLOCK;
    matrix[4][5] = MATRIX_BLOCK;
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        3,
        None,
        &large_profile(),
        &mut rng,
    );

    // Any anchor whose 2x2 box covers a blocked cell is out
    assert!(!path.reachable.contains(&Cell::new(5, 4)));
    assert!(!path.reachable.contains(&Cell::new(5, 3)));
    assert!(!path.reachable.contains(&Cell::new(6, 4)));
    // Stepping away from the blocks still works
    assert!(path.reachable.contains(&Cell::new(3, 4)));
    assert!(path.reachable.contains(&Cell::new(4, 5)));
    assert!(path.reachable.contains(&Cell::new(4, 6)));
}

#[test]
fn large_step_may_overlap_its_own_footprint() {
    let helper = PathHelper::new(settings(10));
    let mut matrix = empty_matrix(10);
    // The unit itself shows up in the occupancy matrix
    for cell in [Cell::new(4, 4), Cell::new(3, 4), Cell::new(4, 3), Cell::new(3, 3)] {
        matrix[cell.y as usize][cell.x as usize] = 2;
    }
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        1,
        None,
        &large_profile(),
        &mut rng,
    );

    // Every one-step shift overlaps the old placement and must be legal
    for anchor in [
        Cell::new(3, 4),
        Cell::new(5, 4),
        Cell::new(4, 3),
        Cell::new(4, 5),
        Cell::new(5, 5),
        Cell::new(3, 3),
    ] {
        assert!(
            path.reachable.contains(&anchor),
            "anchor ({},{}) should be reachable",
            anchor.x,
            anchor.y
        );
    }
}

#[test]
fn attack_anchors_ring_the_enemy() {
    let helper = PathHelper::new(settings(16));
    let mut reachable = HashSet::new();
    for y in 0..16 {
        for x in 0..16 {
            reachable.insert(Cell::new(x, y));
        }
    }
    let unit_cells = [Cell::new(3, 3), Cell::new(2, 3), Cell::new(3, 2), Cell::new(2, 2)];

    let anchors = helper.get_large_unit_attack_cells(&unit_cells, Cell::new(8, 8), &reachable);

    assert_eq!(anchors.len(), 12);
    for touching in [Cell::new(7, 7), Cell::new(10, 10), Cell::new(7, 8)] {
        assert!(anchors.contains(&touching), "missing anchor ({},{})", touching.x, touching.y);
    }
    // Anchors whose box would cover the enemy are excluded
    for overlapping in [Cell::new(8, 8), Cell::new(9, 8), Cell::new(8, 9), Cell::new(9, 9)] {
        assert!(!anchors.contains(&overlapping));
    }
}

#[test]
fn unreachable_attack_anchors_are_dropped() {
    let helper = PathHelper::new(settings(16));
    let unit_cells = [Cell::new(7, 7), Cell::new(6, 7), Cell::new(7, 6), Cell::new(6, 6)];
    let reachable: HashSet<Cell> = [Cell::new(7, 10)].into_iter().collect();

    let anchors = helper.get_large_unit_attack_cells(&unit_cells, Cell::new(8, 8), &reachable);

    // Only the reachable ring anchor and the unit's current anchor survive
    assert_eq!(anchors, vec![Cell::new(7, 7), Cell::new(7, 10)]);
}
