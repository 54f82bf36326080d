mod common;

use battlegrid::grid::{MATRIX_BLOCK, MATRIX_LAVA, MATRIX_WATER};
use battlegrid::{Cell, MoveProfile, PathHelper};
use common::{empty_matrix, seeded_rng, settings, uniform_aggr};

const EPS: f64 = 1e-6;

fn helper(grid_size: i32) -> PathHelper {
    PathHelper::new(settings(grid_size))
}

#[test]
fn two_steps_on_open_board() {
    let helper = helper(9);
    let matrix = empty_matrix(9);
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        2,
        None,
        &MoveProfile::default(),
        &mut rng,
    );

    // One diagonal (sqrt 2) plus one orthogonal step already exceeds 2, so
    // the reachable set is the 8 neighbors plus the 4 straight-line cells
    // at distance 2.
    assert_eq!(path.cells.len(), 12);
    for cell in [
        Cell::new(4, 2),
        Cell::new(4, 6),
        Cell::new(2, 4),
        Cell::new(6, 4),
        Cell::new(5, 5),
    ] {
        assert!(path.reachable.contains(&cell), "missing ({},{})", cell.x, cell.y);
    }
    assert!(!path.reachable.contains(&Cell::new(4, 1)));
    assert!(!path.reachable.contains(&Cell::new(6, 6)));
    assert!(!path.reachable.contains(&Cell::new(4, 4)), "origin must not be a destination");
}

#[test]
fn result_cells_are_row_major_sorted() {
    let helper = helper(9);
    let matrix = empty_matrix(9);
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        2,
        None,
        &MoveProfile::default(),
        &mut rng,
    );

    let mut sorted = path.cells.clone();
    sorted.sort_by_key(|c| (c.y, c.x));
    assert_eq!(path.cells, sorted);
    assert_eq!(path.cells.len(), path.reachable.len());
}

#[test]
fn zero_steps_reaches_nothing() {
    let helper = helper(9);
    let matrix = empty_matrix(9);
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        0,
        None,
        &MoveProfile::default(),
        &mut rng,
    );
    assert!(path.cells.is_empty());
    assert!(path.known_paths.is_empty());
}

#[test]
fn detour_around_single_block() {
    let helper = helper(9);
    let mut matrix = empty_matrix(9);
    matrix[4][5] = MATRIX_BLOCK;
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        4,
        None,
        &MoveProfile::default(),
        &mut rng,
    );

    assert!(!path.reachable.contains(&Cell::new(5, 4)));
    assert!(path.reachable.contains(&Cell::new(6, 4)));
    let best = &path.known_paths[&Cell::new(6, 4)][0];
    // Two diagonals around the block
    assert!((best.weight - 2.0 * std::f64::consts::SQRT_2).abs() < EPS);
}

#[test]
fn fully_enclosed_unit_cannot_move() {
    let helper = helper(9);
    let mut matrix = empty_matrix(9);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                matrix[(4 + dy) as usize][(4 + dx) as usize] = MATRIX_BLOCK;
            }
        }
    }
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        5,
        None,
        &MoveProfile::default(),
        &mut rng,
    );
    assert!(path.cells.is_empty());
    assert!(path.known_paths.is_empty());
}

#[test]
fn corner_cut_is_rejected() {
    let helper = helper(5);
    let mut matrix = empty_matrix(5);
    matrix[0][1] = MATRIX_BLOCK;
    matrix[1][0] = MATRIX_BLOCK;
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(0, 0),
        &matrix,
        3,
        None,
        &MoveProfile::default(),
        &mut rng,
    );

    // The only exit is the diagonal squeezed between two blocks
    assert!(!path.reachable.contains(&Cell::new(1, 1)));
    assert!(path.cells.is_empty());
}

#[test]
fn lava_needs_fire_immunity() {
    let helper = helper(5);
    let mut matrix = empty_matrix(5);
    matrix[2][2] = MATRIX_LAVA;
    let lava = Cell::new(2, 2);
    let origin = Cell::new(1, 2);

    let mut rng = seeded_rng();
    let walker = helper.get_move_path(origin, &matrix, 2, None, &MoveProfile::default(), &mut rng);
    assert!(!walker.reachable.contains(&lava));

    let fire_profile = MoveProfile {
        made_of_fire: true,
        ..MoveProfile::default()
    };
    let mut rng = seeded_rng();
    let fiery = helper.get_move_path(origin, &matrix, 2, None, &fire_profile, &mut rng);
    assert!(fiery.reachable.contains(&lava));
    assert!(fiery.known_paths[&lava][0].crossed_lava);
}

#[test]
fn water_needs_immunity() {
    let helper = helper(5);
    let mut matrix = empty_matrix(5);
    matrix[2][2] = MATRIX_WATER;
    let water = Cell::new(2, 2);
    let origin = Cell::new(1, 2);

    let mut rng = seeded_rng();
    let walker = helper.get_move_path(origin, &matrix, 2, None, &MoveProfile::default(), &mut rng);
    assert!(!walker.reachable.contains(&water));

    let swimmer = MoveProfile {
        water_immune: true,
        ..MoveProfile::default()
    };
    let mut rng = seeded_rng();
    let wet = helper.get_move_path(origin, &matrix, 2, None, &swimmer, &mut rng);
    assert!(wet.reachable.contains(&water));
    assert!(wet.known_paths[&water][0].crossed_water);

    // Water immunity does not cover lava
    let mut lava_board = empty_matrix(5);
    lava_board[2][2] = MATRIX_LAVA;
    let mut rng = seeded_rng();
    let on_lava = helper.get_move_path(origin, &lava_board, 2, None, &swimmer, &mut rng);
    assert!(!on_lava.reachable.contains(&water));
}

#[test]
fn flier_crosses_blocks_but_cannot_land_on_them() {
    let helper = helper(9);
    let mut matrix = empty_matrix(9);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                matrix[(4 + dy) as usize][(4 + dx) as usize] = MATRIX_BLOCK;
            }
        }
    }
    let fly_profile = MoveProfile {
        can_fly: true,
        ..MoveProfile::default()
    };
    let mut rng = seeded_rng();

    let path = helper.get_move_path(Cell::new(4, 4), &matrix, 2, None, &fly_profile, &mut rng);

    for cell in [
        Cell::new(4, 2),
        Cell::new(4, 6),
        Cell::new(2, 4),
        Cell::new(6, 4),
    ] {
        assert!(path.reachable.contains(&cell), "missing ({},{})", cell.x, cell.y);
    }
    // The ring itself is never a landing spot
    assert!(!path.reachable.contains(&Cell::new(4, 3)));
    assert!(!path.reachable.contains(&Cell::new(3, 3)));
}

#[test]
fn threatened_unit_still_gets_one_step() {
    let helper = helper(9);
    let matrix = empty_matrix(9);
    let aggr = uniform_aggr(9, 2);
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        2,
        Some(&aggr),
        &MoveProfile::default(),
        &mut rng,
    );

    // Orthogonal neighbors fit the budget at doubled cost; diagonal ones do
    // not and come back as guaranteed single-step routes at weight 1.
    let orth = &path.known_paths[&Cell::new(5, 4)][0];
    assert!((orth.weight - 2.0).abs() < EPS);
    let diag = &path.known_paths[&Cell::new(5, 5)][0];
    assert!((diag.weight - 1.0).abs() < EPS);

    assert!(!path.reachable.contains(&Cell::new(6, 4)));

    // Fliers ignore the aggression weighting entirely
    let fly_profile = MoveProfile {
        can_fly: true,
        ..MoveProfile::default()
    };
    let mut rng = seeded_rng();
    let flier = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        2,
        Some(&aggr),
        &fly_profile,
        &mut rng,
    );
    assert!(flier.reachable.contains(&Cell::new(6, 4)));
}

#[test]
fn aggression_penalty_is_paid_once() {
    let helper = helper(9);
    let matrix = empty_matrix(9);
    let mut aggr = uniform_aggr(9, 1);
    aggr[4][5] = 2;
    aggr[4][6] = 2;
    let mut rng = seeded_rng();

    let path = helper.get_move_path(
        Cell::new(4, 4),
        &matrix,
        3,
        Some(&aggr),
        &MoveProfile::default(),
        &mut rng,
    );

    // Paying the doubled first step up front and walking straight through
    // the threatened lane beats skirting around it.
    let best = &path.known_paths[&Cell::new(6, 4)][0];
    assert!((best.weight - 3.0).abs() < EPS);
    assert_eq!(best.cells, vec![Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)]);
    assert!(best.first_aggr_met);
}

#[test]
fn can_stand_at_checks_whole_footprint() {
    let helper = helper(9);
    let mut matrix = empty_matrix(9);
    matrix[3][5] = MATRIX_BLOCK;

    let small = MoveProfile::default();
    assert!(helper.can_stand_at(&matrix, Cell::new(4, 4), &small));
    assert!(!helper.can_stand_at(&matrix, Cell::new(5, 3), &small));

    let large = MoveProfile {
        small: false,
        ..MoveProfile::default()
    };
    // (5,4) anchors a 2x2 box covering the blocked (5,3)
    assert!(!helper.can_stand_at(&matrix, Cell::new(5, 4), &large));
    assert!(helper.can_stand_at(&matrix, Cell::new(4, 4), &large));
}

#[test]
fn square_within_bounds_uses_unit_size() {
    let helper = helper(16);
    let mid = 512.0;
    assert!(helper.square_within_bounds(mid, mid, true));
    assert!(helper.square_within_bounds(mid, mid, false));
    // A cell-sized square centered on the border hangs off the board
    assert!(!helper.square_within_bounds(0.0, mid, true));
    // Near the corner a 1x1 still fits where a 2x2 does not
    assert!(helper.square_within_bounds(34.0, 34.0, true));
    assert!(!helper.square_within_bounds(34.0, 34.0, false));
}
