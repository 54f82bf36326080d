use crate::grid::{Matrix, MATRIX_BLOCK, MATRIX_EMPTY, MATRIX_LAVA, MATRIX_WATER};
use crate::grid_math::{footprint_cells, Cell};
use crate::settings::GridSettings;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};

// Trace logging flag - set to true to enable debug output
const TRACE_MOVE_PATH: bool = false;

pub const ORTHOGONAL_STEP_WEIGHT: f64 = 1.0;
pub const DIAGONAL_STEP_WEIGHT: f64 = std::f64::consts::SQRT_2;

/// Tolerance for comparing route weights built from 1/sqrt(2) steps
const WEIGHT_EPS: f64 = 1e-6;

/// Movement traits of the unit a search runs for
#[derive(Debug, Clone, Copy)]
pub struct MoveProfile {
    /// 1x1 footprint when true, 2x2 when false
    pub small: bool,
    pub can_fly: bool,
    pub made_of_fire: bool,
    pub water_immune: bool,
}

impl Default for MoveProfile {
    fn default() -> Self {
        MoveProfile {
            small: true,
            can_fly: false,
            made_of_fire: false,
            water_immune: false,
        }
    }
}

/// A candidate path to one destination cell
#[derive(Debug, Clone)]
pub struct WeightedRoute {
    /// Cell sequence from the origin, destination last
    pub cells: Vec<Cell>,
    /// Cumulative movement cost
    pub weight: f64,
    /// Set once the first aggression-penalized step was paid for
    pub first_aggr_met: bool,
    pub crossed_lava: bool,
    pub crossed_water: bool,
}

impl WeightedRoute {
    fn seed(origin: Cell) -> Self {
        WeightedRoute {
            cells: vec![origin],
            weight: 0.0,
            first_aggr_met: false,
            crossed_lava: false,
            crossed_water: false,
        }
    }

    pub fn destination(&self) -> Option<Cell> {
        self.cells.last().copied()
    }
}

/// Full result of one reachability search, owned by the caller
#[derive(Debug, Clone)]
pub struct MovePath {
    /// Reachable destination cells, in row-major order
    pub cells: Vec<Cell>,
    pub reachable: HashSet<Cell>,
    /// All equal-best routes discovered per destination
    pub known_paths: HashMap<Cell, Vec<WeightedRoute>>,
}

impl MovePath {
    pub fn empty() -> Self {
        MovePath {
            cells: Vec::new(),
            reachable: HashSet::new(),
            known_paths: HashMap::new(),
        }
    }
}

/// Stateless pathfinding and placement queries, parameterized by the
/// coordinate system only. Safe to share between calls.
pub struct PathHelper {
    pub settings: GridSettings,
}

impl PathHelper {
    pub fn new(settings: GridSettings) -> Self {
        PathHelper { settings }
    }

    /// Check that a unit anchored at `cell` fits on the board.
    /// 2x2 units anchor on the max-x/max-y footprint cell, so their anchor
    /// needs one extra row and column of clearance on the trailing side.
    pub fn anchor_in_bounds(&self, cell: Cell, is_small_unit: bool) -> bool {
        let min = if is_small_unit { 0 } else { 1 };
        cell.x >= min
            && cell.y >= min
            && cell.x < self.settings.grid_size
            && cell.y < self.settings.grid_size
    }

    /// Candidate neighbor anchors of `cell`, skipping `visited` keys.
    /// With `include_edge_overhang` the bounds filter is skipped and the
    /// caller's later checks decide what survives.
    pub fn get_neighbor_cells(
        &self,
        cell: Cell,
        visited: &HashSet<Cell>,
        is_small_unit: bool,
        include_diagonals: bool,
        include_edge_overhang: bool,
    ) -> Vec<Cell> {
        let orthogonal = [(0, -1), (0, 1), (-1, 0), (1, 0)];
        let diagonal = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

        let keep = |n: Cell| {
            (include_edge_overhang || self.anchor_in_bounds(n, is_small_unit))
                && !visited.contains(&n)
        };
        let mut neighbors = Vec::with_capacity(8);
        for (dx, dy) in orthogonal {
            let n = cell.offset(dx, dy);
            if keep(n) {
                neighbors.push(n);
            }
        }
        if include_diagonals {
            for (dx, dy) in diagonal {
                let n = cell.offset(dx, dy);
                if keep(n) {
                    neighbors.push(n);
                }
            }
        }
        neighbors
    }

    /// Weighted reachability search bounded by `max_steps`.
    ///
    /// Returns every cell the unit can legally reach this turn together with
    /// all equal-best routes to each. `aggr_matrix` raises the cost of the
    /// first step into threatened cells; `rng` only breaks ties among
    /// equal-cost routes.
    pub fn get_move_path(
        &self,
        current_cell: Cell,
        matrix: &Matrix,
        max_steps: u32,
        aggr_matrix: Option<&Matrix>,
        profile: &MoveProfile,
        rng: &mut impl Rng,
    ) -> MovePath {
        if !self.anchor_in_bounds(current_cell, profile.small) {
            return MovePath::empty();
        }

        let origin_footprint = footprint_cells(current_cell, profile.small);
        let budget = max_steps as f64;
        let no_visited: HashSet<Cell> = HashSet::new();

        let mut known_paths: HashMap<Cell, Vec<WeightedRoute>> = HashMap::new();
        let mut visited: HashSet<Cell> = HashSet::new();
        let mut queue: VecDeque<WeightedRoute> = VecDeque::new();
        queue.push_back(WeightedRoute::seed(current_cell));

        while let Some(route) = queue.pop_front() {
            let Some(cur) = route.destination() else {
                continue;
            };

            // A better route to this cell was captured after this one was
            // queued; its expansion would propagate stale weights.
            let best_here = known_paths
                .get(&cur)
                .and_then(|routes| routes.first())
                .map(|r| r.weight)
                .unwrap_or(0.0);
            if route.weight > best_here + WEIGHT_EPS {
                continue;
            }
            if !visited.insert(cur) && cur != current_cell {
                continue;
            }

            let remaining = budget - route.weight;
            if TRACE_MOVE_PATH {
                println!(
                    "[move_path] expand ({},{}) weight={:.3} remaining={:.3}",
                    cur.x, cur.y, route.weight, remaining
                );
            }

            for neighbor in self.get_neighbor_cells(cur, &no_visited, profile.small, true, false) {
                let dx = neighbor.x - cur.x;
                let dy = neighbor.y - cur.y;
                let diagonal = dx != 0 && dy != 0;

                let target_footprint = footprint_cells(neighbor, profile.small);
                if !self.footprint_passable(matrix, &target_footprint, &origin_footprint, profile) {
                    continue;
                }
                if diagonal
                    && self.corner_cut_blocked(matrix, cur, dx, dy, &origin_footprint, profile)
                {
                    continue;
                }

                let base = if diagonal {
                    DIAGONAL_STEP_WEIGHT
                } else {
                    ORTHOGONAL_STEP_WEIGHT
                };
                let mut cost = base;
                let mut aggr_met = route.first_aggr_met;
                if !profile.can_fly && !route.first_aggr_met {
                    if let Some(aggr) = aggr_matrix {
                        let factor = mean_aggression(aggr, &target_footprint);
                        if factor > 1.0 + WEIGHT_EPS {
                            cost *= factor;
                            aggr_met = true;
                        }
                    }
                }
                if remaining + self.settings.movement_delta < cost {
                    continue;
                }

                let mut next = route.clone();
                next.cells.push(neighbor);
                next.weight += cost;
                next.first_aggr_met = aggr_met;
                next.crossed_lava |= footprint_touches(matrix, &target_footprint, MATRIX_LAVA);
                next.crossed_water |= footprint_touches(matrix, &target_footprint, MATRIX_WATER);

                let expandable = !visited.contains(&neighbor);
                if capture_route(&mut known_paths, next.clone(), rng) && expandable {
                    queue.push_back(next);
                }
            }
        }

        self.inject_origin_neighbors(
            &mut known_paths,
            current_cell,
            matrix,
            max_steps,
            &origin_footprint,
            profile,
            rng,
        );
        self.filter_unallowed_destinations(
            &mut known_paths,
            current_cell,
            matrix,
            &origin_footprint,
            profile,
        );

        let mut cells: Vec<Cell> = known_paths.keys().copied().collect();
        cells.sort_by_key(|c| (c.y, c.x));
        let reachable: HashSet<Cell> = cells.iter().copied().collect();

        if TRACE_MOVE_PATH {
            println!(
                "[move_path] ({},{}) steps={} -> {} reachable cells",
                current_cell.x,
                current_cell.y,
                max_steps,
                cells.len()
            );
        }

        MovePath {
            cells,
            reachable,
            known_paths,
        }
    }

    /// Can the unit legally end its move anchored on `cell`
    pub fn can_stand_at(&self, matrix: &Matrix, cell: Cell, profile: &MoveProfile) -> bool {
        if !self.anchor_in_bounds(cell, profile.small) {
            return false;
        }
        let footprint = footprint_cells(cell, profile.small);
        footprint
            .iter()
            .all(|&c| self.cell_landable(matrix, c, &[], profile))
    }

    /// Setup-time placement check: a unit square centered at a world
    /// position must fit inside the board bounds, shrunk by the tolerance
    /// delta so borderline drops still count.
    pub fn square_within_bounds(&self, x: f32, y: f32, is_small_unit: bool) -> bool {
        let size = if is_small_unit {
            self.settings.cell_size
        } else {
            self.settings.cell_size * 2.0
        };
        let half = (size - self.settings.unit_size_delta) / 2.0;
        x - half >= self.settings.min_x
            && x + half <= self.settings.max_x
            && y - half >= self.settings.min_y
            && y + half <= self.settings.max_y
    }

    /// Origin neighbors the weighted search never produced are still legal
    /// single-step moves; a unit may always take one step regardless of the
    /// aggression weighting.
    #[allow(clippy::too_many_arguments)]
    fn inject_origin_neighbors(
        &self,
        known_paths: &mut HashMap<Cell, Vec<WeightedRoute>>,
        origin: Cell,
        matrix: &Matrix,
        max_steps: u32,
        origin_footprint: &[Cell],
        profile: &MoveProfile,
        rng: &mut impl Rng,
    ) {
        if max_steps < 1 {
            return;
        }
        let no_visited: HashSet<Cell> = HashSet::new();
        for neighbor in self.get_neighbor_cells(origin, &no_visited, profile.small, true, false) {
            if known_paths.contains_key(&neighbor) {
                continue;
            }
            let dx = neighbor.x - origin.x;
            let dy = neighbor.y - origin.y;
            if dx != 0
                && dy != 0
                && self.corner_cut_blocked(matrix, origin, dx, dy, origin_footprint, profile)
            {
                continue;
            }
            let footprint = footprint_cells(neighbor, profile.small);
            let landable = footprint
                .iter()
                .all(|&c| self.cell_landable(matrix, c, origin_footprint, profile));
            if !landable {
                continue;
            }

            let route = WeightedRoute {
                cells: vec![origin, neighbor],
                weight: 1.0,
                first_aggr_met: false,
                crossed_lava: footprint_touches(matrix, &footprint, MATRIX_LAVA),
                crossed_water: footprint_touches(matrix, &footprint, MATRIX_WATER),
            };
            capture_route(known_paths, route, rng);
        }
    }

    /// Defensive final pass: re-validate every candidate destination against
    /// the literal matrix before returning it.
    fn filter_unallowed_destinations(
        &self,
        known_paths: &mut HashMap<Cell, Vec<WeightedRoute>>,
        origin: Cell,
        matrix: &Matrix,
        origin_footprint: &[Cell],
        profile: &MoveProfile,
    ) {
        known_paths.retain(|&dest, _| {
            if dest == origin {
                return false;
            }
            footprint_cells(dest, profile.small)
                .iter()
                .all(|&c| self.cell_landable(matrix, c, origin_footprint, profile))
        });
    }

    /// Can a single cell be moved through
    fn cell_passable(
        &self,
        matrix: &Matrix,
        cell: Cell,
        origin_footprint: &[Cell],
        profile: &MoveProfile,
    ) -> bool {
        if origin_footprint.contains(&cell) {
            return true;
        }
        match matrix_at(matrix, cell) {
            MATRIX_EMPTY => true,
            MATRIX_LAVA => profile.made_of_fire,
            MATRIX_WATER => profile.water_immune,
            // Blocks, holes and other units can be overflown but never
            // walked through
            _ => profile.can_fly,
        }
    }

    /// Can a single cell be ended on; stricter than traversal for fliers
    fn cell_landable(
        &self,
        matrix: &Matrix,
        cell: Cell,
        origin_footprint: &[Cell],
        profile: &MoveProfile,
    ) -> bool {
        if origin_footprint.contains(&cell) {
            return true;
        }
        match matrix_at(matrix, cell) {
            MATRIX_EMPTY => true,
            MATRIX_LAVA => profile.made_of_fire,
            MATRIX_WATER => profile.water_immune,
            _ => false,
        }
    }

    fn footprint_passable(
        &self,
        matrix: &Matrix,
        footprint: &[Cell],
        origin_footprint: &[Cell],
        profile: &MoveProfile,
    ) -> bool {
        footprint
            .iter()
            .all(|&c| self.cell_passable(matrix, c, origin_footprint, profile))
    }

    /// A diagonal step is forbidden when both orthogonal cells flanking the
    /// diagonal are impassable, preventing a squeeze through the gap.
    fn corner_cut_blocked(
        &self,
        matrix: &Matrix,
        from: Cell,
        dx: i32,
        dy: i32,
        origin_footprint: &[Cell],
        profile: &MoveProfile,
    ) -> bool {
        let flank_a = from.offset(dx, 0);
        let flank_b = from.offset(0, dy);
        let open = |flank: Cell| {
            self.anchor_in_bounds(flank, profile.small)
                && self.footprint_passable(
                    matrix,
                    &footprint_cells(flank, profile.small),
                    origin_footprint,
                    profile,
                )
        };
        !open(flank_a) && !open(flank_b)
    }
}

/// Keep a route only when it is at least as good as the best known route to
/// its destination. Strictly better routes replace previous entries; ties are
/// inserted at a random position so no alternative is systematically favored.
fn capture_route(
    known_paths: &mut HashMap<Cell, Vec<WeightedRoute>>,
    route: WeightedRoute,
    rng: &mut impl Rng,
) -> bool {
    let Some(dest) = route.destination() else {
        return false;
    };
    match known_paths.get_mut(&dest) {
        None => {
            known_paths.insert(dest, vec![route]);
            true
        }
        Some(existing) => {
            let best = existing.first().map(|r| r.weight).unwrap_or(f64::MAX);
            if route.weight + WEIGHT_EPS < best {
                existing.clear();
                existing.push(route);
                true
            } else if (route.weight - best).abs() <= WEIGHT_EPS {
                let slot = rng.gen_range(0..=existing.len());
                existing.insert(slot, route);
                true
            } else {
                false
            }
        }
    }
}

fn matrix_at(matrix: &Matrix, cell: Cell) -> i32 {
    matrix
        .get(cell.y as usize)
        .and_then(|row| row.get(cell.x as usize))
        .copied()
        .unwrap_or(MATRIX_BLOCK)
}

fn footprint_touches(matrix: &Matrix, footprint: &[Cell], code: i32) -> bool {
    footprint.iter().any(|&c| matrix_at(matrix, c) == code)
}

/// Mean aggression over the cells a unit would occupy
fn mean_aggression(aggr: &Matrix, footprint: &[Cell]) -> f64 {
    if footprint.is_empty() {
        return 1.0;
    }
    let total: i32 = footprint
        .iter()
        .map(|&c| {
            aggr.get(c.y as usize)
                .and_then(|row| row.get(c.x as usize))
                .copied()
                .unwrap_or(1)
        })
        .sum();
    total as f64 / footprint.len() as f64
}

/// Format a route for display
pub fn format_route(route: &WeightedRoute) -> String {
    if route.cells.is_empty() {
        return "No route".to_string();
    }
    let mut result = String::new();
    for (i, cell) in route.cells.iter().enumerate() {
        if i > 0 {
            result.push_str(" -> ");
        }
        result.push_str(&format!("({},{})", cell.x, cell.y));
    }
    result.push_str(&format!(" [{:.3}]", route.weight));
    result
}
