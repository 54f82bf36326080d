use crate::grid::Team;
use crate::grid_math::{
    chebyshev_distance, chebyshev_to_footprint, closest_cell_side, footprint_cells,
    project_to_grid_edge, Cell, CellSide,
};
use crate::path::PathHelper;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

impl PathHelper {
    /// Pick the attack-origin cell for a melee attack aimed with a pointer.
    ///
    /// `candidates` are the cells adjacent to the enemy the caller considers;
    /// they are filtered to Chebyshev distance `attack_range` of the target
    /// footprint (cells the attacker already stands on always qualify).
    /// A pointer inside the target footprint picks the geometrically closest
    /// candidate; outside, one of four directional heuristics keyed by the
    /// pointer's quadrant and the target's team picks the cell leading toward
    /// the pointer side. Large attackers resolve through the 2x2 anchors that
    /// can actually host them.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_closest_attack_from(
        &self,
        mouse: (f32, f32),
        candidates: &[Cell],
        attacker_cells: &[Cell],
        target_cells: &[Cell],
        attack_range: i32,
        target_team: Team,
        attacker_small: bool,
        reachable: &HashSet<Cell>,
        rng: &mut impl Rng,
    ) -> Option<Cell> {
        if candidates.is_empty() || target_cells.is_empty() {
            return None;
        }

        let target_anchor = target_cells
            .iter()
            .copied()
            .max_by_key(|c| (c.x, c.y))
            .unwrap_or(target_cells[0]);
        let mouse = project_to_grid_edge(&self.settings, self.settings.cell_center(target_anchor), mouse);

        let filtered: Vec<Cell> = candidates
            .iter()
            .copied()
            .filter(|&c| {
                chebyshev_to_footprint(c, target_cells) <= attack_range
                    || attacker_cells.contains(&c)
            })
            .collect();
        if filtered.is_empty() {
            return None;
        }

        if !attacker_small {
            let anchors =
                self.attack_cells_to_large_anchors(&filtered, target_cells, attacker_cells, reachable);
            return self.closest_large_anchor(mouse, &anchors, rng);
        }

        let pointer_cell = self.settings.cell_at(mouse.0, mouse.1)?;
        if target_cells.contains(&pointer_cell) {
            return self.closest_with_corner_tiebreak(mouse, &filtered, pointer_cell);
        }

        // Nearest target cell decides whose quadrant the pointer is read in
        let near = target_cells
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = distance_squared(self.settings.cell_center(*a), mouse);
                let db = distance_squared(self.settings.cell_center(*b), mouse);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(target_cells[0]);
        let (cx, cy) = self.settings.cell_center(near);
        let left = mouse.0 < cx;
        let mut up = mouse.1 < cy;
        // Lower-team targets are approached from above, so their vertical
        // preference is mirrored
        if target_team == Team::Lower {
            up = !up;
        }

        let side = closest_cell_side(&self.settings, near, mouse);
        let picked = match (left, up) {
            (true, true) => self.attack_cell_a(near, &filtered, side),
            (false, true) => self.attack_cell_b(near, &filtered, side),
            (true, false) => self.attack_cell_c(near, &filtered, side),
            (false, false) => self.attack_cell_d(near, &filtered, side),
        };
        picked.or_else(|| self.get_closest_attack_cell(mouse, &filtered, rng))
    }

    /// Closest candidate to the pointer; equal distances are broken by cell
    /// order, reversed when the pointer sits on a board-corner cell.
    fn closest_with_corner_tiebreak(
        &self,
        mouse: (f32, f32),
        candidates: &[Cell],
        pointer_cell: Cell,
    ) -> Option<Cell> {
        let n = self.settings.grid_size;
        let at_corner = (pointer_cell.x == 0 || pointer_cell.x == n - 1)
            && (pointer_cell.y == 0 || pointer_cell.y == n - 1);

        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| {
            let da = distance_squared(self.settings.cell_center(*a), mouse);
            let db = distance_squared(self.settings.cell_center(*b), mouse);
            match da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal) {
                std::cmp::Ordering::Equal => {
                    let key = (a.x, a.y).cmp(&(b.x, b.y));
                    if at_corner {
                        key.reverse()
                    } else {
                        key
                    }
                }
                other => other,
            }
        });
        sorted.first().copied()
    }

    /// Closest candidate to the pointer. Candidates are shuffled first so
    /// exactly-tied distances resolve pseudo-randomly; a strictly closer
    /// candidate always wins.
    pub fn get_closest_attack_cell(
        &self,
        mouse: (f32, f32),
        candidates: &[Cell],
        rng: &mut impl Rng,
    ) -> Option<Cell> {
        let mut shuffled = candidates.to_vec();
        shuffled.shuffle(rng);
        shuffled.into_iter().min_by(|a, b| {
            let da = distance_squared(self.settings.cell_center(*a), mouse);
            let db = distance_squared(self.settings.cell_center(*b), mouse);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    // The four directional heuristics. Which relative cell each one prefers
    // when the pointer is near a corner is game-feel tuning; keep the
    // four-case structure intact when touching them.

    fn attack_cell_a(&self, target: Cell, candidates: &[Cell], side: CellSide) -> Option<Cell> {
        self.pick_preferred(target, candidates, (-1, -1), side)
    }

    fn attack_cell_b(&self, target: Cell, candidates: &[Cell], side: CellSide) -> Option<Cell> {
        self.pick_preferred(target, candidates, (1, -1), side)
    }

    fn attack_cell_c(&self, target: Cell, candidates: &[Cell], side: CellSide) -> Option<Cell> {
        self.pick_preferred(target, candidates, (-1, 1), side)
    }

    fn attack_cell_d(&self, target: Cell, candidates: &[Cell], side: CellSide) -> Option<Cell> {
        self.pick_preferred(target, candidates, (1, 1), side)
    }

    fn pick_preferred(
        &self,
        target: Cell,
        candidates: &[Cell],
        quadrant: (i32, i32),
        side: CellSide,
    ) -> Option<Cell> {
        let (qx, qy) = quadrant;
        let horizontal_first = matches!(side, CellSide::Left | CellSide::Right);
        let mut offsets = vec![(qx, qy)];
        if horizontal_first {
            offsets.push((qx, 0));
            offsets.push((0, qy));
        } else {
            offsets.push((0, qy));
            offsets.push((qx, 0));
        }
        // Cells one step past the quadrant, still on the pointer side
        offsets.push((qx, -qy));
        offsets.push((-qx, qy));

        for (dx, dy) in offsets {
            let cell = target.offset(dx, dy);
            if candidates.contains(&cell) {
                return Some(cell);
            }
        }
        None
    }

    /// Map single-cell attack candidates to the 2x2 anchors whose footprint
    /// covers them, keeping only anchors the attacker can actually hold:
    /// on the board, not overlapping the target, and either reachable this
    /// turn or its current placement.
    pub fn attack_cells_to_large_anchors(
        &self,
        candidates: &[Cell],
        target_cells: &[Cell],
        attacker_cells: &[Cell],
        reachable: &HashSet<Cell>,
    ) -> Vec<Cell> {
        let current_anchor = attacker_cells.iter().copied().max_by_key(|c| (c.x, c.y));

        let mut anchors: Vec<Cell> = Vec::new();
        for &candidate in candidates {
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let anchor = candidate.offset(dx, dy);
                if anchors.contains(&anchor) || !self.anchor_in_bounds(anchor, false) {
                    continue;
                }
                let footprint = footprint_cells(anchor, false);
                if footprint.iter().any(|c| target_cells.contains(c)) {
                    continue;
                }
                if reachable.contains(&anchor) || Some(anchor) == current_anchor {
                    anchors.push(anchor);
                }
            }
        }
        anchors.sort_by_key(|c| (c.y, c.x));
        anchors
    }

    /// Anchor placements keeping a 2x2 attacker adjacent to an enemy cell
    /// without overlapping it, restricted to this turn's reachable set or
    /// the attacker's current placement.
    pub fn get_large_unit_attack_cells(
        &self,
        unit_cells: &[Cell],
        enemy_cell: Cell,
        reachable: &HashSet<Cell>,
    ) -> Vec<Cell> {
        let current_anchor = unit_cells.iter().copied().max_by_key(|c| (c.x, c.y));

        let mut anchors = Vec::new();
        for dy in -1..=2 {
            for dx in -1..=2 {
                let anchor = enemy_cell.offset(dx, dy);
                if !self.anchor_in_bounds(anchor, false) {
                    continue;
                }
                let footprint = footprint_cells(anchor, false);
                let distance = footprint
                    .iter()
                    .map(|&c| chebyshev_distance(c, enemy_cell))
                    .min()
                    .unwrap_or(i32::MAX);
                if distance != 1 {
                    continue;
                }
                if reachable.contains(&anchor) || Some(anchor) == current_anchor {
                    anchors.push(anchor);
                }
            }
        }
        anchors.sort_by_key(|c| (c.y, c.x));
        anchors
    }

    /// Closest anchor by footprint center; ties resolve pseudo-randomly
    fn closest_large_anchor(
        &self,
        mouse: (f32, f32),
        anchors: &[Cell],
        rng: &mut impl Rng,
    ) -> Option<Cell> {
        let mut shuffled = anchors.to_vec();
        shuffled.shuffle(rng);
        shuffled.into_iter().min_by(|a, b| {
            let da = distance_squared(self.large_footprint_center(*a), mouse);
            let db = distance_squared(self.large_footprint_center(*b), mouse);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn large_footprint_center(&self, anchor: Cell) -> (f32, f32) {
        let (cx, cy) = self.settings.cell_center(anchor);
        (cx - self.settings.half_step, cy - self.settings.half_step)
    }
}

fn distance_squared(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}
