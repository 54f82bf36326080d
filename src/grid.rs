use crate::grid_math::Cell;
use crate::settings::GridSettings;
use std::collections::HashMap;

/// Occupancy snapshot consumed by pathfinding, indexed `[y][x]`.
/// 0 = empty, positive = occupying team number, negative = obstacle code.
pub type Matrix = Vec<Vec<i32>>;

pub const MATRIX_EMPTY: i32 = 0;
pub const MATRIX_BLOCK: i32 = -1;
pub const MATRIX_LAVA: i32 = -2;
pub const MATRIX_WATER: i32 = -3;
pub const MATRIX_HOLE: i32 = -4;

/// Terrain hazard occupying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Block,
    Lava,
    Water,
    Hole,
}

impl ObstacleKind {
    pub fn matrix_code(&self) -> i32 {
        match self {
            ObstacleKind::Block => MATRIX_BLOCK,
            ObstacleKind::Lava => MATRIX_LAVA,
            ObstacleKind::Water => MATRIX_WATER,
            ObstacleKind::Hole => MATRIX_HOLE,
        }
    }

    /// Single-letter tag used in snapshots and board dumps
    pub fn letter(&self) -> char {
        match self {
            ObstacleKind::Block => 'B',
            ObstacleKind::Lava => 'L',
            ObstacleKind::Water => 'W',
            ObstacleKind::Hole => 'H',
        }
    }

    pub fn from_letter(letter: char) -> Option<ObstacleKind> {
        match letter {
            'B' => Some(ObstacleKind::Block),
            'L' => Some(ObstacleKind::Lava),
            'W' => Some(ObstacleKind::Water),
            'H' => Some(ObstacleKind::Hole),
            _ => None,
        }
    }
}

/// State of one board cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Occupied(String),
    Obstacle(ObstacleKind),
}

/// One of the two sides of a battle. Upper deploys on the low-y half of the
/// board, Lower on the high-y half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    Upper,
    Lower,
}

impl Team {
    pub fn number(&self) -> i32 {
        match self {
            Team::Upper => 1,
            Team::Lower => 2,
        }
    }

    pub fn from_number(number: i32) -> Option<Team> {
        match number {
            1 => Some(Team::Upper),
            2 => Some(Team::Lower),
            _ => None,
        }
    }

    pub fn enemy(&self) -> Team {
        match self {
            Team::Upper => Team::Lower,
            Team::Lower => Team::Upper,
        }
    }

    fn index(&self) -> usize {
        match self {
            Team::Upper => 0,
            Team::Lower => 1,
        }
    }
}

/// Scripted terrain layout of the interior obstacle region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridType {
    Normal,
    LavaCenter,
    WaterCenter,
    BlockCenter,
}

impl GridType {
    pub fn center_obstacle(&self) -> Option<ObstacleKind> {
        match self {
            GridType::Normal => None,
            GridType::LavaCenter => Some(ObstacleKind::Lava),
            GridType::WaterCenter => Some(ObstacleKind::Water),
            GridType::BlockCenter => Some(ObstacleKind::Block),
        }
    }
}

/// Direction set restricting which aggression rays fire. Diagonal rays fire
/// only when both adjacent orthogonal bits are present, so the four corner
/// calls of a 2x2 unit cover the perimeter exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateDirs(u8);

impl UpdateDirs {
    pub const UP: UpdateDirs = UpdateDirs(0b0001);
    pub const DOWN: UpdateDirs = UpdateDirs(0b0010);
    pub const LEFT: UpdateDirs = UpdateDirs(0b0100);
    pub const RIGHT: UpdateDirs = UpdateDirs(0b1000);
    pub const ALL: UpdateDirs = UpdateDirs(0b1111);

    pub fn with(self, other: UpdateDirs) -> UpdateDirs {
        UpdateDirs(self.0 | other.0)
    }

    pub fn has(self, other: UpdateDirs) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone)]
struct UnitEntry {
    team: Team,
    cells: Vec<Cell>,
}

/// Authoritative occupancy board plus per-team aggression bookkeeping.
/// All mutators return false and leave state untouched on invalid input.
pub struct Grid {
    settings: GridSettings,
    grid_type: GridType,
    board: Vec<CellState>,
    /// Threat weights generated by each team, baseline 1 per cell
    aggr: [Vec<i32>; 2],
    units: HashMap<String, UnitEntry>,
    center_cleaned: bool,
}

impl Grid {
    pub fn new(settings: GridSettings, grid_type: GridType) -> Self {
        let count = (settings.grid_size * settings.grid_size) as usize;
        let mut grid = Grid {
            settings,
            grid_type,
            board: vec![CellState::Empty; count],
            aggr: [vec![1; count], vec![1; count]],
            units: HashMap::new(),
            center_cleaned: false,
        };
        grid.fill_center_obstacle();
        grid
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    pub fn is_center_cleaned(&self) -> bool {
        self.center_cleaned
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.x + cell.y * self.settings.grid_size) as usize
    }

    pub fn cell_state(&self, cell: Cell) -> Option<&CellState> {
        if !self.settings.in_bounds(cell) {
            return None;
        }
        Some(&self.board[self.index(cell)])
    }

    /// Cells currently owned by a unit
    pub fn unit_cells(&self, unit_id: &str) -> Option<&[Cell]> {
        self.units.get(unit_id).map(|e| e.cells.as_slice())
    }

    pub fn team_of_unit(&self, unit_id: &str) -> Option<Team> {
        self.units.get(unit_id).map(|e| e.team)
    }

    /// Iterate registered units as (id, team, cells)
    pub fn units(&self) -> impl Iterator<Item = (&str, Team, &[Cell])> {
        self.units
            .iter()
            .map(|(id, e)| (id.as_str(), e.team, e.cells.as_slice()))
    }

    /// Place a 1x1 unit on a cell, vacating its previous cell and shifting
    /// its aggression contribution. Returns false when the placement is
    /// invalid; the grid is unchanged in that case.
    pub fn occupy_cell(
        &mut self,
        cell: Cell,
        unit_id: &str,
        team: Team,
        attack_range: i32,
        can_occupy_lava: bool,
        can_occupy_water: bool,
    ) -> bool {
        if unit_id.is_empty() || !self.settings.in_bounds(cell) {
            return false;
        }
        if let Some(entry) = self.units.get(unit_id) {
            // Team changes and 2x2 units repositioned one cell at a time are
            // caller errors
            if entry.team != team || entry.cells.len() > 1 {
                return false;
            }
        }
        if !self.can_place_on(cell, unit_id, can_occupy_lava, can_occupy_water) {
            return false;
        }

        let prev = self
            .units
            .get(unit_id)
            .map(|e| e.cells.clone())
            .unwrap_or_default();
        for &c in &prev {
            self.release_cell(c);
        }
        if attack_range > 0 {
            if let Some(&old) = prev.first() {
                self.radiate_aggression(team, old, attack_range, -1, UpdateDirs::ALL);
            }
            self.radiate_aggression(team, cell, attack_range, 1, UpdateDirs::ALL);
        }

        let idx = self.index(cell);
        self.board[idx] = CellState::Occupied(unit_id.to_string());
        self.units.insert(
            unit_id.to_string(),
            UnitEntry {
                team,
                cells: vec![cell],
            },
        );
        true
    }

    /// Place a unit on 1 or 4 cells. Four cells must form a 2x2 box;
    /// aggression is applied at the box corners only so shared edges are
    /// never double counted.
    pub fn occupy_cells(
        &mut self,
        cells: &[Cell],
        unit_id: &str,
        team: Team,
        attack_range: i32,
        can_occupy_lava: bool,
        can_occupy_water: bool,
    ) -> bool {
        if cells.len() == 1 {
            return self.occupy_cell(
                cells[0],
                unit_id,
                team,
                attack_range,
                can_occupy_lava,
                can_occupy_water,
            );
        }
        if cells.len() != 4 || unit_id.is_empty() {
            return false;
        }
        if !is_square_footprint(cells) {
            return false;
        }
        if let Some(entry) = self.units.get(unit_id) {
            if entry.team != team {
                return false;
            }
        }
        for &c in cells {
            if !self.settings.in_bounds(c) {
                return false;
            }
            if !self.can_place_on(c, unit_id, can_occupy_lava, can_occupy_water) {
                return false;
            }
        }

        let prev = self
            .units
            .get(unit_id)
            .map(|e| e.cells.clone())
            .unwrap_or_default();
        if attack_range > 0 {
            self.reverse_footprint_aggression(team, &prev, attack_range);
        }
        for &c in &prev {
            self.release_cell(c);
        }
        if attack_range > 0 {
            for (corner, dirs) in footprint_corners(cells) {
                self.radiate_aggression(team, corner, attack_range, 1, dirs);
            }
        }

        for &c in cells {
            let idx = self.index(c);
            self.board[idx] = CellState::Occupied(unit_id.to_string());
        }
        self.units.insert(
            unit_id.to_string(),
            UnitEntry {
                team,
                cells: cells.to_vec(),
            },
        );
        true
    }

    /// Vacate everything a unit owns and reverse its aggression contribution.
    /// No-op when the unit is unknown.
    pub fn cleanup_all(&mut self, unit_id: &str, attack_range: i32, is_small_unit: bool) {
        let Some(entry) = self.units.remove(unit_id) else {
            return;
        };
        if attack_range > 0 {
            if is_small_unit && entry.cells.len() == 1 {
                self.radiate_aggression(entry.team, entry.cells[0], attack_range, -1, UpdateDirs::ALL);
            } else {
                self.reverse_footprint_aggression(entry.team, &entry.cells, attack_range);
            }
        }
        for &c in &entry.cells {
            self.release_cell(c);
        }
    }

    /// Scripted placement of a single obstacle on an empty cell
    pub fn set_obstacle(&mut self, cell: Cell, kind: ObstacleKind) -> bool {
        if !self.settings.in_bounds(cell) {
            return false;
        }
        let idx = self.index(cell);
        if self.board[idx] != CellState::Empty {
            return false;
        }
        self.board[idx] = CellState::Obstacle(kind);
        true
    }

    /// Clear the interior obstacle region, the scripted "drying" moment.
    /// Former lava/water cells will no longer be restored when units vacate.
    pub fn cleanup_center_obstacle(&mut self) {
        let kind = self.grid_type.center_obstacle();
        let start = self.settings.obstacle_region_start();
        let end = self.settings.obstacle_region_end();
        for y in start..end {
            for x in start..end {
                let idx = self.index(Cell::new(x, y));
                if let CellState::Obstacle(k) = self.board[idx] {
                    if Some(k) == kind {
                        self.board[idx] = CellState::Empty;
                    }
                }
            }
        }
        self.center_cleaned = true;
    }

    /// Regenerate the interior obstacle region for a new grid type
    pub fn refresh_with_new_type(&mut self, grid_type: GridType) {
        let start = self.settings.obstacle_region_start();
        let end = self.settings.obstacle_region_end();
        for y in start..end {
            for x in start..end {
                let idx = self.index(Cell::new(x, y));
                if matches!(self.board[idx], CellState::Obstacle(_)) {
                    self.board[idx] = CellState::Empty;
                }
            }
        }
        self.grid_type = grid_type;
        self.center_cleaned = false;
        self.fill_center_obstacle();
    }

    /// Threat weights generated by `team`, as a fresh `[y][x]` snapshot
    pub fn get_aggr_matrix_by_team(&self, team: Team) -> Matrix {
        let n = self.settings.grid_size;
        let source = &self.aggr[team.index()];
        (0..n)
            .map(|y| (0..n).map(|x| source[(x + y * n) as usize]).collect())
            .collect()
    }

    /// Threat weights affecting a unit, i.e. the matrix of its enemy team
    pub fn get_enemy_aggr_matrix_by_unit_id(&self, unit_id: &str) -> Option<Matrix> {
        let team = self.team_of_unit(unit_id)?;
        Some(self.get_aggr_matrix_by_team(team.enemy()))
    }

    /// Occupancy snapshot: 0 empty, team number for units, negative obstacle codes
    pub fn get_matrix(&self) -> Matrix {
        self.snapshot(false)
    }

    /// Occupancy snapshot with units reported as empty cells
    pub fn get_matrix_no_units(&self) -> Matrix {
        self.snapshot(true)
    }

    fn snapshot(&self, no_units: bool) -> Matrix {
        let n = self.settings.grid_size;
        (0..n)
            .map(|y| {
                (0..n)
                    .map(|x| match &self.board[(x + y * n) as usize] {
                        CellState::Empty => MATRIX_EMPTY,
                        CellState::Occupied(id) => {
                            if no_units {
                                MATRIX_EMPTY
                            } else {
                                self.units.get(id).map(|e| e.team.number()).unwrap_or(MATRIX_EMPTY)
                            }
                        }
                        CellState::Obstacle(kind) => kind.matrix_code(),
                    })
                    .collect()
            })
            .collect()
    }

    fn fill_center_obstacle(&mut self) {
        let Some(kind) = self.grid_type.center_obstacle() else {
            return;
        };
        let start = self.settings.obstacle_region_start();
        let end = self.settings.obstacle_region_end();
        for y in start..end {
            for x in start..end {
                let idx = self.index(Cell::new(x, y));
                if self.board[idx] == CellState::Empty {
                    self.board[idx] = CellState::Obstacle(kind);
                }
            }
        }
    }

    fn can_place_on(
        &self,
        cell: Cell,
        unit_id: &str,
        can_occupy_lava: bool,
        can_occupy_water: bool,
    ) -> bool {
        match &self.board[self.index(cell)] {
            CellState::Empty => true,
            CellState::Occupied(id) => id == unit_id,
            CellState::Obstacle(ObstacleKind::Lava) => can_occupy_lava,
            CellState::Obstacle(ObstacleKind::Water) => can_occupy_water,
            CellState::Obstacle(_) => false,
        }
    }

    /// Return a vacated cell to its terrain: the scripted obstacle while the
    /// region is un-cleaned, empty otherwise.
    fn release_cell(&mut self, cell: Cell) {
        let idx = self.index(cell);
        if !self.center_cleaned && self.settings.in_obstacle_region(cell) {
            if let Some(kind) = self.grid_type.center_obstacle() {
                self.board[idx] = CellState::Obstacle(kind);
                return;
            }
        }
        self.board[idx] = CellState::Empty;
    }

    fn reverse_footprint_aggression(&mut self, team: Team, cells: &[Cell], attack_range: i32) {
        if cells.len() == 1 {
            self.radiate_aggression(team, cells[0], attack_range, -1, UpdateDirs::ALL);
        } else if cells.len() == 4 {
            for (corner, dirs) in footprint_corners(cells) {
                self.radiate_aggression(team, corner, attack_range, -1, dirs);
            }
        }
    }

    /// 8-directional ray radiation: walk each permitted direction out to
    /// `attack_range`, adjusting every in-bounds cell by `delta`. Rays are
    /// radiated, not flood filled.
    fn radiate_aggression(
        &mut self,
        team: Team,
        cell: Cell,
        attack_range: i32,
        delta: i32,
        dirs: UpdateDirs,
    ) {
        let rays: [(i32, i32, UpdateDirs); 8] = [
            (0, -1, UpdateDirs::UP),
            (0, 1, UpdateDirs::DOWN),
            (-1, 0, UpdateDirs::LEFT),
            (1, 0, UpdateDirs::RIGHT),
            (-1, -1, UpdateDirs::UP.with(UpdateDirs::LEFT)),
            (1, -1, UpdateDirs::UP.with(UpdateDirs::RIGHT)),
            (-1, 1, UpdateDirs::DOWN.with(UpdateDirs::LEFT)),
            (1, 1, UpdateDirs::DOWN.with(UpdateDirs::RIGHT)),
        ];
        for (dx, dy, required) in rays {
            if !dirs.has(required) {
                continue;
            }
            for step in 1..=attack_range {
                let target = cell.offset(dx * step, dy * step);
                if !self.settings.in_bounds(target) {
                    break;
                }
                let idx = self.index(target);
                self.aggr[team.index()][idx] += delta;
            }
        }
    }
}

/// Check that four cells form a 2x2 box
fn is_square_footprint(cells: &[Cell]) -> bool {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    for dx in 0..2 {
        for dy in 0..2 {
            if !cells.contains(&Cell::new(min_x + dx, min_y + dy)) {
                return false;
            }
        }
    }
    true
}

/// Corners of a 2x2 footprint with their outward direction sets
fn footprint_corners(cells: &[Cell]) -> [(Cell, UpdateDirs); 4] {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    [
        (Cell::new(min_x, min_y), UpdateDirs::UP.with(UpdateDirs::LEFT)),
        (Cell::new(max_x, min_y), UpdateDirs::UP.with(UpdateDirs::RIGHT)),
        (Cell::new(min_x, max_y), UpdateDirs::DOWN.with(UpdateDirs::LEFT)),
        (Cell::new(max_x, max_y), UpdateDirs::DOWN.with(UpdateDirs::RIGHT)),
    ]
}
