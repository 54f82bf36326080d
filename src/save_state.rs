use crate::grid::{CellState, Grid, GridType, ObstacleKind, Team};
use crate::grid_math::{footprint_cells, Cell};
use crate::settings::GridSettings;
use serde::{Deserialize, Serialize};
use std::fs;

/// Snapshot of one battle board: terrain plus unit placements.
/// Demo/tooling feature; live grid state is never persisted mid-battle.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveState {
    pub grid_size: i32,
    pub grid_type: String,
    pub center_cleaned: bool,
    pub obstacles: Vec<ObstacleSaveData>,
    pub units: Vec<UnitSaveData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleSaveData {
    pub x: i32,
    pub y: i32,
    /// Single-letter obstacle tag: B, L, W or H
    pub kind: char,
}

/// Minimal unit data for saving/loading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSaveData {
    pub id: String,
    pub team: i32,
    /// Anchor cell (max-x/max-y footprint cell for 2x2 units)
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub small: bool,
    pub attack_range: i32,
    pub can_fly: bool,
    pub made_of_fire: bool,
    pub water_immune: bool,
}

impl SaveState {
    /// Create a save state from the current grid plus the caller's unit
    /// records (the grid itself does not retain per-unit combat stats)
    pub fn from_grid_and_units(grid: &Grid, units: &[UnitSaveData]) -> Self {
        let n = grid.settings().grid_size;
        let mut obstacles = Vec::new();
        for y in 0..n {
            for x in 0..n {
                if let Some(CellState::Obstacle(kind)) = grid.cell_state(Cell::new(x, y)) {
                    obstacles.push(ObstacleSaveData {
                        x,
                        y,
                        kind: kind.letter(),
                    });
                }
            }
        }

        SaveState {
            grid_size: n,
            grid_type: grid_type_name(grid.grid_type()).to_string(),
            center_cleaned: grid.is_center_cleaned(),
            obstacles,
            units: units.to_vec(),
        }
    }

    /// Save to file
    pub fn save_to_file(&self, path: &str) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize save state: {}", e))?;

        fs::write(path, json).map_err(|e| format!("Failed to write save file: {}", e))?;

        Ok(())
    }

    /// Load from file
    pub fn load_from_file(path: &str) -> Result<Self, String> {
        let json =
            fs::read_to_string(path).map_err(|e| format!("Failed to read save file: {}", e))?;

        let save_state: SaveState =
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse save file: {}", e))?;

        Ok(save_state)
    }

    /// Rebuild a grid from this save state: terrain first, then units
    /// re-occupied through the regular placement calls.
    pub fn restore_grid(&self, settings: GridSettings) -> Grid {
        let mut grid = Grid::new(settings, grid_type_from_name(&self.grid_type));
        if self.center_cleaned {
            grid.cleanup_center_obstacle();
        }

        for obstacle in &self.obstacles {
            let cell = Cell::new(obstacle.x, obstacle.y);
            if let Some(kind) = ObstacleKind::from_letter(obstacle.kind) {
                // Region terrain is already in place; this covers extras
                // like scripted holes
                if grid.cell_state(cell) == Some(&CellState::Empty) {
                    grid.set_obstacle(cell, kind);
                }
            }
        }

        for unit in &self.units {
            let Some(team) = Team::from_number(unit.team) else {
                continue;
            };
            let anchor = Cell::new(unit.anchor_x, unit.anchor_y);
            let cells = footprint_cells(anchor, unit.small);
            let placed = grid.occupy_cells(
                &cells,
                &unit.id,
                team,
                unit.attack_range,
                unit.made_of_fire,
                unit.water_immune,
            );
            if !placed {
                eprintln!("Warning: could not restore unit '{}' at ({},{})", unit.id, anchor.x, anchor.y);
            }
        }

        grid
    }

    /// Restore the unit records stored alongside the board
    pub fn restore_units(&self) -> Vec<UnitSaveData> {
        self.units.clone()
    }
}

fn grid_type_name(grid_type: GridType) -> &'static str {
    match grid_type {
        GridType::Normal => "normal",
        GridType::LavaCenter => "lava_center",
        GridType::WaterCenter => "water_center",
        GridType::BlockCenter => "block_center",
    }
}

fn grid_type_from_name(name: &str) -> GridType {
    match name {
        "lava_center" => GridType::LavaCenter,
        "water_center" => GridType::WaterCenter,
        "block_center" => GridType::BlockCenter,
        _ => GridType::Normal,
    }
}
