use crate::grid_math::Cell;

/// Immutable coordinate-system constants for one battle.
/// Converts between world-space positions and integer cell coordinates.
#[derive(Clone, Copy, Debug)]
pub struct GridSettings {
    pub grid_size: i32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Width/height of one cell in world units
    pub cell_size: f32,
    /// Half of a cell, used to address cell centers
    pub half_step: f32,
    /// World-space length of one diagonal step
    pub diagonal_step: f32,
    /// Tolerance applied to movement-budget comparisons
    pub movement_delta: f64,
    /// Shrink applied to a unit's square for placement checks
    pub unit_size_delta: f32,
}

impl GridSettings {
    pub fn new(grid_size: i32, min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        let cell_size = (max_x - min_x) / grid_size as f32;
        GridSettings {
            grid_size,
            min_x,
            max_x,
            min_y,
            max_y,
            cell_size,
            half_step: cell_size / 2.0,
            diagonal_step: cell_size * std::f32::consts::SQRT_2,
            movement_delta: 0.0001,
            unit_size_delta: cell_size * 0.05,
        }
    }

    /// Check if a cell lies inside the board
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.grid_size && cell.y >= 0 && cell.y < self.grid_size
    }

    /// Cell containing a world position, or None when the position is off the board
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Cell> {
        if x < self.min_x || x >= self.max_x || y < self.min_y || y >= self.max_y {
            return None;
        }
        let cx = ((x - self.min_x) / self.cell_size).floor() as i32;
        let cy = ((y - self.min_y) / self.cell_size).floor() as i32;
        let cell = Cell::new(cx.min(self.grid_size - 1), cy.min(self.grid_size - 1));
        Some(cell)
    }

    /// World position of a cell's center
    pub fn cell_center(&self, cell: Cell) -> (f32, f32) {
        (
            self.min_x + cell.x as f32 * self.cell_size + self.half_step,
            self.min_y + cell.y as f32 * self.cell_size + self.half_step,
        )
    }

    /// First row/column of the interior obstacle region (quarter + half-quarter offset)
    pub fn obstacle_region_start(&self) -> i32 {
        self.grid_size / 4 + self.grid_size / 8
    }

    /// One past the last row/column of the interior obstacle region
    pub fn obstacle_region_end(&self) -> i32 {
        self.grid_size - self.obstacle_region_start()
    }

    /// Check if a cell lies inside the interior obstacle region
    pub fn in_obstacle_region(&self, cell: Cell) -> bool {
        let start = self.obstacle_region_start();
        let end = self.obstacle_region_end();
        cell.x >= start && cell.x < end && cell.y >= start && cell.y < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_at_round_trip() {
        let settings = GridSettings::new(16, 0.0, 800.0, 0.0, 800.0);
        let cell = Cell::new(7, 12);
        let (cx, cy) = settings.cell_center(cell);
        assert_eq!(settings.cell_at(cx, cy), Some(cell));
    }

    #[test]
    fn test_step_lengths() {
        let settings = GridSettings::new(16, 0.0, 800.0, 0.0, 800.0);
        assert_eq!(settings.cell_size, 50.0);
        assert_eq!(settings.half_step, 25.0);
        assert!((settings.diagonal_step - 50.0 * std::f32::consts::SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let settings = GridSettings::new(16, 0.0, 800.0, 0.0, 800.0);
        assert_eq!(settings.cell_at(-1.0, 10.0), None);
        assert_eq!(settings.cell_at(10.0, 800.0), None);
    }

    #[test]
    fn test_obstacle_region_bounds() {
        let settings = GridSettings::new(16, 0.0, 800.0, 0.0, 800.0);
        // quarter (4) + half-quarter (2) = 6, region spans 6..10
        assert_eq!(settings.obstacle_region_start(), 6);
        assert_eq!(settings.obstacle_region_end(), 10);
        assert!(settings.in_obstacle_region(Cell::new(6, 6)));
        assert!(settings.in_obstacle_region(Cell::new(9, 9)));
        assert!(!settings.in_obstacle_region(Cell::new(5, 6)));
        assert!(!settings.in_obstacle_region(Cell::new(10, 9)));
    }
}
