use battlegrid::grid::{MATRIX_BLOCK, MATRIX_HOLE, MATRIX_LAVA, MATRIX_WATER};
use battlegrid::{Cell, GridSettings, Matrix, MoveProfile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

/// World bounds used across tests: 64 world units per cell
pub fn settings(grid_size: i32) -> GridSettings {
    let span = grid_size as f32 * 64.0;
    GridSettings::new(grid_size, 0.0, span, 0.0, span)
}

/// Fixed-seed RNG so tie-breaking is reproducible in tests
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

pub fn empty_matrix(grid_size: i32) -> Matrix {
    vec![vec![0; grid_size as usize]; grid_size as usize]
}

/// Aggression matrix with the same weight everywhere
pub fn uniform_aggr(grid_size: i32, weight: i32) -> Matrix {
    vec![vec![weight; grid_size as usize]; grid_size as usize]
}

/// A move-path scenario parsed from a board file.
///
/// Format: an optional header line `steps=N [fire] [water] [fly] [large]`,
/// then one row per line:
/// - s: the moving unit's cell (anchor for large units)
/// - .: free cell
/// - B/L/W/H: block, lava, water, hole
/// - 1/2: cell held by a unit of that team
/// - o: free cell that must be reachable
/// - x: free cell that must NOT be reachable
pub struct MoveScenario {
    pub grid_size: i32,
    pub matrix: Matrix,
    pub origin: Cell,
    pub steps: u32,
    pub profile: MoveProfile,
    pub must_reach: Vec<Cell>,
    pub must_not_reach: Vec<Cell>,
}

pub fn parse_move_scenario(path: &Path) -> Result<MoveScenario, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let mut lines: Vec<&str> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return Err("Empty scenario file".into());
    }

    let mut steps: u32 = 1;
    let mut profile = MoveProfile::default();
    if lines[0].contains("steps=") {
        for token in lines[0].split_whitespace() {
            if let Some(value) = token.strip_prefix("steps=") {
                steps = value.parse()?;
            } else {
                match token {
                    "fire" => profile.made_of_fire = true,
                    "water" => profile.water_immune = true,
                    "fly" => profile.can_fly = true,
                    "large" => profile.small = false,
                    other => return Err(format!("Unknown flag '{}'", other).into()),
                }
            }
        }
        lines.remove(0);
    }

    let grid_size = lines[0].chars().count() as i32;
    if lines.len() as i32 != grid_size {
        return Err(format!(
            "Board must be square, got {} rows of width {}",
            lines.len(),
            grid_size
        )
        .into());
    }

    let mut matrix = empty_matrix(grid_size);
    let mut origin = None;
    let mut must_reach = Vec::new();
    let mut must_not_reach = Vec::new();

    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            let cell = Cell::new(x as i32, y as i32);
            match ch {
                's' => origin = Some(cell),
                '.' => {}
                'o' => must_reach.push(cell),
                'x' => must_not_reach.push(cell),
                'B' => {
                    matrix[y][x] = MATRIX_BLOCK;
                    must_not_reach.push(cell);
                }
                'H' => {
                    matrix[y][x] = MATRIX_HOLE;
                    must_not_reach.push(cell);
                }
                'L' => {
                    matrix[y][x] = MATRIX_LAVA;
                    if !profile.made_of_fire {
                        must_not_reach.push(cell);
                    }
                }
                'W' => {
                    matrix[y][x] = MATRIX_WATER;
                    if !profile.water_immune {
                        must_not_reach.push(cell);
                    }
                }
                '1' | '2' => {
                    matrix[y][x] = ch.to_digit(10).unwrap_or(1) as i32;
                    must_not_reach.push(cell);
                }
                other => return Err(format!("Unknown board character '{}'", other).into()),
            }
        }
    }

    let origin = origin.ok_or("No start position 's' found in scenario")?;
    Ok(MoveScenario {
        grid_size,
        matrix,
        origin,
        steps,
        profile,
        must_reach,
        must_not_reach,
    })
}
