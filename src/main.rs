use arboard::Clipboard;
use battlegrid::config::Config;
use battlegrid::grid_math::{cells_around_position, footprint_cells};
use battlegrid::path::format_route;
use battlegrid::save_state::{SaveState, UnitSaveData};
use battlegrid::{Cell, CellState, Grid, GridType, MovePath, MoveProfile, ObstacleKind, PathHelper, Team};
use macroquad::prelude::*;
// The macroquad prelude exports its own `rand` module; path-qualify the
// crate so the two do not collide
use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use std::collections::HashSet;

/// Combat stats of one demo unit; the grid only tracks placement
#[derive(Debug, Clone)]
struct DemoUnit {
    id: String,
    team: Team,
    small: bool,
    attack_range: i32,
    steps: u32,
    can_fly: bool,
    made_of_fire: bool,
    water_immune: bool,
}

impl DemoUnit {
    fn profile(&self) -> MoveProfile {
        MoveProfile {
            small: self.small,
            can_fly: self.can_fly,
            made_of_fire: self.made_of_fire,
            water_immune: self.water_immune,
        }
    }
}

struct VisState {
    config: Config,
    grid: Grid,
    path_helper: PathHelper,
    units: Vec<DemoUnit>,
    selected: Option<usize>,
    move_path: Option<MovePath>,
    attack_cell: Option<Cell>,
    show_aggression: bool,
    rng: StdRng,
}

impl VisState {
    fn new() -> Self {
        let config = Config::load();
        let settings = config.grid_settings();
        let mut grid = Grid::new(settings, config.grid_type());
        let path_helper = PathHelper::new(settings);

        let units = vec![
            DemoUnit { id: "u_spear".into(), team: Team::Upper, small: true, attack_range: 1, steps: 4, can_fly: false, made_of_fire: false, water_immune: false },
            DemoUnit { id: "u_golem".into(), team: Team::Upper, small: false, attack_range: 2, steps: 3, can_fly: false, made_of_fire: false, water_immune: false },
            DemoUnit { id: "u_imp".into(), team: Team::Upper, small: true, attack_range: 1, steps: 5, can_fly: false, made_of_fire: true, water_immune: false },
            DemoUnit { id: "l_spear".into(), team: Team::Lower, small: true, attack_range: 1, steps: 4, can_fly: false, made_of_fire: false, water_immune: false },
            DemoUnit { id: "l_wyvern".into(), team: Team::Lower, small: false, attack_range: 1, steps: 5, can_fly: true, made_of_fire: false, water_immune: false },
            DemoUnit { id: "l_nymph".into(), team: Team::Lower, small: true, attack_range: 2, steps: 4, can_fly: false, made_of_fire: false, water_immune: true },
        ];

        let n = settings.grid_size;
        let placements = [
            (Cell::new(3, 1), true),
            (Cell::new(8, 1), false),
            (Cell::new(12, 1), true),
            (Cell::new(3, n - 2), true),
            (Cell::new(8, n - 1), false),
            (Cell::new(12, n - 2), true),
        ];
        for (unit, (anchor, small)) in units.iter().zip(placements) {
            let cells = footprint_cells(anchor, small);
            let placed = grid.occupy_cells(
                &cells,
                &unit.id,
                unit.team,
                unit.attack_range,
                unit.made_of_fire,
                unit.water_immune,
            );
            if !placed {
                eprintln!("Warning: failed to place demo unit '{}'", unit.id);
            }
        }

        let show_aggression = config.visual.show_aggression;
        VisState {
            config,
            grid,
            path_helper,
            units,
            selected: None,
            move_path: None,
            attack_cell: None,
            show_aggression,
            rng: StdRng::from_entropy(),
        }
    }

    fn cell_px(&self) -> f32 {
        self.config.visual.cell_px
    }

    fn screen_to_cell(&self, mx: f32, my: f32) -> Option<Cell> {
        let settings = self.grid.settings();
        let x = settings.min_x + mx / self.cell_px() * settings.cell_size;
        let y = settings.min_y + my / self.cell_px() * settings.cell_size;
        settings.cell_at(x, y)
    }

    fn screen_to_world(&self, mx: f32, my: f32) -> (f32, f32) {
        let settings = self.grid.settings();
        (
            settings.min_x + mx / self.cell_px() * settings.cell_size,
            settings.min_y + my / self.cell_px() * settings.cell_size,
        )
    }

    fn unit_index_at(&self, cell: Cell) -> Option<usize> {
        if let Some(CellState::Occupied(id)) = self.grid.cell_state(cell) {
            return self.units.iter().position(|u| &u.id == id);
        }
        None
    }

    fn unit_anchor(&self, unit: &DemoUnit) -> Option<Cell> {
        let cells = self.grid.unit_cells(&unit.id)?;
        cells.iter().copied().max_by_key(|c| (c.x, c.y))
    }

    fn recompute_move_path(&mut self) {
        self.move_path = None;
        self.attack_cell = None;
        let Some(index) = self.selected else { return };
        let unit = self.units[index].clone();
        let Some(anchor) = self.unit_anchor(&unit) else { return };

        let matrix = self.grid.get_matrix();
        let aggr = self.grid.get_enemy_aggr_matrix_by_unit_id(&unit.id);
        let path = self.path_helper.get_move_path(
            anchor,
            &matrix,
            unit.steps,
            aggr.as_ref(),
            &unit.profile(),
            &mut self.rng,
        );
        println!(
            "Unit '{}' at ({},{}): {} reachable cells",
            unit.id, anchor.x, anchor.y, path.cells.len()
        );
        self.move_path = Some(path);
    }

    fn handle_left_click(&mut self, mx: f32, my: f32) {
        let Some(cell) = self.screen_to_cell(mx, my) else { return };

        if let Some(index) = self.unit_index_at(cell) {
            self.selected = Some(index);
            self.recompute_move_path();
            return;
        }

        // Commit a move when clicking a reachable destination
        let Some(index) = self.selected else { return };
        let reachable = match &self.move_path {
            Some(path) => path.reachable.contains(&cell),
            None => false,
        };
        if !reachable {
            return;
        }
        let unit = self.units[index].clone();
        if let Some(path) = &self.move_path {
            if let Some(routes) = path.known_paths.get(&cell) {
                if let Some(route) = routes.first() {
                    println!("Committing move: {}", format_route(route));
                }
            }
        }
        let cells = footprint_cells(cell, unit.small);
        let moved = self.grid.occupy_cells(
            &cells,
            &unit.id,
            unit.team,
            unit.attack_range,
            unit.made_of_fire,
            unit.water_immune,
        );
        if !moved {
            println!("Move to ({},{}) rejected", cell.x, cell.y);
        }
        self.recompute_move_path();
    }

    /// Enemy unit at the clicked cell, or in the 3x3 around the pointer when
    /// the click lands just off the unit
    fn target_index_near(&self, cell: Cell, world: (f32, f32)) -> Option<usize> {
        if let Some(index) = self.unit_index_at(cell) {
            return Some(index);
        }
        cells_around_position(self.grid.settings(), world.0, world.1)
            .into_iter()
            .find_map(|c| self.unit_index_at(c))
    }

    fn handle_right_click(&mut self, mx: f32, my: f32) {
        self.attack_cell = None;
        let Some(cell) = self.screen_to_cell(mx, my) else { return };
        let Some(attacker_index) = self.selected else { return };
        let world = self.screen_to_world(mx, my);
        let Some(target_index) = self.target_index_near(cell, world) else { return };

        let attacker = self.units[attacker_index].clone();
        let target = self.units[target_index].clone();
        if attacker.team == target.team {
            return;
        }
        let attacker_cells: Vec<Cell> = match self.grid.unit_cells(&attacker.id) {
            Some(cells) => cells.to_vec(),
            None => return,
        };
        let target_cells: Vec<Cell> = match self.grid.unit_cells(&target.id) {
            Some(cells) => cells.to_vec(),
            None => return,
        };
        let reachable: HashSet<Cell> = match &self.move_path {
            Some(path) => path.reachable.clone(),
            None => HashSet::new(),
        };

        // Candidate attack origins: reachable (or currently held) cells
        // around the target footprint. Overhanging neighbors are fine here,
        // the reachable-set test weeds them out.
        let empty: HashSet<Cell> = HashSet::new();
        let mut candidates: Vec<Cell> = Vec::new();
        for &tc in &target_cells {
            for n in self.path_helper.get_neighbor_cells(tc, &empty, true, true, true) {
                if candidates.contains(&n) || target_cells.contains(&n) {
                    continue;
                }
                if reachable.contains(&n) || attacker_cells.contains(&n) {
                    candidates.push(n);
                }
            }
        }

        let picked = self.path_helper.calculate_closest_attack_from(
            world,
            &candidates,
            &attacker_cells,
            &target_cells,
            attacker.attack_range.max(1),
            target.team,
            attacker.small,
            &reachable,
            &mut self.rng,
        );
        match picked {
            Some(cell) => {
                println!("Attack '{}' from ({},{})", target.id, cell.x, cell.y);
                self.attack_cell = Some(cell);
            }
            None => println!("No legal attack cell against '{}'", target.id),
        }
    }

    fn copy_to_clipboard(&self) {
        // The grid knows who is actually on the board; the demo list only
        // supplies the combat stats
        let mut unit_data = Vec::new();
        for (id, team, cells) in self.grid.units() {
            let Some(unit) = self.units.iter().find(|u| u.id == id) else {
                continue;
            };
            let Some(anchor) = cells.iter().copied().max_by_key(|c| (c.x, c.y)) else {
                continue;
            };
            unit_data.push(UnitSaveData {
                id: id.to_string(),
                team: team.number(),
                anchor_x: anchor.x,
                anchor_y: anchor.y,
                small: unit.small,
                attack_range: unit.attack_range,
                can_fly: unit.can_fly,
                made_of_fire: unit.made_of_fire,
                water_immune: unit.water_immune,
            });
        }
        unit_data.sort_by(|a, b| a.id.cmp(&b.id));
        let state = SaveState::from_grid_and_units(&self.grid, &unit_data);
        let json = match serde_json::to_string_pretty(&state) {
            Ok(json) => json,
            Err(e) => {
                println!("Failed to serialize snapshot: {}", e);
                return;
            }
        };
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(&json) {
                    println!("Failed to copy to clipboard: {}", e);
                } else {
                    println!("Battle snapshot copied to clipboard!");
                    // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => {
                println!("Failed to access clipboard: {}", e);
            }
        }
    }

    fn draw(&self) {
        let v = &self.config.visual;
        clear_background(Color::from_rgba(v.background_r, v.background_g, v.background_b, 255));

        let n = self.grid.settings().grid_size;
        let px = self.cell_px();
        let selected_cells: Vec<Cell> = self
            .selected
            .and_then(|i| self.grid.unit_cells(&self.units[i].id))
            .map(|cells| cells.to_vec())
            .unwrap_or_default();

        for y in 0..n {
            for x in 0..n {
                let cell = Cell::new(x, y);
                let color = match self.grid.cell_state(cell) {
                    Some(CellState::Obstacle(ObstacleKind::Block)) => DARKGRAY,
                    Some(CellState::Obstacle(ObstacleKind::Lava)) => ORANGE,
                    Some(CellState::Obstacle(ObstacleKind::Water)) => Color::from_rgba(40, 90, 200, 255),
                    Some(CellState::Obstacle(ObstacleKind::Hole)) => BLACK,
                    Some(CellState::Occupied(id)) => {
                        match self.units.iter().find(|u| &u.id == id).map(|u| u.team) {
                            Some(Team::Upper) => Color::from_rgba(200, 80, 80, 255),
                            Some(Team::Lower) => Color::from_rgba(80, 140, 220, 255),
                            None => GRAY,
                        }
                    }
                    _ => Color::from_rgba(50, 50, 55, 255),
                };
                draw_rectangle(x as f32 * px, y as f32 * px, px - 1.0, px - 1.0, color);

                let reachable = self
                    .move_path
                    .as_ref()
                    .map(|p| p.reachable.contains(&cell))
                    .unwrap_or(false);
                if reachable {
                    draw_rectangle(
                        x as f32 * px,
                        y as f32 * px,
                        px - 1.0,
                        px - 1.0,
                        Color::from_rgba(100, 200, 100, 90),
                    );
                }
                if selected_cells.contains(&cell) {
                    draw_rectangle_lines(x as f32 * px, y as f32 * px, px - 1.0, px - 1.0, 3.0, YELLOW);
                }
                if self.attack_cell == Some(cell) {
                    draw_rectangle_lines(x as f32 * px, y as f32 * px, px - 1.0, px - 1.0, 3.0, PURPLE);
                }
            }
        }

        if self.show_aggression {
            if let Some(index) = self.selected {
                if let Some(aggr) = self.grid.get_enemy_aggr_matrix_by_unit_id(&self.units[index].id) {
                    for y in 0..n {
                        for x in 0..n {
                            let weight = aggr[y as usize][x as usize];
                            if weight > 1 {
                                draw_text(
                                    &weight.to_string(),
                                    x as f32 * px + px * 0.35,
                                    y as f32 * px + px * 0.65,
                                    px * 0.5,
                                    WHITE,
                                );
                            }
                        }
                    }
                }
            }
        }

        let info = [
            "Left click: select unit / move",
            "Right click: pick attack cell on enemy",
            "A: aggression overlay  D: dry center",
            "R: refresh center type  C: copy snapshot",
            "Esc: close window",
        ];
        for (i, line) in info.iter().enumerate() {
            draw_text(line, n as f32 * px + 10.0, 20.0 + i as f32 * 20.0, 18.0, WHITE);
        }
    }
}

fn next_grid_type(grid_type: GridType) -> GridType {
    match grid_type {
        GridType::Normal => GridType::LavaCenter,
        GridType::LavaCenter => GridType::WaterCenter,
        GridType::WaterCenter => GridType::BlockCenter,
        GridType::BlockCenter => GridType::Normal,
    }
}

#[macroquad::main("BattleGrid - Tactical Grid Demo")]
async fn main() {
    let mut state = VisState::new();

    loop {
        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            state.handle_left_click(mx, my);
        }
        if is_mouse_button_pressed(MouseButton::Right) {
            let (mx, my) = mouse_position();
            state.handle_right_click(mx, my);
        }

        if is_key_pressed(KeyCode::A) {
            state.show_aggression = !state.show_aggression;
        }
        if is_key_pressed(KeyCode::D) {
            state.grid.cleanup_center_obstacle();
            println!("Center obstacle region cleaned");
            state.recompute_move_path();
        }
        if is_key_pressed(KeyCode::R) {
            let next = next_grid_type(state.grid.grid_type());
            state.grid.refresh_with_new_type(next);
            println!("Center obstacle region refreshed: {:?}", next);
            state.recompute_move_path();
        }
        if is_key_pressed(KeyCode::C) {
            state.copy_to_clipboard();
        }
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        state.draw();

        next_frame().await
    }
}
