use crate::grid::GridType;
use crate::settings::GridSettings;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub battle: BattleConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub size: i32,
    #[serde(default = "default_min_coord")]
    pub min_x: f32,
    #[serde(default = "default_max_coord")]
    pub max_x: f32,
    #[serde(default = "default_min_coord")]
    pub min_y: f32,
    #[serde(default = "default_max_coord")]
    pub max_y: f32,
    #[serde(default = "default_grid_type")]
    pub grid_type: String,
}

#[derive(Debug, Deserialize)]
pub struct BattleConfig {
    #[serde(default = "default_steps")]
    pub default_steps: u32,
    #[serde(default = "default_attack_range")]
    pub default_attack_range: i32,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_cell_px")]
    pub cell_px: f32,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
    #[serde(default = "default_show_aggression")]
    pub show_aggression: bool,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

// Default values
fn default_grid_size() -> i32 { 16 }
fn default_min_coord() -> f32 { 0.0 }
fn default_max_coord() -> f32 { 1024.0 }
fn default_grid_type() -> String { "normal".to_string() }
fn default_steps() -> u32 { 4 }
fn default_attack_range() -> i32 { 1 }
fn default_window_title() -> String { "BattleGrid - Tactical Grid Demo".to_string() }
fn default_cell_px() -> f32 { 40.0 }
fn default_bg_r() -> u8 { 24 }
fn default_bg_g() -> u8 { 24 }
fn default_bg_b() -> u8 { 28 }
fn default_show_aggression() -> bool { false }
fn default_snapshot_path() -> String { "battle_snapshot.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            min_x: default_min_coord(),
            max_x: default_max_coord(),
            min_y: default_min_coord(),
            max_y: default_max_coord(),
            grid_type: default_grid_type(),
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            default_steps: default_steps(),
            default_attack_range: default_attack_range(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            cell_px: default_cell_px(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
            show_aggression: default_show_aggression(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            battle: BattleConfig::default(),
            visual: VisualConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Self {
        match fs::read_to_string("config.toml") {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    println!("Loaded configuration from config.toml");
                    config
                }
                Err(e) => {
                    eprintln!("Warning: Failed to parse config.toml: {}", e);
                    eprintln!("Using default configuration");
                    Config::default()
                }
            },
            Err(_) => {
                println!("No config.toml found, using default configuration");
                Config::default()
            }
        }
    }

    pub fn grid_settings(&self) -> GridSettings {
        GridSettings::new(
            self.grid.size,
            self.grid.min_x,
            self.grid.max_x,
            self.grid.min_y,
            self.grid.max_y,
        )
    }

    pub fn grid_type(&self) -> GridType {
        match self.grid.grid_type.as_str() {
            "lava_center" => GridType::LavaCenter,
            "water_center" => GridType::WaterCenter,
            "block_center" => GridType::BlockCenter,
            _ => GridType::Normal,
        }
    }
}
