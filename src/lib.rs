pub mod attack;
pub mod config;
pub mod grid;
pub mod grid_math;
pub mod path;
pub mod save_state;
pub mod settings;

pub use grid::{CellState, Grid, GridType, Matrix, ObstacleKind, Team};
pub use grid_math::Cell;
pub use path::{MovePath, MoveProfile, PathHelper, WeightedRoute};
pub use settings::GridSettings;
