use crate::settings::GridSettings;

/// A single grid coordinate. Used directly as a set/map key; the engine
/// never packs coordinates into a single integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x + dx, self.y + dy)
    }
}

/// Side of a cell, used to pick which edge a pointer "leads toward"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Chebyshev (king-move) distance between two cells
pub fn chebyshev_distance(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Cells occupied by a unit anchored at `anchor`.
/// Large (2x2) units anchor on the max-x/max-y cell of their footprint.
pub fn footprint_cells(anchor: Cell, is_small_unit: bool) -> Vec<Cell> {
    if is_small_unit {
        vec![anchor]
    } else {
        vec![
            anchor,
            anchor.offset(-1, 0),
            anchor.offset(0, -1),
            anchor.offset(-1, -1),
        ]
    }
}

/// Smallest Chebyshev distance from `cell` to any cell of a footprint
pub fn chebyshev_to_footprint(cell: Cell, footprint: &[Cell]) -> i32 {
    footprint
        .iter()
        .map(|&f| chebyshev_distance(cell, f))
        .min()
        .unwrap_or(i32::MAX)
}

/// In-bounds cells in the 3x3 neighborhood around a world position
pub fn cells_around_position(settings: &GridSettings, x: f32, y: f32) -> Vec<Cell> {
    let center = match settings.cell_at(
        x.clamp(settings.min_x, settings.max_x - settings.half_step),
        y.clamp(settings.min_y, settings.max_y - settings.half_step),
    ) {
        Some(c) => c,
        None => return Vec::new(),
    };

    let mut cells = Vec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            let cell = center.offset(dx, dy);
            if settings.in_bounds(cell) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Intersection point of segments p1-p2 and p3-p4, if any
pub fn segment_intersection(
    p1: (f32, f32),
    p2: (f32, f32),
    p3: (f32, f32),
    p4: (f32, f32),
) -> Option<(f32, f32)> {
    let d1 = (p2.0 - p1.0, p2.1 - p1.1);
    let d2 = (p4.0 - p3.0, p4.1 - p3.1);
    let denom = d1.0 * d2.1 - d1.1 * d2.0;

    if denom.abs() < f32::EPSILON {
        return None; // Parallel or collinear
    }

    let t = ((p3.0 - p1.0) * d2.1 - (p3.1 - p1.1) * d2.0) / denom;
    let u = ((p3.0 - p1.0) * d1.1 - (p3.1 - p1.1) * d1.0) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((p1.0 + t * d1.0, p1.1 + t * d1.1))
    } else {
        None
    }
}

/// Project `to` onto the grid boundary along the segment from `from`,
/// when `to` lies outside the world bounds. Points already inside pass through.
pub fn project_to_grid_edge(settings: &GridSettings, from: (f32, f32), to: (f32, f32)) -> (f32, f32) {
    if to.0 >= settings.min_x
        && to.0 < settings.max_x
        && to.1 >= settings.min_y
        && to.1 < settings.max_y
    {
        return to;
    }

    // Pull the corners in by a hair so the projected point maps to a real cell
    let eps = settings.cell_size * 0.001;
    let lo = (settings.min_x + eps, settings.min_y + eps);
    let hi = (settings.max_x - eps, settings.max_y - eps);
    let edges = [
        (lo, (hi.0, lo.1)),
        ((hi.0, lo.1), hi),
        (hi, (lo.0, hi.1)),
        ((lo.0, hi.1), lo),
    ];

    for (a, b) in edges {
        if let Some(hit) = segment_intersection(from, to, a, b) {
            return hit;
        }
    }

    // `from` was itself outside; fall back to clamping
    (
        to.0.clamp(lo.0, hi.0),
        to.1.clamp(lo.1, hi.1),
    )
}

/// Which side of `cell` the segment from the cell's center toward `point` exits.
/// Used by the attack-cell heuristics to pick the side a pointer leads toward.
pub fn closest_cell_side(settings: &GridSettings, cell: Cell, point: (f32, f32)) -> CellSide {
    let (cx, cy) = settings.cell_center(cell);
    let h = settings.half_step;
    let tl = (cx - h, cy - h);
    let tr = (cx + h, cy - h);
    let bl = (cx - h, cy + h);
    let br = (cx + h, cy + h);

    let sides = [
        (CellSide::Top, tl, tr),
        (CellSide::Bottom, bl, br),
        (CellSide::Left, tl, bl),
        (CellSide::Right, tr, br),
    ];
    for (side, a, b) in sides {
        if segment_intersection((cx, cy), point, a, b).is_some() {
            return side;
        }
    }

    // Point inside the cell: fall back to the dominant axis
    let dx = point.0 - cx;
    let dy = point.1 - cy;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            CellSide::Right
        } else {
            CellSide::Left
        }
    } else if dy >= 0.0 {
        CellSide::Bottom
    } else {
        CellSide::Top
    }
}
