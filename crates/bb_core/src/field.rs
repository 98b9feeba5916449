//! Static field layout: canvas bounds, the 5x5 query grid and goal mouths.
//!
//! The `Field` value is built once by the host and passed by reference into
//! the engine; there are no process-wide layout globals.

use crate::geometry::Point;

/// Simulation tunables, grouped like a physics constants table.
pub mod consts {
    pub const CANVAS_WIDTH: f32 = 456.0;
    pub const CANVAS_HEIGHT: f32 = 554.0;
    pub const WIDTH_MARGIN: f32 = 28.0;
    pub const HEIGHT_MARGIN: f32 = 27.0;
    pub const FIELD_WIDTH: f32 = CANVAS_WIDTH - 2.0 * WIDTH_MARGIN;
    pub const FIELD_HEIGHT: f32 = CANVAS_HEIGHT - 2.0 * HEIGHT_MARGIN;

    pub const COLUMNS_COUNT: usize = 5;
    pub const ROWS_COUNT: usize = 5;

    pub const GOAL_WIDTH: f32 = 112.0;
    pub const GOAL_DETECTION_MARGIN: f32 = 5.0;

    /// Match clock units per period; the clock advances by `CLOCK_STEP`
    /// per tick while the game is live.
    pub const PERIOD_DURATION: f32 = 45.0;
    pub const CLOCK_STEP: f32 = 0.05;

    pub const OPPONENTS_COLLISION_DIST: f32 = 40.0;
    pub const OPPONENTS_AVOID_DIST: f32 = OPPONENTS_COLLISION_DIST * 1.5;
    pub const TEAMMATES_COLLISION_DIST: f32 = 20.0;
    pub const BALL_CATCHING_DIST: f32 = 20.0;
    pub const MOVE_THRESHOLD: f32 = 15.0;

    pub const SHOT_VELOCITY_MAX: f32 = 18.0;
    pub const SHOT_VELOCITY_ERROR_MARGIN: f32 = 0.10;
    /// Shot aim error, in degrees.
    pub const SHOT_ANGLE_ERROR_MARGIN: f32 = 10.0;
    /// Ticks the ball must be held before it can be released again.
    pub const MIN_OWNING_TICKS: u32 = 5;

    pub const BALL_OWNER_VELOCITY: f32 = 0.8;
    pub const NON_BALL_OWNER_VELOCITY: f32 = 1.0;
    pub const SPRINTING_VELOCITY_FACTOR: f32 = 2.0;

    /// Ticks a player must keep calling before the pass is forced.
    pub const CALLER_WAIT_TICKS: u32 = 20;
    /// Ticks a pushed player stays staggered before resuming play.
    pub const PUSHED_COOLDOWN_TICKS: u32 = 20;
}

/// One column or row band of the query grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub start: f32,
    pub end: f32,
}

/// Immutable field layout. Grid bands partition the playable rectangle
/// exactly: each band starts where the previous one ends.
#[derive(Debug, Clone)]
pub struct Field {
    columns: [Band; consts::COLUMNS_COUNT],
    rows: [Band; consts::ROWS_COUNT],
    own_goal: Point,
    opp_goal: Point,
}

impl Field {
    pub fn new() -> Self {
        let mut columns = [Band { start: 0.0, end: 0.0 }; consts::COLUMNS_COUNT];
        let mut rows = [Band { start: 0.0, end: 0.0 }; consts::ROWS_COUNT];
        for (col, band) in columns.iter_mut().enumerate() {
            band.start =
                consts::WIDTH_MARGIN + consts::FIELD_WIDTH * col as f32 / consts::COLUMNS_COUNT as f32;
            band.end = consts::WIDTH_MARGIN
                + consts::FIELD_WIDTH * (col + 1) as f32 / consts::COLUMNS_COUNT as f32;
        }
        for (row, band) in rows.iter_mut().enumerate() {
            band.start =
                consts::HEIGHT_MARGIN + consts::FIELD_HEIGHT * row as f32 / consts::ROWS_COUNT as f32;
            band.end = consts::HEIGHT_MARGIN
                + consts::FIELD_HEIGHT * (row + 1) as f32 / consts::ROWS_COUNT as f32;
        }
        Self {
            columns,
            rows,
            own_goal: Point::new(
                consts::WIDTH_MARGIN + consts::FIELD_WIDTH / 2.0,
                consts::CANVAS_HEIGHT - consts::HEIGHT_MARGIN,
            ),
            opp_goal: Point::new(consts::WIDTH_MARGIN + consts::FIELD_WIDTH / 2.0, consts::HEIGHT_MARGIN),
        }
    }

    /// Center of the own team's goal mouth (bottom of the canvas).
    pub fn own_goal(&self) -> Point {
        self.own_goal
    }

    /// Center of the opponent goal mouth (top of the canvas).
    pub fn opp_goal(&self) -> Point {
        self.opp_goal
    }

    /// Center point of grid cell (`col`, `row`), both 1-based. When `invert`
    /// is set the indices are mirrored (`6 - col`, `6 - row`) so both teams
    /// can address "their" side symmetrically.
    pub fn grid_cell(&self, invert: bool, col: u8, row: u8) -> Point {
        let col = if invert { 6 - col } else { col };
        let row = if invert { 6 - row } else { row };
        let col_band = self.columns[col as usize - 1];
        let row_band = self.rows[row as usize - 1];
        Point::new((col_band.start + col_band.end) / 2.0, (row_band.start + row_band.end) / 2.0)
    }

    /// Whether `point` lies in grid cell (`col`, `row`). A 0 index is a
    /// wildcard matching the whole axis.
    pub fn cell_contains(&self, point: Point, invert: bool, col: u8, row: u8) -> bool {
        let col = if col == 0 || !invert { col } else { 6 - col };
        let row = if row == 0 || !invert { row } else { 6 - row };
        if col != 0 {
            let band = self.columns[col as usize - 1];
            if point.x < band.start || point.x > band.end {
                return false;
            }
        }
        if row != 0 {
            let band = self.rows[row as usize - 1];
            if point.y < band.start || point.y > band.end {
                return false;
            }
        }
        true
    }

    /// Kickoff spot: the center cell.
    pub fn center(&self) -> Point {
        self.grid_cell(false, 3, 3)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
