//! Swept axis-aligned collision against a tile grid.
//!
//! Motion is resolved one axis at a time. For each axis the swept path of the
//! box is turned into a [`ScanArea`] in tile coordinates, and the grid is walked
//! outer loop along the motion (in the direction of travel), inner loop across
//! it. The first non-empty tile met is the contact. When nothing is hit the
//! result is the last visited cell with its (empty) tile, not an absent value.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::tilemap::{Tile, TileCode, TileGrid};
use crate::error::CollisionError;

/// World physics constants. Speeds are px/ms, time is ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Edge length of one tile in pixels.
    pub tile_size: f32,
    /// Downward acceleration in px/ms², scaled by entity weight.
    pub gravity: f32,
    /// Horizontal speed multiplier applied once per tick, keyed by the code of
    /// the tile last touched on the Y axis. Unlisted codes use 1.0.
    pub friction: HashMap<TileCode, f32>,
    /// Horizontal speeds below this magnitude snap to zero after friction.
    pub rest_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let friction = [("0", 1.0), ("gr", 0.95), ("pu", 0.95), ("ye", 0.95)]
            .into_iter()
            .filter_map(|(code, k)| Some((TileCode::parse(code)?, k)))
            .collect();
        Self {
            tile_size: 16.0,
            gravity: 0.005,
            friction,
            rest_threshold: 1e-4,
        }
    }
}

impl PhysicsConfig {
    pub fn friction_for(&self, code: TileCode) -> f32 {
        self.friction.get(&code).copied().unwrap_or(1.0)
    }

    /// Speed gained from gravity over `dt` ms.
    pub fn gravity_step(&self, weight: f32, dt: f32) -> f32 {
        self.gravity * weight * dt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Tile region covered by a box sweeping along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanArea {
    pub axis: Axis,
    /// First index along the motion axis.
    pub start: i32,
    /// Exclusive bound along the motion axis, approached by stepping `vector`.
    pub end: i32,
    /// Inclusive lower bound across the motion axis.
    pub across_start: i32,
    /// Exclusive upper bound across the motion axis.
    pub across_end: i32,
    /// +1 for non-negative displacement, -1 otherwise.
    pub vector: i32,
}

impl ScanArea {
    fn contains_along(&self, index: i32) -> bool {
        if self.vector > 0 {
            index < self.end
        } else {
            index > self.end
        }
    }

    /// Number of lines scanned along the motion axis.
    pub fn span(&self) -> i32 {
        (self.end - self.start).abs()
    }

    fn cell(&self, along: i32, across: i32) -> (i32, i32) {
        match self.axis {
            Axis::X => (along, across),
            Axis::Y => (across, along),
        }
    }
}

fn tile_floor(v: f32, tile_size: f32) -> i32 {
    (v / tile_size).floor() as i32
}

/// Scan area for horizontal displacement `d` of the box at `pos` with `size`.
pub fn area_x(pos: Vec2, size: Vec2, d: f32, tile_size: f32) -> ScanArea {
    let f = |v: f32| tile_floor(v, tile_size);
    let across_start = f(pos.y);
    let across_end = f(pos.y + size.y - 1.0) + 1;
    if d >= 0.0 {
        ScanArea {
            axis: Axis::X,
            start: f(pos.x + size.x - 1.0),
            end: f(pos.x + size.x + d) + 1,
            across_start,
            across_end,
            vector: 1,
        }
    } else {
        ScanArea {
            axis: Axis::X,
            start: f(pos.x),
            end: f(pos.x + d - 1.0) - 1,
            across_start,
            across_end,
            vector: -1,
        }
    }
}

/// Scan area for vertical displacement `d`. Positive `d` is downward.
pub fn area_y(pos: Vec2, size: Vec2, d: f32, tile_size: f32) -> ScanArea {
    let f = |v: f32| tile_floor(v, tile_size);
    if d >= 0.0 {
        ScanArea {
            axis: Axis::Y,
            start: f(pos.y + size.y - 1.0),
            end: f(pos.y + size.y + d) + 1,
            across_start: f(pos.x),
            across_end: f(pos.x + size.x - 1.0) + 1,
            vector: 1,
        }
    } else {
        ScanArea {
            axis: Axis::Y,
            start: f(pos.y),
            end: f(pos.y + d - tile_size - 1.0),
            across_start: f(pos.x),
            across_end: f(pos.x + size.x + tile_size - 1.0),
            vector: -1,
        }
    }
}

/// Result of a scan: a tile cell and what was found there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact<T> {
    pub col: i32,
    pub row: i32,
    pub tile: T,
}

impl<T: Tile> Contact<T> {
    pub fn empty(col: i32, row: i32) -> Self {
        Self {
            col,
            row,
            tile: T::EMPTY,
        }
    }

    /// Empty contact at the cell containing a pixel position.
    pub fn empty_at(pos: Vec2, tile_size: f32) -> Self {
        Self::empty(tile_floor(pos.x, tile_size), tile_floor(pos.y, tile_size))
    }

    pub fn is_hit(&self) -> bool {
        !self.tile.is_empty()
    }

    pub fn cell(&self) -> (i32, i32) {
        (self.col, self.row)
    }

    /// Top-left pixel corner of the contact cell.
    pub fn origin(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.col as f32 * tile_size, self.row as f32 * tile_size)
    }
}

/// Walk `area` over `grid` and return the first non-empty tile in sweep order.
///
/// Falls through to the last visited cell when the region is clear. Any cell
/// outside the grid is an error.
pub fn scan<T: Tile>(area: &ScanArea, grid: &TileGrid<T>) -> Result<Contact<T>, CollisionError> {
    let (first_col, first_row) = area.cell(area.start, area.across_start);
    let mut last = Contact::empty(first_col, first_row);
    let mut along = area.start;
    while area.contains_along(along) {
        for across in area.across_start..area.across_end {
            let (col, row) = area.cell(along, across);
            let tile = grid.get(col, row).ok_or(CollisionError::OutOfBounds {
                col,
                row,
                width: grid.width(),
                height: grid.height(),
            })?;
            if !tile.is_empty() {
                return Ok(Contact { col, row, tile });
            }
            last = Contact { col, row, tile };
        }
        along += area.vector;
    }
    Ok(last)
}

/// Edge-inclusive rectangle intersection.
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x <= b_pos.x + b_size.x
        && b_pos.x <= a_pos.x + a_size.x
        && a_pos.y <= b_pos.y + b_size.y
        && b_pos.y <= a_pos.y + a_size.y
}
