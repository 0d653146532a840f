//! Tile codes and the layered tile grid.
//!
//! A level is three parallel grids of short opaque codes: terrain, triggers and
//! entity spawns. `"0"` is the empty cell. Codes are resolved into closed enums
//! ([`TriggerTile`], [`SpawnKind`]) once at load time so the tick loop never
//! matches strings.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A grid cell value. Every tile type has a distinguished empty value.
pub trait Tile: Copy + PartialEq + fmt::Debug {
    const EMPTY: Self;

    fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

/// Rejected tile code token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tile code {0:?}")]
pub struct InvalidTileCode(pub String);

/// A raw tile code as written in map files: 1 to 4 printable ASCII bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileCode {
    bytes: [u8; TileCode::MAX_LEN],
    len: u8,
}

impl TileCode {
    pub const MAX_LEN: usize = 4;

    pub const EMPTY: TileCode = TileCode::from_ascii("0");
    pub const PLAYER_SPAWN: TileCode = TileCode::from_ascii("SP");
    pub const TEST_MOVABLE: TileCode = TileCode::from_ascii("TM");
    pub const TEST_FIGHTER: TileCode = TileCode::from_ascii("TF");
    pub const CHANGE_LEVEL: TileCode = TileCode::from_ascii("CL");

    const fn from_ascii(s: &str) -> Self {
        let src = s.as_bytes();
        let mut bytes = [0u8; Self::MAX_LEN];
        let mut i = 0;
        while i < src.len() {
            bytes[i] = src[i];
            i += 1;
        }
        Self {
            bytes,
            len: src.len() as u8,
        }
    }

    /// Parse a single whitespace-free token.
    pub fn parse(token: &str) -> Option<Self> {
        let valid = !token.is_empty()
            && token.len() <= Self::MAX_LEN
            && token.bytes().all(|b| b.is_ascii_graphic());
        valid.then(|| Self::from_ascii(token))
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("0")
    }
}

impl Tile for TileCode {
    const EMPTY: Self = TileCode::from_ascii("0");
}

impl Default for TileCode {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileCode({:?})", self.as_str())
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileCode {
    type Err = InvalidTileCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidTileCode(s.to_string()))
    }
}

impl TryFrom<String> for TileCode {
    type Error = InvalidTileCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TileCode> for String {
    fn from(code: TileCode) -> Self {
        code.as_str().to_string()
    }
}

/// A trigger-layer cell, resolved from its code at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerTile {
    #[default]
    None,
    /// `CL`: move on to the level named by the level info's `next` field.
    ChangeLevel,
    /// Any other non-empty code. Not solid, no built-in behavior.
    Marker(TileCode),
}

impl TriggerTile {
    pub fn from_code(code: TileCode) -> Self {
        if code == TileCode::EMPTY {
            TriggerTile::None
        } else if code == TileCode::CHANGE_LEVEL {
            TriggerTile::ChangeLevel
        } else {
            TriggerTile::Marker(code)
        }
    }

    pub fn code(&self) -> TileCode {
        match *self {
            TriggerTile::None => TileCode::EMPTY,
            TriggerTile::ChangeLevel => TileCode::CHANGE_LEVEL,
            TriggerTile::Marker(code) => code,
        }
    }
}

impl Tile for TriggerTile {
    const EMPTY: Self = TriggerTile::None;
}

/// What an entity-layer marker spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    PlayerSpawn,
    TestMovable,
    TestFighter,
}

impl SpawnKind {
    /// `None` for the empty code and for codes with no spawn meaning.
    pub fn from_code(code: TileCode) -> Option<Self> {
        if code == TileCode::PLAYER_SPAWN {
            Some(SpawnKind::PlayerSpawn)
        } else if code == TileCode::TEST_MOVABLE {
            Some(SpawnKind::TestMovable)
        } else if code == TileCode::TEST_FIGHTER {
            Some(SpawnKind::TestFighter)
        } else {
            None
        }
    }
}

/// Row-length mismatch found while building a grid from rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaggedRow {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

/// Rectangular grid of tiles.
///
/// Tiles are stored in row-major order: index = row * width + col.
/// Coordinates are signed so swept scans can step past the origin and be
/// rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid<T = TileCode> {
    width: u32,
    height: u32,
    tiles: Vec<T>,
}

impl<T: Tile> TileGrid<T> {
    /// Create a grid filled with the empty tile.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![T::EMPTY; (width * height) as usize],
        }
    }

    /// Build from rows, all of which must have the first row's length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, RaggedRow> {
        let width = rows.first().map_or(0, Vec::len);
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(RaggedRow {
                    row: index,
                    expected: width,
                    found: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }
        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            tiles,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.width || row as u32 >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Tile at (col, row), or `None` outside the grid.
    pub fn get(&self, col: i32, row: i32) -> Option<T> {
        self.index(col, row).map(|i| self.tiles[i])
    }

    /// Write a tile. Returns false (and writes nothing) outside the grid.
    pub fn set(&mut self, col: i32, row: i32, tile: T) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Fill `w` x `h` tiles starting at (col, row). Cells outside the grid are
    /// skipped. Returns the number of cells written.
    pub fn fill_rect(&mut self, col: i32, row: i32, w: u32, h: u32, tile: T) -> usize {
        let mut written = 0;
        for r in row..row + h as i32 {
            for c in col..col + w as i32 {
                if self.set(c, r, tile) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Reset every cell to the empty tile.
    pub fn clear(&mut self) {
        self.tiles.fill(T::EMPTY);
    }

    /// Convert every cell into another tile type.
    pub fn map<U: Tile>(&self, f: impl FnMut(T) -> U) -> TileGrid<U> {
        TileGrid {
            width: self.width,
            height: self.height,
            tiles: self.tiles.iter().copied().map(f).collect(),
        }
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.tiles.chunks(self.width.max(1) as usize)
    }

    /// Non-empty cells as (col, row, tile).
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, T)> + '_ {
        let width = self.width.max(1) as usize;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_empty())
            .map(move |(i, t)| ((i % width) as i32, (i / width) as i32, *t))
    }

    /// Count of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_empty()).count()
    }

    /// Total capacity in tiles.
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    /// Tile containing a pixel position (floor division, may be out of range).
    pub fn world_to_tile(pos: Vec2, tile_size: f32) -> (i32, i32) {
        (
            (pos.x / tile_size).floor() as i32,
            (pos.y / tile_size).floor() as i32,
        )
    }

    /// Top-left pixel corner of a tile.
    pub fn tile_to_world(col: i32, row: i32, tile_size: f32) -> Vec2 {
        Vec2::new(col as f32 * tile_size, row as f32 * tile_size)
    }

    /// Whether every edge cell is non-empty, which keeps swept scans of
    /// anything inside the grid from reaching past it.
    pub fn is_bordered(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let (w, h) = (self.width as i32, self.height as i32);
        let solid = |c: i32, r: i32| self.get(c, r).is_some_and(|t| !t.is_empty());
        (0..w).all(|c| solid(c, 0) && solid(c, h - 1))
            && (0..h).all(|r| solid(0, r) && solid(w - 1, r))
    }
}
