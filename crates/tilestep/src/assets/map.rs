//! Plain-text map layers.
//!
//! A layer is rows separated by newlines, each row a whitespace-separated
//! list of tile codes. A level directory holds `terrain.map`, `entities.map`,
//! `triggers.map` and `info.json`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::components::tilemap::{TileCode, TileGrid};
use crate::error::MapLoadError;

pub const TERRAIN: &str = "terrain";
pub const ENTITIES: &str = "entities";
pub const TRIGGERS: &str = "triggers";

/// `<dir>/<layer>.map`
pub fn layer_path(dir: &Path, layer: &str) -> PathBuf {
    dir.join(format!("{layer}.map"))
}

/// Parse one layer. Trailing blank lines are ignored; any other blank line is
/// a zero-length row and fails the rectangle check.
pub fn parse_layer(layer: &str, text: &str) -> Result<TileGrid, MapLoadError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(MapLoadError::EmptyLayer {
            layer: layer.to_string(),
        });
    }

    let mut rows = Vec::with_capacity(lines.len());
    for (row, line) in lines.iter().enumerate() {
        let tiles = line
            .split_whitespace()
            .enumerate()
            .map(|(col, token)| {
                TileCode::parse(token).ok_or_else(|| MapLoadError::InvalidTileCode {
                    layer: layer.to_string(),
                    row,
                    col,
                    code: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(tiles);
    }

    TileGrid::from_rows(rows).map_err(|e| MapLoadError::RaggedRow {
        layer: layer.to_string(),
        row: e.row,
        expected: e.expected,
        found: e.found,
    })
}

/// Inverse of [`parse_layer`]: codes joined by single spaces, rows by
/// newlines, no trailing newline.
pub fn serialize_layer(grid: &TileGrid) -> String {
    grid.rows()
        .map(|row| row.iter().map(TileCode::as_str).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_layer(dir: &Path, layer: &str) -> Result<TileGrid, MapLoadError> {
    let path = layer_path(dir, layer);
    let text = fs::read_to_string(&path).map_err(|source| MapLoadError::Io { path, source })?;
    parse_layer(layer, &text)
}

fn write_layer(dir: &Path, layer: &str, grid: &TileGrid) -> Result<(), MapLoadError> {
    let path = layer_path(dir, layer);
    fs::write(&path, serialize_layer(grid)).map_err(|source| MapLoadError::Io { path, source })
}

/// The three raw layers of a level, all the same size.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayers {
    pub terrain: TileGrid,
    pub entities: TileGrid,
    pub triggers: TileGrid,
}

impl LevelLayers {
    /// Check that the entity and trigger layers match the terrain's size.
    pub fn new(terrain: TileGrid, entities: TileGrid, triggers: TileGrid) -> Result<Self, MapLoadError> {
        let expected = terrain.size();
        for (layer, grid) in [(ENTITIES, &entities), (TRIGGERS, &triggers)] {
            if grid.size() != expected {
                return Err(MapLoadError::LayerSizeMismatch {
                    layer: layer.to_string(),
                    expected,
                    found: grid.size(),
                });
            }
        }
        Ok(Self {
            terrain,
            entities,
            triggers,
        })
    }

    /// Parse the three layers from in-memory text.
    pub fn parse(terrain: &str, entities: &str, triggers: &str) -> Result<Self, MapLoadError> {
        Self::new(
            parse_layer(TERRAIN, terrain)?,
            parse_layer(ENTITIES, entities)?,
            parse_layer(TRIGGERS, triggers)?,
        )
    }

    pub fn load(dir: &Path) -> Result<Self, MapLoadError> {
        Self::new(
            read_layer(dir, TERRAIN)?,
            read_layer(dir, ENTITIES)?,
            read_layer(dir, TRIGGERS)?,
        )
    }

    /// Overwrite the three layer files in `dir`. `info.json` is untouched.
    pub fn save(&self, dir: &Path) -> Result<(), MapLoadError> {
        write_layer(dir, TERRAIN, &self.terrain)?;
        write_layer(dir, ENTITIES, &self.entities)?;
        write_layer(dir, TRIGGERS, &self.triggers)?;
        log::debug!("saved level layers to {}", dir.display());
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.terrain.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_ignores_trailing_blank_lines() {
        let grid = parse_layer("terrain", "ba ba ba\nba 0 ba\nba ba ba\n\n").unwrap();
        assert_eq!(grid.size(), (3, 3));
        assert_eq!(grid.get(1, 1), Some(TileCode::EMPTY));
        assert_eq!(grid.get(0, 0).map(|t| t.to_string()), Some("ba".to_string()));
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let grid = parse_layer("terrain", "gr gr\r\ngr gr\r\n").unwrap();
        assert_eq!(grid.size(), (2, 2));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_layer("entities", "0 0 0\n0 0\n").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::RaggedRow { row: 1, expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn rejects_empty_layer() {
        assert!(matches!(
            parse_layer("triggers", "\n\n"),
            Err(MapLoadError::EmptyLayer { .. })
        ));
    }

    #[test]
    fn rejects_overlong_codes() {
        let err = parse_layer("terrain", "ba toolong").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::InvalidTileCode { row: 0, col: 1, ref code, .. } if code == "toolong"
        ));
    }

    #[test]
    fn serialize_has_no_trailing_newline() {
        let text = "ba ba\nba 0";
        let grid = parse_layer("terrain", text).unwrap();
        assert_eq!(serialize_layer(&grid), text);
    }

    #[test]
    fn layer_sizes_must_match() {
        let err = LevelLayers::parse("ba ba\nba ba", "0 0\n0 0", "0 0 0\n0 0 0").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::LayerSizeMismatch { expected: (2, 2), found: (3, 2), .. }
        ));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut layers = LevelLayers::parse("ba ba\nba ba", "SP 0\n0 0", "0 CL\n0 0").unwrap();
        layers.terrain.set(1, 1, TileCode::parse("gr").unwrap());
        layers.save(dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("terrain.map")).unwrap(),
            "ba ba\nba gr"
        );
        assert_eq!(LevelLayers::load(dir.path()).unwrap(), layers);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        match LevelLayers::load(dir.path()) {
            Err(MapLoadError::Io { path, .. }) => assert!(path.ends_with("terrain.map")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
