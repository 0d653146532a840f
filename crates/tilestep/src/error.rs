//! Error types for level loading and collision scans.

use std::path::PathBuf;
use thiserror::Error;

/// A level could not be entered.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("layer `{layer}` has no rows")]
    EmptyLayer { layer: String },
    #[error("layer `{layer}` row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        layer: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layer `{layer}` is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    LayerSizeMismatch {
        layer: String,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("layer `{layer}` has invalid tile code {code:?} at row {row}, column {col}")]
    InvalidTileCode {
        layer: String,
        row: usize,
        col: usize,
        code: String,
    },
}

/// A swept scan reached a cell outside the grid.
///
/// Grids are expected to be bordered with solid tiles, so this means the
/// level data is broken. It is never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollisionError {
    #[error("collision scan left the grid at column {col}, row {row} (grid is {width}x{height})")]
    OutOfBounds {
        col: i32,
        row: i32,
        width: u32,
        height: u32,
    },
}

/// Anything a [`Session`](crate::api::game::Session) can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] MapLoadError),
    #[error(transparent)]
    Collision(#[from] CollisionError),
}

/// A config or preferences file could not be read or written.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
