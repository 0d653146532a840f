//! Level editor: pen and rectangle-fill painting on one layer at a time.

use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::assets::map::LevelLayers;
use crate::components::tilemap::{TileCode, TileGrid};
use crate::error::MapLoadError;

/// Terrain brushes in cycling order.
pub const DEFAULT_PALETTE: [&str; 14] = [
    "tr", "wh", "ba", "re", "or", "ye", "gr", "cy", "bu", "pu", "pi", "br", "dg", "lg",
];

/// Brush selected when an editor opens.
pub const DEFAULT_BRUSH: &str = "wh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    /// Paint the tile under the cursor every time the button is held.
    #[default]
    Pen,
    /// Drag a rectangle; cells are written on release.
    Fill,
}

impl BrushMode {
    pub fn toggled(self) -> Self {
        match self {
            BrushMode::Pen => BrushMode::Fill,
            BrushMode::Fill => BrushMode::Pen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    #[default]
    Terrain,
    Entities,
    Triggers,
}

/// Tile rectangle `[col, col + width) x [row, row + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub col: i32,
    pub row: i32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    /// Rectangle spanned by two corners, the larger one exclusive.
    pub fn spanning(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            col: a.0.min(b.0),
            row: a.1.min(b.1),
            width: a.0.abs_diff(b.0),
            height: a.1.abs_diff(b.1),
        }
    }
}

/// An editable copy of a level's three layers.
#[derive(Debug, Clone)]
pub struct EditLevel {
    dir: PathBuf,
    layers: LevelLayers,
    tile_size: f32,
    layer: Layer,
    palette: Vec<TileCode>,
    brush: usize,
    mode: BrushMode,
    anchor: (i32, i32),
    cursor: (i32, i32),
    /// Rectangle shown while a fill drag is in progress.
    preview: Option<TileRect>,
}

impl EditLevel {
    /// Open `<maps_dir>/<name>/` for editing.
    pub fn load(maps_dir: &Path, name: &str, tile_size: f32) -> Result<Self, MapLoadError> {
        let dir = maps_dir.join(name);
        let layers = LevelLayers::load(&dir)?;
        log::info!("editing level {name}: {}x{} tiles", layers.size().0, layers.size().1);
        Ok(Self::new(dir, layers, tile_size))
    }

    /// Editor over in-memory layers; `dir` is where [`EditLevel::save_changes`] writes.
    pub fn new(dir: impl Into<PathBuf>, layers: LevelLayers, tile_size: f32) -> Self {
        let palette: Vec<TileCode> = DEFAULT_PALETTE.iter().filter_map(|c| TileCode::parse(c)).collect();
        let brush = palette
            .iter()
            .position(|c| c.as_str() == DEFAULT_BRUSH)
            .unwrap_or(0);
        Self {
            dir: dir.into(),
            layers,
            tile_size,
            layer: Layer::default(),
            palette,
            brush,
            mode: BrushMode::default(),
            anchor: (0, 0),
            cursor: (0, 0),
            preview: None,
        }
    }

    pub fn layers(&self) -> &LevelLayers {
        &self.layers
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn select_layer(&mut self, layer: Layer) {
        self.layer = layer;
        self.preview = None;
    }

    fn grid_mut(&mut self) -> &mut TileGrid {
        match self.layer {
            Layer::Terrain => &mut self.layers.terrain,
            Layer::Entities => &mut self.layers.entities,
            Layer::Triggers => &mut self.layers.triggers,
        }
    }

    /// Current brush code.
    pub fn brush(&self) -> TileCode {
        self.palette.get(self.brush).copied().unwrap_or(TileCode::EMPTY)
    }

    /// Advance to the next palette entry, wrapping at the end.
    pub fn change_brush(&mut self) -> TileCode {
        if !self.palette.is_empty() {
            self.brush = (self.brush + 1) % self.palette.len();
        }
        log::debug!("brush changed to {}", self.brush());
        self.brush()
    }

    /// Select a specific code, e.g. a spawn or trigger marker. Codes not yet in
    /// the palette are appended to it.
    pub fn set_brush(&mut self, code: TileCode) {
        self.brush = match self.palette.iter().position(|&c| c == code) {
            Some(index) => index,
            None => {
                self.palette.push(code);
                self.palette.len() - 1
            }
        };
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn change_brush_mode(&mut self) -> BrushMode {
        self.mode = self.mode.toggled();
        self.preview = None;
        self.mode
    }

    fn to_tile(&self, pos: Vec2) -> (i32, i32) {
        TileGrid::<TileCode>::world_to_tile(pos, self.tile_size)
    }

    /// Track the cursor in pixels.
    pub fn set_cursor(&mut self, pos: Vec2) {
        self.cursor = self.to_tile(pos);
    }

    /// Start a fill drag at `pos`.
    pub fn set_anchor(&mut self, pos: Vec2) {
        self.anchor = self.to_tile(pos);
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn anchor(&self) -> (i32, i32) {
        self.anchor
    }

    /// Apply the brush. With `clear` the empty tile is written instead.
    ///
    /// Pen mode writes the cursor cell. Fill mode only updates the preview
    /// until `apply`, then writes the anchor-to-cursor rectangle. Returns the
    /// number of cells written; cells outside the grid are skipped.
    pub fn change_tile(&mut self, clear: bool, apply: bool) -> usize {
        let tile = if clear { TileCode::EMPTY } else { self.brush() };
        match self.mode {
            BrushMode::Pen => {
                let (col, row) = self.cursor;
                usize::from(self.grid_mut().set(col, row, tile))
            }
            BrushMode::Fill => {
                let rect = TileRect::spanning(self.anchor, self.cursor);
                if !apply {
                    self.preview = Some(rect);
                    return 0;
                }
                self.preview = None;
                self.grid_mut()
                    .fill_rect(rect.col, rect.row, rect.width, rect.height, tile)
            }
        }
    }

    /// Rectangle of the fill drag in progress, if any.
    pub fn preview(&self) -> Option<TileRect> {
        self.preview
    }

    /// Write all three layers back to the level directory.
    pub fn save_changes(&self) -> Result<(), MapLoadError> {
        self.layers.save(&self.dir)?;
        log::info!("saved level {}", self.dir.display());
        Ok(())
    }
}
