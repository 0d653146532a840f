use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapLoadError;

pub const INFO_FILE: &str = "info.json";

/// Per-level metadata stored next to the layer files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Level loaded when the player enters a change-level trigger.
    pub next: String,
    #[serde(default)]
    pub previous: Option<String>,
}

impl LevelInfo {
    /// Parse level info from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read `info.json` from a level directory.
    pub fn load(dir: &Path) -> Result<Self, MapLoadError> {
        let path = dir.join(INFO_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) => return Err(MapLoadError::Io { path, source }),
        };
        Self::from_json(&text).map_err(|source| MapLoadError::Json { path, source })
    }
}
