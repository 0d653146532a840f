//! Headless core of a tile-based 2D platformer.
//!
//! Levels are three plain-text tile layers plus `info.json`. A [`World`]
//! simulates one level's entities against the terrain with per-axis swept
//! collision; a [`Session`] switches between menu, play and edit screens and
//! maps input onto them. Rendering, audio and windowing belong to the driver.

pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod editor;
pub mod error;
pub mod input;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::game::{GameConfig, Hud, PlayerConfig, Screen, Session};
pub use api::types::{EntityId, GameEvent};
pub use assets::level_info::LevelInfo;
pub use assets::map::{parse_layer, serialize_layer, LevelLayers};
pub use assets::settings::Preferences;
pub use components::animation::SpriteSheet;
pub use components::combat::{AiControlled, Combatant, Loadout, Projectile, ShootingWeapon};
pub use components::entity::{Entity, EntityKind, Kinetic};
pub use components::tilemap::{SpawnKind, Tile, TileCode, TileGrid, TriggerTile};
pub use core::physics::{Contact, PhysicsConfig, ScanArea};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, FpsCounter};
pub use core::world::World;
pub use editor::{BrushMode, EditLevel, Layer, TileRect};
pub use error::{CollisionError, ConfigError, EngineError, MapLoadError};
pub use input::queue::{InputEvent, InputQueue, InputState, Key, MouseButton};
pub use systems::movement::LevelGrids;
