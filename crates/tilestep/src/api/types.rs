use glam::Vec2;

use crate::components::entity::EntityKind;

/// Unique identifier for an entity in a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved for the player, who outlives levels.
    pub const PLAYER: EntityId = EntityId(0);
}

/// Something that happened during a tick, for the driver to react to
/// (sounds, score, screen shake).
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A bullet struck an entity.
    BulletHit { target: EntityId, damage: i32 },
    /// A bullet struck terrain or a trigger and left a spark.
    BulletImpact { pos: Vec2 },
    /// An entity ran out of health and was removed.
    EntityDied { id: EntityId, kind: EntityKind },
    /// The player entered a change-level trigger.
    LevelTransition { next: String },
}
