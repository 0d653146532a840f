use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::animation::SpriteSheet;
use crate::components::combat::{AiControlled, Combatant, Loadout, Projectile};
use crate::components::tilemap::{TileCode, TriggerTile};
use crate::core::physics::Contact;

/// Which update logic drives an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Cosmetic, animation only.
    Idle,
    /// Physics only.
    Movable,
    Bullet,
    /// Physics only; can jump.
    Character,
    /// Physics plus AI interaction with enemies.
    Fighter,
    Player,
}

/// Velocity, movement tuning and the collision outcomes of the latest tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Kinetic {
    /// px/ms.
    pub speed: Vec2,
    pub max_speed: f32,
    /// px/ms².
    pub acceleration: f32,
    /// Gravity multiplier.
    pub weight: f32,
    /// Upward speed set by a jump. Zero for things that cannot jump.
    pub jump_strength: f32,
    pub on_ground: bool,
    /// Terrain contact of the last X pass.
    pub collided_x: Contact<TileCode>,
    /// Terrain contact of the last Y pass. Its code selects next tick's friction.
    pub collided_y: Contact<TileCode>,
    /// Trigger contact of the last tick; X wins over Y when both are set.
    pub triggered: Contact<TriggerTile>,
}

impl Kinetic {
    pub fn new(max_speed: f32, acceleration: f32, weight: f32) -> Self {
        Self {
            speed: Vec2::ZERO,
            max_speed,
            acceleration,
            weight,
            jump_strength: 0.0,
            on_ground: false,
            collided_x: Contact::empty(0, 0),
            collided_y: Contact::empty(0, 0),
            triggered: Contact::empty(0, 0),
        }
    }

    pub fn with_jump(mut self, jump_strength: f32) -> Self {
        self.jump_strength = jump_strength;
        self
    }

    pub fn with_speed(mut self, speed: Vec2) -> Self {
        self.speed = speed;
        self
    }

    pub fn move_right(&mut self, dt: f32) {
        let dv = self.acceleration * dt;
        if self.speed.x < self.max_speed + dv {
            self.speed.x += dv;
        }
    }

    pub fn move_left(&mut self, dt: f32) {
        let dv = self.acceleration * dt;
        if self.speed.x > -self.max_speed - dv {
            self.speed.x -= dv;
        }
    }

    /// Jump if standing on the ground.
    pub fn jump(&mut self) -> bool {
        if !self.on_ground {
            return false;
        }
        self.speed.y = -self.jump_strength;
        self.on_ground = false;
        true
    }

    /// Whether the last X pass ended against terrain.
    pub fn blocked_x(&self) -> bool {
        self.collided_x.is_hit()
    }
}

/// Fat Entity: one struct whose optional capabilities decide what it can do.
///
/// Position is the top-left corner of the bounding box in pixels.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub sheet: Option<SpriteSheet>,
    pub kinetic: Option<Kinetic>,
    pub combat: Option<Combatant>,
    pub ai: Option<AiControlled>,
    pub loadout: Option<Loadout>,
    pub projectile: Option<Projectile>,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::ZERO,
            size: Vec2::ONE,
            health: 1,
            max_health: 1,
            alive: true,
            sheet: None,
            kinetic: None,
            combat: None,
            ai: None,
            loadout: None,
            projectile: None,
        }
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self.health = max_health;
        self
    }

    pub fn with_sheet(mut self, sheet: SpriteSheet) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_kinetic(mut self, kinetic: Kinetic) -> Self {
        self.kinetic = Some(kinetic);
        self
    }

    pub fn with_combat(mut self, combat: Combatant) -> Self {
        self.combat = Some(combat);
        self
    }

    pub fn with_ai(mut self, ai: AiControlled) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_loadout(mut self, loadout: Loadout) -> Self {
        self.loadout = Some(loadout);
        self
    }

    pub fn with_projectile(mut self, projectile: Projectile) -> Self {
        self.projectile = Some(projectile);
        self
    }

    // -- Presets placed by entity-layer markers --

    /// `TM`: a heavy box that only falls.
    pub fn test_movable(id: EntityId, pos: Vec2) -> Self {
        Entity::new(id, EntityKind::Movable)
            .with_pos(pos)
            .with_size(Vec2::splat(64.0))
            .with_health(100)
            .with_kinetic(Kinetic::new(0.0, 0.0, 1.0))
    }

    /// `TF`: a melee fighter that chases the player.
    pub fn test_fighter(id: EntityId, pos: Vec2) -> Self {
        Entity::new(id, EntityKind::Fighter)
            .with_pos(pos)
            .with_size(Vec2::splat(64.0))
            .with_health(100)
            .with_kinetic(Kinetic::new(0.7, 0.01, 1.0).with_jump(1.5))
            .with_combat(Combatant::new(15, 120.0, 1000.0))
            .with_ai(AiControlled { vision_range: 300.0 })
    }

    // -- Queries --

    /// Bounding-box center: the AI distance anchor and firing origin.
    pub fn eyes(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.health -= damage;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Whether bullets can hit this entity.
    pub fn is_target(&self) -> bool {
        self.alive && self.kind != EntityKind::Bullet
    }
}
