//! One loaded level: its grids, its entity collections and the tick pipeline.

use std::path::Path;

use glam::Vec2;

use crate::api::types::{EntityId, GameEvent};
use crate::assets::level_info::LevelInfo;
use crate::assets::map::LevelLayers;
use crate::components::entity::{Entity, EntityKind};
use crate::components::tilemap::{SpawnKind, TileCode, TileGrid, TriggerTile};
use crate::core::physics::PhysicsConfig;
use crate::core::scene::Scene;
use crate::error::{CollisionError, MapLoadError};
use crate::systems::animation::tick_animations;
use crate::systems::combat;
use crate::systems::movement::{self, LevelGrids};

/// A playable level instance.
///
/// Entities live in one [`Scene`] per kind and are updated phase by phase:
/// bullets, idles, movables, characters, fighters. The player is owned by the
/// caller so it survives level changes, and is passed into each tick.
#[derive(Debug)]
pub struct World {
    name: String,
    info: LevelInfo,
    grids: LevelGrids,
    physics: PhysicsConfig,
    spawn_point: Vec2,
    pub idles: Scene,
    pub movables: Scene,
    pub bullets: Scene,
    pub characters: Scene,
    pub fighters: Scene,
    next_id: u32,
    /// Trigger cell the player touched last tick, for edge detection.
    last_trigger: Option<(i32, i32)>,
    pending_transition: Option<String>,
    events: Vec<GameEvent>,
}

fn allocate(next_id: &mut u32) -> EntityId {
    let id = EntityId(*next_id);
    *next_id += 1;
    id
}

/// Compact a scene, reporting entities that died of damage.
fn reap(scene: &mut Scene, events: &mut Vec<GameEvent>) {
    for dead in scene.remove_dead() {
        if dead.is_dead() {
            log::debug!("{:?} {:?} died", dead.kind, dead.id);
            events.push(GameEvent::EntityDied {
                id: dead.id,
                kind: dead.kind,
            });
        }
    }
}

/// Physics-only phase shared by movables and characters.
fn update_bodies(
    scene: &mut Scene,
    grids: &LevelGrids,
    physics: &PhysicsConfig,
    events: &mut Vec<GameEvent>,
    dt: f32,
) -> Result<(), CollisionError> {
    for entity in scene.iter_mut() {
        movement::integrate(entity, grids, physics, dt)?;
        if entity.is_dead() {
            entity.alive = false;
        }
    }
    reap(scene, events);
    Ok(())
}

impl World {
    /// Load `<maps_dir>/<name>/` from disk.
    pub fn load(maps_dir: &Path, name: &str, physics: &PhysicsConfig) -> Result<Self, MapLoadError> {
        let dir = maps_dir.join(name);
        let layers = LevelLayers::load(&dir)?;
        let info = LevelInfo::load(&dir)?;
        Ok(Self::from_layers(name, info, layers, physics.clone()))
    }

    /// Build a level from parsed layers, resolving trigger codes and spawning
    /// every entity marker.
    pub fn from_layers(
        name: impl Into<String>,
        info: LevelInfo,
        layers: LevelLayers,
        physics: PhysicsConfig,
    ) -> Self {
        let name = name.into();
        if !layers.terrain.is_bordered() {
            log::warn!("level {name}: terrain is not bordered by solid tiles, scans may leave the grid");
        }

        let (width, height) = layers.size();
        let grids = LevelGrids {
            triggers: layers.triggers.map(TriggerTile::from_code),
            terrain: layers.terrain,
        };

        let mut world = Self {
            name,
            info,
            grids,
            physics,
            spawn_point: Vec2::ZERO,
            idles: Scene::new(),
            movables: Scene::new(),
            bullets: Scene::new(),
            characters: Scene::new(),
            fighters: Scene::new(),
            next_id: EntityId::PLAYER.0 + 1,
            last_trigger: None,
            pending_transition: None,
            events: Vec::new(),
        };
        world.spawn_markers(&layers.entities);

        log::info!(
            "level {} loaded: {}x{} tiles, {} movables, {} fighters",
            world.name,
            width,
            height,
            world.movables.len(),
            world.fighters.len(),
        );
        world
    }

    fn spawn_markers(&mut self, markers: &TileGrid) {
        let ts = self.physics.tile_size;
        let mut found_spawn = false;
        for (col, row, code) in markers.occupied() {
            let pos = TileGrid::<TileCode>::tile_to_world(col, row, ts);
            match SpawnKind::from_code(code) {
                Some(SpawnKind::PlayerSpawn) => {
                    self.spawn_point = pos;
                    found_spawn = true;
                }
                Some(SpawnKind::TestMovable) => {
                    self.spawn(|id| Entity::test_movable(id, pos));
                }
                Some(SpawnKind::TestFighter) => {
                    self.spawn(|id| Entity::test_fighter(id, pos));
                }
                None => log::warn!(
                    "level {}: unknown spawn code {code} at ({col}, {row}), skipped",
                    self.name
                ),
            }
        }
        if !found_spawn {
            log::warn!("level {}: no player spawn, using the origin", self.name);
        }
    }

    /// Add an entity to the collection matching its kind. The builder receives
    /// a fresh id. Players are not stored in a level and are rejected.
    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> Option<EntityId> {
        let entity = build(allocate(&mut self.next_id));
        let id = entity.id;
        let scene = match entity.kind {
            EntityKind::Idle => &mut self.idles,
            EntityKind::Movable => &mut self.movables,
            EntityKind::Bullet => &mut self.bullets,
            EntityKind::Character => &mut self.characters,
            EntityKind::Fighter => &mut self.fighters,
            EntityKind::Player => {
                log::warn!("level {}: refusing to store a player entity", self.name);
                return None;
            }
        };
        scene.spawn(entity);
        Some(id)
    }

    /// Advance every level entity by `dt` ms. The player is read (and damaged)
    /// by fighters but not moved; see [`World::step_player`].
    pub fn update(&mut self, dt: f32, player: &mut Entity) -> Result<(), CollisionError> {
        self.update_bullets(dt)?;

        tick_animations(&mut self.idles, dt);
        reap(&mut self.idles, &mut self.events);

        update_bodies(&mut self.movables, &self.grids, &self.physics, &mut self.events, dt)?;
        update_bodies(&mut self.characters, &self.grids, &self.physics, &mut self.events, dt)?;
        self.update_fighters(dt, player)?;

        log::trace!(
            "tick {dt}ms: {} bullets, {} idles, {} movables, {} characters, {} fighters",
            self.bullets.len(),
            self.idles.len(),
            self.movables.len(),
            self.characters.len(),
            self.fighters.len(),
        );
        Ok(())
    }

    fn update_bullets(&mut self, dt: f32) -> Result<(), CollisionError> {
        let Self {
            bullets,
            idles,
            movables,
            characters,
            fighters,
            grids,
            physics,
            events,
            next_id,
            ..
        } = self;

        for bullet in bullets.iter_mut() {
            movement::integrate(bullet, grids, physics, dt)?;

            let targets = idles
                .iter()
                .chain(movables.iter())
                .chain(characters.iter())
                .chain(fighters.iter());
            if let Some(target_id) = combat::first_hit(bullet, targets) {
                let damage = bullet.projectile.map_or(0, |p| p.damage);
                let target = idles
                    .get_mut(target_id)
                    .or_else(|| movables.get_mut(target_id))
                    .or_else(|| characters.get_mut(target_id))
                    .or_else(|| fighters.get_mut(target_id));
                if let Some(target) = target {
                    target.take_damage(damage);
                }
                bullet.alive = false;
                events.push(GameEvent::BulletHit {
                    target: target_id,
                    damage,
                });
                continue;
            }

            let struck = bullet.kinetic.as_ref().is_some_and(|k| {
                k.collided_x.is_hit() || k.collided_y.is_hit() || k.triggered.is_hit()
            });
            if struck {
                bullet.alive = false;
                idles.spawn(combat::impact_spark(allocate(next_id), bullet.pos));
                events.push(GameEvent::BulletImpact { pos: bullet.pos });
                log::debug!("bullet {:?} hit terrain at {}", bullet.id, bullet.pos);
            }
        }

        bullets.remove_dead();
        Ok(())
    }

    fn update_fighters(&mut self, dt: f32, player: &mut Entity) -> Result<(), CollisionError> {
        for fighter in self.fighters.iter_mut() {
            if fighter.is_dead() {
                fighter.alive = false;
                continue;
            }
            movement::integrate(fighter, &self.grids, &self.physics, dt)?;
            combat::interact(fighter, player, dt);
            if let Some(c) = fighter.combat.as_mut() {
                c.since_attack += dt;
            }
        }
        reap(&mut self.fighters, &mut self.events);
        Ok(())
    }

    /// Move the player, reload its weapons and check for a level transition.
    ///
    /// A change-level trigger fires once per entry: standing on the same
    /// trigger cell does not fire again.
    pub fn step_player(&mut self, player: &mut Entity, dt: f32) -> Result<(), CollisionError> {
        movement::integrate(player, &self.grids, &self.physics, dt)?;
        if let Some(loadout) = player.loadout.as_mut() {
            loadout.tick(dt);
        }

        let Some(triggered) = player.kinetic.as_ref().map(|k| k.triggered) else {
            return Ok(());
        };
        let cell = triggered.is_hit().then(|| triggered.cell());
        if triggered.tile == TriggerTile::ChangeLevel && cell != self.last_trigger {
            let next = self.info.next.clone();
            log::info!("level {}: transition to {next}", self.name);
            self.events.push(GameEvent::LevelTransition { next: next.clone() });
            self.pending_transition = Some(next);
        }
        self.last_trigger = cell;
        Ok(())
    }

    /// Fire the player's selected weapon at `target`. Returns the bullet id.
    pub fn fire(&mut self, player: &mut Entity, target: Vec2) -> Option<EntityId> {
        let bullet = combat::fire(player, target, EntityId(self.next_id))?;
        self.next_id += 1;
        let id = bullet.id;
        self.bullets.spawn(bullet);
        Some(id)
    }

    /// Level to load next, if the player entered a change-level trigger.
    pub fn take_transition(&mut self) -> Option<String> {
        self.pending_transition.take()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Look an entity up in every collection.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.scenes().into_iter().find_map(|s| s.get(id))
    }

    pub fn entity_count(&self) -> usize {
        self.scenes().iter().map(|s| s.len()).sum()
    }

    fn scenes(&self) -> [&Scene; 5] {
        [
            &self.bullets,
            &self.idles,
            &self.movables,
            &self.characters,
            &self.fighters,
        ]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &LevelInfo {
        &self.info
    }

    /// Top-left of the `SP` marker's tile, or the origin without one.
    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    pub fn grids(&self) -> &LevelGrids {
        &self.grids
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }
}
