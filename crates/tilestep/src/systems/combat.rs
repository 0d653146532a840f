//! Bullets, melee attacks and fighter steering.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::animation::SpriteSheet;
use crate::components::combat::{Projectile, ShootingWeapon};
use crate::components::entity::{Entity, EntityKind, Kinetic};
use crate::core::physics::rects_overlap;

/// Bullet weight per pixel of caliber. Caliber 10 weighs 0.1.
pub const BULLET_WEIGHT_PER_CALIBER: f32 = 0.01;

/// Impact spark: 120x20 px, 6 frames of 7 ms, played twice.
pub const SPARK_SIZE: Vec2 = Vec2::new(120.0, 20.0);
const SPARK_COLS: u32 = 6;
const SPARK_ROWS: u32 = 1;
const SPARK_FRAME_DELAY: f32 = 7.0;
const SPARK_CYCLES: u32 = 2;

/// Damage of a bullet flying at `speed` px/ms with `height` px caliber.
pub fn bullet_damage(speed: f32, height: f32) -> i32 {
    (speed * height / 3.0).ceil() as i32
}

/// Build a bullet leaving `origin` at `angle` radians.
pub fn spawn_bullet(id: EntityId, origin: Vec2, angle: f32, weapon: &ShootingWeapon) -> Entity {
    let velocity = Vec2::new(angle.cos(), angle.sin()) * weapon.bullet_speed;
    let weight = weapon.caliber * BULLET_WEIGHT_PER_CALIBER;
    Entity::new(id, EntityKind::Bullet)
        .with_pos(origin)
        .with_size(Vec2::splat(weapon.caliber))
        .with_health(1)
        .with_kinetic(Kinetic::new(weapon.bullet_speed, 0.0, weight).with_speed(velocity))
        .with_projectile(Projectile {
            damage: bullet_damage(weapon.bullet_speed, weapon.caliber),
        })
}

/// Fire the shooter's selected weapon from its eyes toward `target`.
///
/// `None` when the selected slot is empty or the weapon is still reloading.
pub fn fire(shooter: &mut Entity, target: Vec2, id: EntityId) -> Option<Entity> {
    let origin = shooter.eyes();
    let weapon = shooter.loadout.as_mut()?.selected_weapon_mut()?;
    if !weapon.trigger() {
        return None;
    }
    let aim = target - origin;
    Some(spawn_bullet(id, origin, aim.y.atan2(aim.x), weapon))
}

/// One-shot spark left where a bullet hit terrain.
pub fn impact_spark(id: EntityId, pos: Vec2) -> Entity {
    Entity::new(id, EntityKind::Idle)
        .with_pos(pos)
        .with_size(SPARK_SIZE)
        .with_sheet(SpriteSheet::one_shot(
            SPARK_COLS,
            SPARK_ROWS,
            SPARK_FRAME_DELAY,
            SPARK_CYCLES,
        ))
}

/// First target in `candidates` whose box overlaps the bullet's.
pub fn first_hit<'a>(
    bullet: &Entity,
    candidates: impl IntoIterator<Item = &'a Entity>,
) -> Option<EntityId> {
    candidates
        .into_iter()
        .filter(|e| e.id != bullet.id && e.is_target())
        .find(|e| rects_overlap(bullet.pos, bullet.size, e.pos, e.size))
        .map(|e| e.id)
}

/// Land a melee hit if the attacker's delay has elapsed. Returns whether
/// damage was dealt.
pub fn attack(attacker: &mut Entity, target: &mut Entity) -> bool {
    let Some(combat) = attacker.combat.as_mut() else {
        return false;
    };
    if !combat.ready() {
        return false;
    }
    target.take_damage(combat.damage);
    combat.since_attack = 0.0;
    true
}

/// What a fighter decided to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Idle,
    Chase,
    Attack,
}

/// Steer toward `enemy` when it is visible but out of reach, attack it when in
/// reach. Distances are measured between eyes.
pub fn interact(fighter: &mut Entity, enemy: &mut Entity, dt: f32) -> Intent {
    let (Some(ai), Some(attack_range)) = (fighter.ai, fighter.combat.as_ref().map(|c| c.attack_range))
    else {
        return Intent::Idle;
    };
    let eyes = fighter.eyes();
    let enemy_eyes = enemy.eyes();
    let distance = eyes.distance(enemy_eyes);

    if attack_range < distance && distance < ai.vision_range {
        if let Some(kin) = fighter.kinetic.as_mut() {
            if eyes.x > enemy_eyes.x {
                kin.move_left(dt);
            } else {
                kin.move_right(dt);
            }
            if kin.blocked_x() {
                kin.jump();
            }
        }
        Intent::Chase
    } else if distance <= attack_range {
        attack(fighter, enemy);
        Intent::Attack
    } else {
        Intent::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::combat::Loadout;
    use crate::components::tilemap::TileCode;
    use crate::core::physics::Contact;

    fn target(pos: Vec2) -> Entity {
        Entity::new(EntityId(50), EntityKind::Player)
            .with_pos(pos)
            .with_size(Vec2::splat(64.0))
            .with_health(100)
    }

    #[test]
    fn bullet_damage_rounds_up() {
        assert_eq!(bullet_damage(3.0, 9.0), 9);
        assert_eq!(bullet_damage(1.5, 10.0), 5);
        assert_eq!(bullet_damage(1.0, 1.0), 1);
    }

    #[test]
    fn spawned_bullet_carries_caliber_derived_stats() {
        let gun = ShootingWeapon::new(9.0, 3.0, 100.0);
        let bullet = spawn_bullet(EntityId(7), Vec2::new(5.0, 5.0), 0.0, &gun);
        assert_eq!(bullet.projectile, Some(Projectile { damage: 9 }));
        assert_eq!(bullet.size, Vec2::splat(9.0));
        let kin = bullet.kinetic.unwrap();
        assert!((kin.weight - 0.09).abs() < 1e-6);
        assert!((kin.speed.x - 3.0).abs() < 1e-6);
        assert!(kin.speed.y.abs() < 1e-6);
    }

    #[test]
    fn fire_aims_from_eyes_and_respects_reload() {
        let mut shooter = Entity::new(EntityId(0), EntityKind::Player)
            .with_size(Vec2::new(32.0, 32.0))
            .with_loadout(
                Loadout::default()
                    .with_weapon(1, ShootingWeapon::new(10.0, 1.5, 140.0))
                    .with_selected(1),
            );

        let bullet = fire(&mut shooter, Vec2::new(16.0, 100.0), EntityId(1)).unwrap();
        assert_eq!(bullet.pos, Vec2::new(16.0, 16.0));
        let v = bullet.kinetic.unwrap().speed;
        assert!(v.x.abs() < 1e-5 && (v.y - 1.5).abs() < 1e-5);

        assert!(fire(&mut shooter, Vec2::ZERO, EntityId(2)).is_none());
    }

    #[test]
    fn firing_an_empty_slot_is_a_no_op() {
        let mut shooter = Entity::new(EntityId(0), EntityKind::Player).with_loadout(Loadout::default());
        assert!(fire(&mut shooter, Vec2::ONE, EntityId(1)).is_none());
        let mut unarmed = Entity::new(EntityId(0), EntityKind::Player);
        assert!(fire(&mut unarmed, Vec2::ONE, EntityId(1)).is_none());
    }

    #[test]
    fn attack_lands_once_per_delay_window() {
        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::ZERO);
        let mut enemy = target(Vec2::new(10.0, 0.0));
        fighter.combat.as_mut().unwrap().since_attack = 1000.0;

        let landed = (0..10).filter(|_| attack(&mut fighter, &mut enemy)).count();
        assert_eq!(landed, 1);
        assert_eq!(enemy.health, 85);

        fighter.combat.as_mut().unwrap().since_attack = 999.0;
        assert!(!attack(&mut fighter, &mut enemy));
        fighter.combat.as_mut().unwrap().since_attack = 1000.0;
        assert!(attack(&mut fighter, &mut enemy));
        assert_eq!(enemy.health, 70);
    }

    #[test]
    fn fighter_chases_visible_enemy() {
        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::new(200.0, 0.0));
        let mut enemy = target(Vec2::new(0.0, 0.0));
        assert_eq!(interact(&mut fighter, &mut enemy, 16.0), Intent::Chase);
        assert!(fighter.kinetic.as_ref().unwrap().speed.x < 0.0);

        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::new(0.0, 0.0));
        let mut enemy = target(Vec2::new(200.0, 0.0));
        interact(&mut fighter, &mut enemy, 16.0);
        assert!(fighter.kinetic.as_ref().unwrap().speed.x > 0.0);
    }

    #[test]
    fn blocked_fighter_jumps() {
        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::new(200.0, 0.0));
        {
            let kin = fighter.kinetic.as_mut().unwrap();
            kin.on_ground = true;
            kin.collided_x = Contact {
                col: 2,
                row: 0,
                tile: TileCode::parse("ba").unwrap(),
            };
        }
        let mut enemy = target(Vec2::ZERO);
        interact(&mut fighter, &mut enemy, 16.0);
        assert_eq!(fighter.kinetic.as_ref().unwrap().speed.y, -1.5);
    }

    #[test]
    fn fighter_ignores_enemy_out_of_vision() {
        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::new(1000.0, 0.0));
        let mut enemy = target(Vec2::ZERO);
        assert_eq!(interact(&mut fighter, &mut enemy, 16.0), Intent::Idle);
        assert_eq!(fighter.kinetic.as_ref().unwrap().speed.x, 0.0);
    }

    #[test]
    fn fighter_in_reach_attacks_only_when_ready() {
        let mut fighter = Entity::test_fighter(EntityId(1), Vec2::new(50.0, 0.0));
        let mut enemy = target(Vec2::ZERO);
        assert_eq!(interact(&mut fighter, &mut enemy, 16.0), Intent::Attack);
        assert_eq!(enemy.health, 100);

        fighter.combat.as_mut().unwrap().since_attack = 1000.0;
        interact(&mut fighter, &mut enemy, 16.0);
        assert_eq!(enemy.health, 85);
    }

    #[test]
    fn first_hit_skips_dead_entities_and_bullets() {
        let bullet = Entity::new(EntityId(1), EntityKind::Bullet)
            .with_pos(Vec2::new(10.0, 10.0))
            .with_size(Vec2::splat(4.0));
        let other_bullet = Entity::new(EntityId(2), EntityKind::Bullet).with_pos(Vec2::new(10.0, 10.0));
        let mut dead = Entity::test_movable(EntityId(3), Vec2::ZERO);
        dead.alive = false;
        let live = Entity::test_movable(EntityId(4), Vec2::ZERO);
        assert_eq!(
            first_hit(&bullet, [&bullet, &other_bullet, &dead, &live]),
            Some(EntityId(4))
        );
        assert_eq!(first_hit(&bullet, [&other_bullet, &dead]), None);
    }

    #[test]
    fn sparks_stop_bullets() {
        let bullet = Entity::new(EntityId(1), EntityKind::Bullet)
            .with_pos(Vec2::new(10.0, 10.0))
            .with_size(Vec2::splat(4.0));
        let spark = impact_spark(EntityId(2), Vec2::ZERO);
        assert_eq!(first_hit(&bullet, [&spark]), Some(EntityId(2)));
    }
}
