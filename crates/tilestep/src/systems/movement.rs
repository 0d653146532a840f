//! Kinetic integration: friction, per-axis swept collision, triggers, gravity.

use crate::components::entity::Entity;
use crate::components::tilemap::{TileCode, TileGrid, TriggerTile};
use crate::core::physics::{self, Contact, PhysicsConfig};
use crate::error::CollisionError;

/// The two grids motion is resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGrids {
    pub terrain: TileGrid<TileCode>,
    pub triggers: TileGrid<TriggerTile>,
}

/// Advance one entity by `dt` ms. Entities without a kinetic part are left
/// untouched.
///
/// Order matters and is fixed: friction from the previous tick's Y contact,
/// then the X pass, then the Y pass from the already-updated X position.
pub fn integrate(
    entity: &mut Entity,
    grids: &LevelGrids,
    cfg: &PhysicsConfig,
    dt: f32,
) -> Result<(), CollisionError> {
    let Some(kin) = entity.kinetic.as_mut() else {
        return Ok(());
    };
    let ts = cfg.tile_size;

    kin.speed.x *= cfg.friction_for(kin.collided_y.tile);
    if kin.speed.x.abs() < cfg.rest_threshold {
        kin.speed.x = 0.0;
    }

    let d = kin.speed * dt;

    // X pass
    let area = physics::area_x(entity.pos, entity.size, d.x, ts);
    kin.collided_x = physics::scan(&area, &grids.terrain)?;
    let triggered_x = if kin.collided_x.is_hit() {
        let wall = kin.collided_x.origin(ts).x;
        entity.pos.x = if area.vector > 0 {
            wall - entity.size.x
        } else {
            wall + ts
        };
        kin.speed.x = 0.0;
        Contact::empty_at(entity.pos, ts)
    } else {
        entity.pos.x += d.x;
        physics::scan(&area, &grids.triggers)?
    };

    // Y pass
    let area = physics::area_y(entity.pos, entity.size, d.y, ts);
    kin.collided_y = physics::scan(&area, &grids.terrain)?;
    let triggered_y = if kin.collided_y.is_hit() {
        let floor = kin.collided_y.origin(ts).y;
        if area.vector > 0 {
            entity.pos.y = floor - entity.size.y;
            kin.on_ground = true;
        } else {
            entity.pos.y = floor + ts;
        }
        kin.speed.y = 0.0;
        Contact::empty_at(entity.pos, ts)
    } else {
        entity.pos.y += d.y;
        kin.on_ground = false;
        let triggered = physics::scan(&area, &grids.triggers)?;
        kin.speed.y += cfg.gravity_step(kin.weight, dt);
        triggered
    };

    kin.triggered = if triggered_x.is_hit() {
        triggered_x
    } else {
        triggered_y
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::assets::map::parse_layer;
    use crate::components::entity::{EntityKind, Kinetic};
    use glam::Vec2;

    fn grids(terrain: &str, triggers: &str) -> LevelGrids {
        LevelGrids {
            terrain: parse_layer("terrain", terrain).unwrap(),
            triggers: parse_layer("triggers", triggers)
                .unwrap()
                .map(TriggerTile::from_code),
        }
    }

    fn empty_triggers(terrain: &str) -> String {
        terrain
            .lines()
            .map(|row| vec!["0"; row.split_whitespace().count()].join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn body(pos: Vec2, size: Vec2, kinetic: Kinetic) -> Entity {
        Entity::new(EntityId(1), EntityKind::Movable)
            .with_pos(pos)
            .with_size(size)
            .with_kinetic(kinetic)
    }

    fn box_room(width: usize, height: usize, floor: &str) -> String {
        let mut rows = Vec::new();
        for r in 0..height {
            let row: Vec<&str> = (0..width)
                .map(|c| {
                    if r == height - 1 {
                        floor
                    } else if r == 0 || c == 0 || c == width - 1 {
                        "ba"
                    } else {
                        "0"
                    }
                })
                .collect();
            rows.push(row.join(" "));
        }
        rows.join("\n")
    }

    #[test]
    fn free_fall_integrates_gravity_without_clamping() {
        let terrain = box_room(4, 40, "ba");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let cfg = PhysicsConfig::default();
        let dt = 1.0;
        let mut e = body(Vec2::new(16.0, 16.0), Vec2::new(16.0, 16.0), Kinetic::new(0.0, 0.0, 1.0));

        for n in 1..=10 {
            integrate(&mut e, &g, &cfg, dt).unwrap();
            let expected = n as f32 * cfg.gravity * dt;
            let vy = e.kinetic.as_ref().unwrap().speed.y;
            assert!((vy - expected).abs() < 1e-6, "tick {n}: {vy} != {expected}");
        }
        assert!(!e.kinetic.as_ref().unwrap().on_ground);
    }

    #[test]
    fn landing_snaps_to_floor_and_sets_on_ground() {
        let terrain = box_room(4, 6, "gr");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let cfg = PhysicsConfig::default();
        // Floor row is 5, so resting y for a 16px box is 64.
        let mut e = body(
            Vec2::new(16.0, 60.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(0.0, 0.0, 1.0).with_speed(Vec2::new(0.0, 0.5)),
        );
        integrate(&mut e, &g, &cfg, 16.0).unwrap();

        let k = e.kinetic.as_ref().unwrap();
        assert_eq!(e.pos.y, 64.0);
        assert!(k.on_ground);
        assert_eq!(k.speed.y, 0.0);
        assert_eq!(k.collided_y.tile.as_str(), "gr");
    }

    #[test]
    fn friction_uses_previous_tick_ground_and_decays_geometrically() {
        let terrain = box_room(400, 6, "gr");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let cfg = PhysicsConfig::default();
        let mut e = body(Vec2::new(16.0, 64.0), Vec2::new(16.0, 16.0), Kinetic::new(10.0, 0.0, 1.0));

        // Settle: the first tick's friction still reads the initial "0" contact.
        integrate(&mut e, &g, &cfg, 0.1).unwrap();
        assert_eq!(e.kinetic.as_ref().unwrap().collided_y.tile.as_str(), "gr");

        e.kinetic.as_mut().unwrap().speed.x = 10.0;
        for n in 1..=20 {
            integrate(&mut e, &g, &cfg, 0.1).unwrap();
            let expected = 10.0 * 0.95f32.powi(n);
            let vx = e.kinetic.as_ref().unwrap().speed.x;
            assert!((vx - expected).abs() < 1e-3, "tick {n}: {vx} != {expected}");
        }
    }

    #[test]
    fn friction_lags_collision_by_one_tick() {
        let terrain = box_room(40, 6, "gr");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let cfg = PhysicsConfig::default();
        // Touches grass on its first tick, but that tick's friction still
        // reads the initial empty contact.
        let mut e = body(
            Vec2::new(32.0, 64.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(10.0, 0.0, 1.0).with_speed(Vec2::new(1.0, 0.0)),
        );
        integrate(&mut e, &g, &cfg, 1.0).unwrap();
        assert_eq!(e.kinetic.as_ref().unwrap().speed.x, 1.0);
        integrate(&mut e, &g, &cfg, 1.0).unwrap();
        assert!((e.kinetic.as_ref().unwrap().speed.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn rest_threshold_stops_creeping() {
        let terrain = box_room(40, 6, "gr");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let cfg = PhysicsConfig::default();
        let mut e = body(Vec2::new(32.0, 64.0), Vec2::new(16.0, 16.0), Kinetic::new(10.0, 0.0, 1.0));
        integrate(&mut e, &g, &cfg, 1.0).unwrap();
        e.kinetic.as_mut().unwrap().speed.x = 0.5;
        for _ in 0..400 {
            integrate(&mut e, &g, &cfg, 0.01).unwrap();
        }
        assert_eq!(e.kinetic.as_ref().unwrap().speed.x, 0.0);
    }

    #[test]
    fn wall_contact_snaps_and_zeroes_horizontal_speed() {
        let terrain = "ba ba ba ba ba ba\n\
                       ba 0 0 0 0 ba\n\
                       ba 0 0 0 0 ba\n\
                       ba ba ba ba ba ba";
        let g = grids(terrain, &empty_triggers(terrain));
        let cfg = PhysicsConfig::default();

        let mut right = body(
            Vec2::new(50.0, 16.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(10.0, 0.0, 0.0).with_speed(Vec2::new(1.0, 0.0)),
        );
        integrate(&mut right, &g, &cfg, 20.0).unwrap();
        assert_eq!(right.pos.x, 80.0 - 16.0);
        assert_eq!(right.kinetic.as_ref().unwrap().speed.x, 0.0);
        assert!(right.kinetic.as_ref().unwrap().blocked_x());

        let mut left = body(
            Vec2::new(30.0, 16.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(10.0, 0.0, 0.0).with_speed(Vec2::new(-1.0, 0.0)),
        );
        integrate(&mut left, &g, &cfg, 20.0).unwrap();
        assert_eq!(left.pos.x, 16.0);
        assert!(left.kinetic.as_ref().unwrap().blocked_x());
    }

    #[test]
    fn x_resolves_before_y_at_inside_corner() {
        // Inside corner at bottom-right of the room.
        let terrain = "ba ba ba ba ba\n\
                       ba 0 0 0 ba\n\
                       ba 0 0 0 ba\n\
                       ba ba ba ba ba";
        let g = grids(terrain, &empty_triggers(terrain));
        let cfg = PhysicsConfig::default();
        let mut e = body(
            Vec2::new(40.0, 20.0),
            Vec2::new(8.0, 8.0),
            Kinetic::new(10.0, 0.0, 0.0).with_speed(Vec2::new(1.0, 1.0)),
        );
        integrate(&mut e, &g, &cfg, 30.0).unwrap();

        let k = e.kinetic.as_ref().unwrap();
        // X snapped flush with the right wall first...
        assert_eq!(e.pos.x, 64.0 - 8.0);
        assert!(k.blocked_x());
        // ...then Y was swept from that X and landed on the floor.
        assert_eq!(e.pos.y, 48.0 - 8.0);
        assert!(k.on_ground);
        assert_eq!(k.speed, Vec2::ZERO);
    }

    #[test]
    fn trigger_found_on_unblocked_axis() {
        let terrain = "ba ba ba ba ba\n\
                       ba 0 0 0 ba\n\
                       ba 0 0 0 ba\n\
                       ba ba ba ba ba";
        let triggers = "0 0 0 0 0\n\
                        0 0 0 CL 0\n\
                        0 0 0 CL 0\n\
                        0 0 0 0 0";
        let g = grids(terrain, triggers);
        let cfg = PhysicsConfig::default();
        let mut e = body(
            Vec2::new(16.0, 32.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(10.0, 0.0, 1.0).with_speed(Vec2::new(1.0, 0.0)),
        );
        integrate(&mut e, &g, &cfg, 20.0).unwrap();

        let k = e.kinetic.as_ref().unwrap();
        assert!(!k.blocked_x());
        assert_eq!(k.triggered.tile, TriggerTile::ChangeLevel);
        assert_eq!(k.triggered.cell(), (3, 2));
    }

    #[test]
    fn x_trigger_wins_over_y_trigger() {
        let terrain = "ba ba ba ba ba\n\
                       ba 0 0 0 ba\n\
                       ba 0 0 0 ba\n\
                       ba 0 0 0 ba\n\
                       ba ba ba ba ba";
        let both = "0 0 0 0 0\n\
                    0 XA 0 0 0\n\
                    0 0 0 0 0\n\
                    0 0 CL 0 0\n\
                    0 0 0 0 0";
        let cfg = PhysicsConfig::default();
        let moving = || {
            body(
                Vec2::new(16.0, 16.0),
                Vec2::new(16.0, 16.0),
                Kinetic::new(10.0, 0.0, 0.0).with_speed(Vec2::new(1.0, 1.0)),
            )
        };

        let mut e = moving();
        integrate(&mut e, &grids(terrain, both), &cfg, 16.0).unwrap();
        let k = e.kinetic.as_ref().unwrap();
        assert!(!k.blocked_x() && !k.on_ground);
        assert_eq!(k.triggered.tile, TriggerTile::Marker(TileCode::parse("XA").unwrap()));
        assert_eq!(k.triggered.cell(), (1, 1));

        // Without the X marker the Y sweep's trigger comes through.
        let only_y = both.replace("XA", "0");
        let mut e = moving();
        integrate(&mut e, &grids(terrain, &only_y), &cfg, 16.0).unwrap();
        let k = e.kinetic.as_ref().unwrap();
        assert_eq!(k.triggered.tile, TriggerTile::ChangeLevel);
        assert_eq!(k.triggered.cell(), (2, 3));
    }

    #[test]
    fn blocked_axes_report_no_trigger() {
        let terrain = "ba ba ba ba ba ba\n\
                       ba 0 0 0 0 ba\n\
                       ba ba ba ba ba ba";
        // The trigger sits in both swept paths, next to the wall and the floor.
        let triggers = "0 0 0 0 0 0\n\
                        0 0 0 0 CL 0\n\
                        0 0 0 0 0 0";
        let g = grids(terrain, triggers);
        let mut e = body(
            Vec2::new(50.0, 16.0),
            Vec2::new(16.0, 16.0),
            Kinetic::new(10.0, 0.0, 0.0).with_speed(Vec2::new(1.0, 1.0)),
        );
        integrate(&mut e, &g, &PhysicsConfig::default(), 20.0).unwrap();

        let k = e.kinetic.as_ref().unwrap();
        assert!(k.blocked_x() && k.on_ground);
        assert_eq!(e.pos, Vec2::new(64.0, 16.0));
        assert!(!k.triggered.is_hit());
        assert_eq!(k.triggered.tile, TriggerTile::None);
        assert_eq!(k.triggered.cell(), (4, 1));
    }

    #[test]
    fn entities_without_kinetics_are_untouched() {
        let terrain = box_room(4, 4, "ba");
        let g = grids(&terrain, &empty_triggers(&terrain));
        let mut idle = Entity::new(EntityId(9), EntityKind::Idle).with_pos(Vec2::new(5.0, 5.0));
        integrate(&mut idle, &g, &PhysicsConfig::default(), 16.0).unwrap();
        assert_eq!(idle.pos, Vec2::new(5.0, 5.0));
    }
}
