//! Combat capabilities: melee attacks, AI vision, projectiles and weapons.

use serde::{Deserialize, Serialize};

/// Number of equipment slots a loadout carries.
pub const SLOT_COUNT: usize = 5;

/// Repeating attack: `damage` applied at most once per `attack_delay` ms.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub damage: i32,
    pub attack_range: f32,
    pub attack_delay: f32,
    /// Time since the last landed attack. Starts at zero.
    pub since_attack: f32,
}

impl Combatant {
    pub fn new(damage: i32, attack_range: f32, attack_delay: f32) -> Self {
        Self {
            damage,
            attack_range,
            attack_delay,
            since_attack: 0.0,
        }
    }

    pub fn ready(&self) -> bool {
        self.since_attack >= self.attack_delay
    }
}

/// Steering parameters for AI fighters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiControlled {
    pub vision_range: f32,
}

/// Damage carried by a bullet, fixed when it is fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub damage: i32,
}

/// Gun that spawns bullets of `caliber` px at `bullet_speed` px/ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootingWeapon {
    pub caliber: f32,
    pub bullet_speed: f32,
    /// Minimum milliseconds between shots.
    pub shot_delay: f32,
    #[serde(skip)]
    pub since_shot: f32,
}

impl ShootingWeapon {
    /// A weapon that can fire immediately.
    pub fn new(caliber: f32, bullet_speed: f32, shot_delay: f32) -> Self {
        Self {
            caliber,
            bullet_speed,
            shot_delay,
            since_shot: shot_delay,
        }
    }

    /// Make the weapon ready to fire, e.g. after it was deserialized.
    pub fn rearmed(mut self) -> Self {
        self.since_shot = self.shot_delay;
        self
    }

    pub fn ready(&self) -> bool {
        self.since_shot >= self.shot_delay
    }

    pub fn tick(&mut self, dt: f32) {
        self.since_shot += dt;
    }

    /// Consume a shot if the weapon is ready.
    pub fn trigger(&mut self) -> bool {
        if !self.ready() {
            return false;
        }
        self.since_shot = 0.0;
        true
    }
}

/// Fixed-size equipment slots. Empty slots hold `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Loadout {
    pub slots: [Option<ShootingWeapon>; SLOT_COUNT],
    pub selected: usize,
}

impl Loadout {
    pub fn with_weapon(mut self, slot: usize, weapon: ShootingWeapon) -> Self {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(weapon);
        }
        self
    }

    pub fn with_selected(mut self, slot: usize) -> Self {
        self.change_slot(slot);
        self
    }

    /// Select `slot` if it holds a weapon. Returns whether the selection changed.
    pub fn change_slot(&mut self, slot: usize) -> bool {
        match self.slots.get(slot) {
            Some(Some(_)) => {
                self.selected = slot;
                true
            }
            _ => false,
        }
    }

    pub fn selected_weapon(&self) -> Option<&ShootingWeapon> {
        self.slots.get(self.selected).and_then(Option::as_ref)
    }

    pub fn selected_weapon_mut(&mut self) -> Option<&mut ShootingWeapon> {
        self.slots.get_mut(self.selected).and_then(Option::as_mut)
    }

    /// Advance every weapon's reload timer.
    pub fn tick(&mut self, dt: f32) {
        for weapon in self.slots.iter_mut().flatten() {
            weapon.tick(dt);
        }
    }
}
