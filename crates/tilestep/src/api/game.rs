use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, GameEvent};
use crate::assets::settings::Preferences;
use crate::components::combat::{Loadout, ShootingWeapon, SLOT_COUNT};
use crate::components::entity::{Entity, EntityKind, Kinetic};
use crate::core::physics::PhysicsConfig;
use crate::core::time::{FixedTimestep, FpsCounter};
use crate::core::world::World;
use crate::editor::EditLevel;
use crate::error::{ConfigError, EngineError};
use crate::input::queue::{InputState, Key, MouseButton};

/// Stats the player is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: i32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub weight: f32,
    pub jump_strength: f32,
    pub size: [f32; 2],
    /// Weapon placed in `weapon_slot` and selected.
    pub weapon: ShootingWeapon,
    pub weapon_slot: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            max_speed: 0.7,
            acceleration: 0.01,
            weight: 1.0,
            jump_strength: 1.5,
            size: [32.0, 64.0],
            weapon: ShootingWeapon::new(10.0, 1.5, 140.0),
            weapon_slot: 1,
        }
    }
}

impl PlayerConfig {
    pub fn spawn(&self, pos: Vec2) -> Entity {
        let loadout = Loadout::default()
            .with_weapon(self.weapon_slot, self.weapon.clone().rearmed())
            .with_selected(self.weapon_slot);
        Entity::new(EntityId::PLAYER, EntityKind::Player)
            .with_pos(pos)
            .with_size(Vec2::from(self.size))
            .with_health(self.max_health)
            .with_kinetic(
                Kinetic::new(self.max_speed, self.acceleration, self.weight)
                    .with_jump(self.jump_strength),
            )
            .with_loadout(loadout)
    }
}

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    /// Directory holding one sub-directory per level.
    pub maps_dir: PathBuf,
    /// Run whole ticks of this many ms instead of the raw frame time.
    pub fixed_dt: Option<f32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            maps_dir: PathBuf::from("maps"),
            fixed_dt: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// What the session is currently driving.
#[derive(Debug)]
pub enum Screen {
    Menu,
    Playing { world: World, player: Entity },
    Editing { editor: EditLevel },
}

/// Values the driver shows over the game.
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub health: i32,
    pub max_health: i32,
    pub fps: String,
}

/// Top-level state: switches between menu, play and edit screens and maps
/// input onto them.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    screen: Screen,
    timestep: Option<FixedTimestep>,
    fps: FpsCounter,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        let timestep = config.fixed_dt.map(FixedTimestep::new);
        Self {
            config,
            screen: Screen::Menu,
            timestep,
            fps: FpsCounter::default(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn world(&self) -> Option<&World> {
        match &self.screen {
            Screen::Playing { world, .. } => Some(world),
            _ => None,
        }
    }

    pub fn player(&self) -> Option<&Entity> {
        match &self.screen {
            Screen::Playing { player, .. } => Some(player),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.screen {
            Screen::Playing { player, .. } => Some(player),
            _ => None,
        }
    }

    pub fn editor(&self) -> Option<&EditLevel> {
        match &self.screen {
            Screen::Editing { editor } => Some(editor),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditLevel> {
        match &mut self.screen {
            Screen::Editing { editor } => Some(editor),
            _ => None,
        }
    }

    /// Drop whatever level is open.
    pub fn goto_menu(&mut self) {
        self.screen = Screen::Menu;
    }

    /// Start playing `level` with a fresh player at its spawn point.
    pub fn goto_game(&mut self, level: &str) -> Result<(), EngineError> {
        let world = World::load(&self.config.maps_dir, level, &self.config.physics).map_err(|e| {
            log::error!("failed to load level {level}: {e}");
            e
        })?;
        let player = self.config.player.spawn(world.spawn_point());
        self.screen = Screen::Playing { world, player };
        self.timestep = self.config.fixed_dt.map(FixedTimestep::new);
        Ok(())
    }

    /// Open `level` in the editor.
    pub fn goto_edit(&mut self, level: &str) -> Result<(), EngineError> {
        let editor = EditLevel::load(&self.config.maps_dir, level, self.config.physics.tile_size)
            .map_err(|e| {
                log::error!("failed to open level {level} for editing: {e}");
                e
            })?;
        self.screen = Screen::Editing { editor };
        Ok(())
    }

    /// Swap the current level for `level`, keeping the player and moving it to
    /// the new spawn point. Starts a new game when not playing.
    pub fn change_level(&mut self, level: &str) -> Result<(), EngineError> {
        if !matches!(self.screen, Screen::Playing { .. }) {
            return self.goto_game(level);
        }
        let next = World::load(&self.config.maps_dir, level, &self.config.physics)?;
        if let Screen::Playing { world, player } = &mut self.screen {
            player.pos = next.spawn_point();
            *world = next;
        }
        Ok(())
    }

    /// Advance the active screen by one frame of `dt` ms.
    pub fn update(&mut self, input: &InputState, dt: f32) -> Result<(), EngineError> {
        self.fps.record(dt);

        if input.key_pressed(Key::Escape) && !matches!(self.screen, Screen::Menu) {
            self.goto_menu();
            return Ok(());
        }

        match self.screen {
            Screen::Menu => {}
            Screen::Editing { ref mut editor } => edit_tick(editor, input),
            Screen::Playing { .. } => {
                let (steps, step_dt) = match self.timestep.as_mut() {
                    Some(ts) => (ts.accumulate(dt), ts.dt()),
                    None => (1, dt),
                };
                for _ in 0..steps {
                    self.play_tick(input, step_dt)?;
                }
            }
        }
        Ok(())
    }

    fn play_tick(&mut self, input: &InputState, dt: f32) -> Result<(), EngineError> {
        let Screen::Playing { world, player } = &mut self.screen else {
            return Ok(());
        };

        world.update(dt, player)?;
        apply_controls(player, input, dt);
        if input.mouse_held(MouseButton::Left) {
            world.fire(player, input.cursor());
        }
        world.step_player(player, dt)?;
        self.events.extend(world.drain_events());

        if let Some(next) = world.take_transition() {
            if let Err(e) = self.change_level(&next) {
                log::warn!("could not enter level {next}, staying: {e}");
            }
        }
        Ok(())
    }

    /// Player health and frame rate while playing.
    pub fn hud(&self) -> Option<Hud> {
        self.player().map(|p| Hud {
            health: p.health,
            max_health: p.max_health,
            fps: self.fps.text(),
        })
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remember the level being played and write preferences to `path`.
    pub fn apply_changes(&self, prefs: &mut Preferences, path: &Path) -> Result<(), ConfigError> {
        if let Some(world) = self.world() {
            prefs.current_level = world.name().to_string();
        }
        prefs.save(path)?;
        log::info!("preferences written to {}", path.display());
        Ok(())
    }
}

fn apply_controls(player: &mut Entity, input: &InputState, dt: f32) {
    if let Some(kin) = player.kinetic.as_mut() {
        if input.key_held(Key::W) {
            kin.jump();
        }
        if input.key_held(Key::A) {
            kin.move_left(dt);
        }
        if input.key_held(Key::D) {
            kin.move_right(dt);
        }
    }
    if let Some(loadout) = player.loadout.as_mut() {
        for slot in 0..SLOT_COUNT {
            if input.key_held(Key::Digit(slot as u8 + 1)) {
                loadout.change_slot(slot);
            }
        }
    }
}

/// Left paints, right clears. A press anchors a fill drag, a release commits it.
fn edit_tick(editor: &mut EditLevel, input: &InputState) {
    editor.set_cursor(input.cursor());
    for (button, clear) in [(MouseButton::Left, false), (MouseButton::Right, true)] {
        if input.mouse_held(button) {
            if input.mouse_pressed(button) {
                editor.set_anchor(input.cursor());
            }
            editor.change_tile(clear, false);
        } else if input.mouse_released(button) {
            editor.change_tile(clear, true);
        }
    }
}
