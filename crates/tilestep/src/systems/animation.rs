//! Animation system: ticks sprite sheets and retires finished one-shots.

use crate::core::scene::Scene;

/// Tick every sprite sheet in the scene by `dt` ms.
///
/// Entities whose one-shot sheet has played all its cycles are flagged dead
/// so the next compaction drops them.
pub fn tick_animations(scene: &mut Scene, dt: f32) {
    for entity in scene.iter_mut() {
        if let Some(ref mut sheet) = entity.sheet {
            sheet.tick(dt);
            if sheet.is_finished() {
                entity.alive = false;
            }
        }
    }
}
