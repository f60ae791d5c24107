// Gameplay tuning for projectiles.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Upward speed in pixels per second.
    pub speed: f32,

    /// Local projectiles appear this far above the player's centre.
    pub muzzle_offset: f32,

    /// Minimum time between two shots from the local player.
    pub cooldown: Duration,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 400.0,
            muzzle_offset: 20.0,
            cooldown: Duration::from_millis(250),
        }
    }
}
