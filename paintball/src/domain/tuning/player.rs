/// Gameplay tuning for the local player and remote proxies.

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Horizontal speed in pixels per second while a direction is held.
    pub speed: f32,

    /// Distance from the bottom edge to the player's centre line.
    pub bottom_offset: f32,

    /// Sprite scale per pixel of the playfield's shorter side.
    pub scale_per_px: f32,

    /// Tint applied to other players' proxies.
    pub proxy_tint: u32,
}

impl PlayerTuning {
    pub fn scale_for(&self, width: f32, height: f32) -> f32 {
        width.min(height) * self.scale_per_px
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 300.0,
            bottom_offset: 50.0,
            scale_per_px: 0.0008,
            proxy_tint: 0x00ff00,
        }
    }
}
