/// Gameplay tuning for enemy waves and scoring.

#[derive(Debug, Clone, Copy)]
pub struct EnemyTuning {
    /// Enemies per wave.
    pub wave_size: usize,

    /// Points for each enemy hit.
    pub reward: u32,

    /// Spawn x is kept this far from the left and right edges.
    pub margin_x: f32,

    /// Spawn y range: from `min_y` down to `max_y_fraction` of the playfield height.
    pub min_y: f32,
    pub max_y_fraction: f32,

    /// Velocity components are drawn independently and uniformly from these ranges.
    pub velocity_x: (f32, f32),
    pub velocity_y: (f32, f32),
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            wave_size: 5,
            reward: 10,
            margin_x: 50.0,
            min_y: 50.0,
            max_y_fraction: 0.4,
            velocity_x: (-100.0, 100.0),
            velocity_y: (50.0, 150.0),
        }
    }
}
