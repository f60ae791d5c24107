// Gameplay tuning, kept apart from runtime configuration (tick rate, channel sizes, urls).

pub mod enemy;
pub mod player;
pub mod projectile;

pub use enemy::EnemyTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;

#[derive(Debug, Clone, Copy, Default)]
pub struct GameTuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub enemy: EnemyTuning,
}
