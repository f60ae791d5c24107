use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use super::engine::{Collision, Group, SpriteId, SpriteView, TextId, Texture};
use super::errors::{EngineError, StoreError};

/// Full value observed at a subscribed path after a change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub path: String,
    pub value: Value,
}

/// Lazy, endless, non-restartable sequence of snapshots for one path. The first item is the
/// value at subscription time; later items may skip intermediate values.
pub type ChangeFeed = BoxStream<'static, Snapshot>;

// Port for the shared realtime store.
#[async_trait]
pub trait RemoteStateStore: Send + Sync {
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;
    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
    async fn subscribe(&self, path: &str) -> Result<ChangeFeed, StoreError>;
}

// Port for the 2D engine: sprites, groups, text and arcade physics.
pub trait GameEngineHost {
    fn world_size(&self) -> (f32, f32);

    fn load_texture(&mut self, texture: Texture) -> Result<(), EngineError>;

    fn create_sprite(
        &mut self,
        texture: Texture,
        x: f32,
        y: f32,
        group: Option<Group>,
    ) -> Result<SpriteId, EngineError>;
    /// Returns false when the sprite was already gone.
    fn destroy(&mut self, id: SpriteId) -> bool;
    fn sprite(&self, id: SpriteId) -> Option<SpriteView>;

    fn set_position(&mut self, id: SpriteId, x: f32, y: f32) -> Result<(), EngineError>;
    fn set_velocity(&mut self, id: SpriteId, vx: f32, vy: f32) -> Result<(), EngineError>;
    fn set_velocity_x(&mut self, id: SpriteId, vx: f32) -> Result<(), EngineError>;
    fn set_collide_world_bounds(&mut self, id: SpriteId, enabled: bool)
    -> Result<(), EngineError>;
    fn set_bounce(&mut self, id: SpriteId, bounce: f32) -> Result<(), EngineError>;
    fn set_scale(&mut self, id: SpriteId, scale: f32) -> Result<(), EngineError>;
    fn set_tint(&mut self, id: SpriteId, tint: u32) -> Result<(), EngineError>;
    fn set_name(&mut self, id: SpriteId, name: &str) -> Result<(), EngineError>;
    fn name(&self, id: SpriteId) -> Option<String>;

    fn members(&self, group: Group) -> Vec<SpriteId>;
    fn count_active(&self, group: Group) -> usize {
        self.members(group).len()
    }
    /// Destroys every member of `group` and returns how many there were.
    fn clear_group(&mut self, group: Group) -> usize;

    fn add_text(&mut self, x: f32, y: f32, content: &str) -> TextId;
    fn set_text(&mut self, id: TextId, content: &str) -> Result<(), EngineError>;
    fn text(&self, id: TextId) -> Option<String>;

    /// Reports overlaps between members of `a` and `b` from every subsequent `step`.
    fn add_collider(&mut self, a: Group, b: Group);
    /// Advances physics by `dt` seconds and returns the collisions found.
    fn step(&mut self, dt: f32) -> Vec<Collision>;
}
