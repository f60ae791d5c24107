// Engine-facing vocabulary shared by the simulation and any engine host.

pub type SpriteId = u64;
pub type TextId = u64;

/// Image keys registered during preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Texture {
    Player,
    Bullet,
    Enemy,
}

impl Texture {
    pub const ALL: [Texture; 3] = [Texture::Player, Texture::Bullet, Texture::Enemy];

    /// Unscaled edge length in pixels; sprites are treated as squares for overlap checks.
    pub fn base_size(self) -> f32 {
        match self {
            Texture::Player => 64.0,
            Texture::Bullet => 16.0,
            Texture::Enemy => 48.0,
        }
    }
}

/// Physics groups sprites can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    Bullets,
    Enemies,
    RemotePlayers,
}

/// Read-only copy of a sprite's current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteView {
    pub id: SpriteId,
    pub texture: Texture,
    pub group: Option<Group>,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub scale: f32,
    pub tint: Option<u32>,
}

/// Overlap reported by a registered collider. `a` belongs to the collider's first group and
/// `b` to its second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub a: SpriteId,
    pub b: SpriteId,
}
