// Domain layer: replicated records, engine vocabulary, ports and gameplay tuning.

pub mod engine;
pub mod errors;
pub mod ports;
pub mod state;
pub mod tuning;

pub use engine::{Collision, Group, SpriteId, SpriteView, TextId, Texture};
pub use errors::{EngineError, StoreError};
pub use ports::{ChangeFeed, GameEngineHost, RemoteStateStore, Snapshot};
pub use state::{BulletEvent, EnemyState, Intent, PlayerState};
pub use tuning::GameTuning;
