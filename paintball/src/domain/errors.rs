use super::engine::{SpriteId, TextId, Texture};
use std::fmt;

// Failures at the engine boundary. The simulation logs these and skips the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    MissingTexture(Texture),
    SpriteLimit,
    UnknownSprite(SpriteId),
    UnknownText(TextId),
}

// Failures at the store boundary. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidPath(String),
    Disconnected,
    Rejected(String),
    Serialization(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingTexture(texture) => write!(f, "texture {texture:?} not loaded"),
            EngineError::SpriteLimit => f.write_str("sprite limit reached"),
            EngineError::UnknownSprite(id) => write!(f, "sprite {id} does not exist"),
            EngineError::UnknownText(id) => write!(f, "text {id} does not exist"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidPath(path) => write!(f, "invalid store path: {path:?}"),
            StoreError::Disconnected => f.write_str("store connection closed"),
            StoreError::Rejected(message) => write!(f, "store rejected request: {message}"),
            StoreError::Serialization(message) => write!(f, "serialization failed: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<realtime_store::StoreError> for StoreError {
    fn from(e: realtime_store::StoreError) -> Self {
        match e {
            realtime_store::StoreError::InvalidPath(path) => StoreError::InvalidPath(path),
        }
    }
}
