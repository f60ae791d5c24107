// Replicated records and per-frame input intent.
//
// Store layout:
//   players/{identity}  -> PlayerState
//   bullets/{pushKey}   -> BulletEvent
//   enemies/{pushKey}   -> EnemyState

use serde::{Deserialize, Serialize};

pub const PLAYERS_PATH: &str = "players";
pub const BULLETS_PATH: &str = "bullets";
pub const ENEMIES_PATH: &str = "enemies";

const DEFAULT_DISPLAY_NAME: &str = "Player";

/// A player's record; the identity is the record's key, not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub score: u32,
}

/// A shot as announced to other clients: where it was fired from and by whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletEvent {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "playerId")]
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "velocityX")]
    pub velocity_x: f32,
    #[serde(rename = "velocityY")]
    pub velocity_y: f32,
}

/// Controls held (or tapped) during one frame, merged across keyboard and touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    // Keyboard fire key went down since the previous frame. Holding the key does not repeat.
    pub shoot_key: bool,
    // Touch fire button; fires for as long as it is held, limited by the cooldown.
    pub shoot_touch: bool,
}

// Store path separators and forbidden segment characters, plus the escape character itself.
const RESERVED_KEY_CHARS: [char; 7] = ['%', '/', '.', '#', '$', '[', ']'];

pub fn player_path(identity: &str) -> String {
    format!("{PLAYERS_PATH}/{}", player_key(identity))
}

/// Store key for a display name. Reserved characters are percent-encoded so every name maps
/// to exactly one valid path segment.
pub fn player_key(identity: &str) -> String {
    let mut key = String::with_capacity(identity.len());
    for c in identity.chars() {
        if RESERVED_KEY_CHARS.contains(&c) {
            key.push_str(&format!("%{:02X}", u32::from(c)));
        } else {
            key.push(c);
        }
    }
    key
}

/// Inverse of [`player_key`]. A `%` not followed by two hex digits of an ASCII byte is kept
/// as-is.
pub fn identity_from_key(key: &str) -> String {
    let mut identity = String::with_capacity(key.len());
    let mut rest = key;
    while let Some(pos) = rest.find('%') {
        identity.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let byte = tail
            .get(..2)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .filter(|b| b.is_ascii());
        match byte {
            Some(b) => {
                identity.push(char::from(b));
                rest = &tail[2..];
            }
            None => {
                identity.push('%');
                rest = tail;
            }
        }
    }
    identity.push_str(rest);
    identity
}

pub fn bullet_path(key: &str) -> String {
    format!("{BULLETS_PATH}/{key}")
}

/// Display names are free text; surrounding whitespace is dropped and an empty name falls
/// back to a placeholder.
pub fn display_name_or_default(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}
