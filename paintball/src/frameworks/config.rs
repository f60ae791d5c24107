use std::{env, time::Duration};

// Runtime/client constants (not gameplay tuning).

/// Which store the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    // The realtime store server at `STORE_URL`.
    Ws,
    // An in-process store; solo play without a server.
    Memory,
}

pub fn store_mode() -> StoreMode {
    parse_store_mode(env::var("STORE_MODE").ok().as_deref())
}

fn parse_store_mode(raw: Option<&str>) -> StoreMode {
    match raw.map(str::trim) {
        Some(mode) if mode.eq_ignore_ascii_case("memory") => StoreMode::Memory,
        _ => StoreMode::Ws,
    }
}

pub fn store_url() -> String {
    env::var("STORE_URL").unwrap_or_else(|_| "ws://127.0.0.1:3100/ws".to_string())
}

/// Display name from the environment; the client prompts when unset.
pub fn player_name() -> Option<String> {
    env::var("PLAYER_NAME").ok()
}

pub fn playfield_size() -> (f32, f32) {
    (
        env_f32("PLAYFIELD_WIDTH").unwrap_or(800.0),
        env_f32("PLAYFIELD_HEIGHT").unwrap_or(600.0),
    )
}

fn env_f32(key: &str) -> Option<f32> {
    parse_dimension(env::var(key).ok().as_deref())
}

fn parse_dimension(raw: Option<&str>) -> Option<f32> {
    raw.and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 64;
// Requests queued for the store connection task.
pub const COMMAND_CHANNEL_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
