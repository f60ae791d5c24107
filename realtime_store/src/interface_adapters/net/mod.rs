// Network adapter modules split by realtime sockets vs administrative HTTP routes.

pub mod client;
pub mod internal;

pub use client::ws_handler;
pub use internal::{push_handler, read_handler, remove_handler, write_handler};
