use std::env;

// Runtime/server constants.

pub fn http_port() -> u16 {
    env::var("STORE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3100)
}

pub fn bind_host() -> [u8; 4] {
    env::var("STORE_BIND")
        .ok()
        .and_then(|v| v.parse::<std::net::Ipv4Addr>().ok())
        .map(|ip| ip.octets())
        .unwrap_or([127, 0, 0, 1])
}

// Per-connection queue of subscription values waiting to be written to the socket.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;
// Malformed messages tolerated before the connection is closed.
pub const MAX_INVALID_JSON: u32 = 10;
