use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

// Alphabet in ascending ASCII order so generated keys sort the same way they were created.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIME_CHARS: usize = 8;
const COUNTER_CHARS: usize = 12;

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Returns a process-unique, monotonically increasing identifier.
///
/// This avoids collisions that can happen with "timestamp only" IDs when multiple IDs are
/// generated in the same instant.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_nanos()));
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Generates a 20 character child key for `push`.
///
/// The first 8 characters encode the creation time in milliseconds and the remaining 12 come
/// from the process counter, so keys from one process sort in creation order.
pub fn push_key() -> String {
    encode_push_key(now_millis(), rand_id())
}

fn encode_push_key(millis: u64, counter: u64) -> String {
    let mut out = [0u8; TIME_CHARS + COUNTER_CHARS];

    let mut time = millis;
    for slot in out[..TIME_CHARS].iter_mut().rev() {
        *slot = PUSH_CHARS[(time % 64) as usize];
        time /= 64;
    }

    let mut count = counter;
    for slot in out[TIME_CHARS..].iter_mut().rev() {
        *slot = PUSH_CHARS[(count % 64) as usize];
        count /= 64;
    }

    out.iter().map(|&b| b as char).collect()
}
