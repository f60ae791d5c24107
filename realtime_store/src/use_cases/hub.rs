// Shared store: one value tree plus a watch channel per subscribed path.

use crate::domain::keys::push_key;
use crate::domain::{StoreError, StorePath, ValueTree};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

/// Thread-safe value tree with per-path change notification.
///
/// Every subscriber observes the full value at its path. Changes are coalesced: a slow
/// subscriber sees the latest value, not every intermediate one.
#[derive(Debug, Default)]
pub struct StoreHub {
    inner: Mutex<HubInner>,
}

#[derive(Debug, Default)]
struct HubInner {
    tree: ValueTree,
    watchers: HashMap<StorePath, watch::Sender<Value>>,
}

impl StoreHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Result<Value, StoreError> {
        let path = StorePath::parse(path)?;
        Ok(self.lock().tree.get(&path))
    }

    /// Overwrites the value at `path`; null removes it.
    pub fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = StorePath::parse(path)?;
        let mut inner = self.lock();
        if inner.tree.set(&path, value) {
            inner.notify(&path);
        }
        Ok(())
    }

    /// Stores `value` under a freshly generated child key of `path` and returns the key.
    pub fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let parent = StorePath::parse(path)?;
        let key = push_key();
        let child = parent.child(&key);

        let mut inner = self.lock();
        if inner.tree.set(&child, value) {
            inner.notify(&child);
        }
        debug!(path = %parent, key = %key, "pushed child");
        Ok(key)
    }

    /// Removes the value at `path`. Removing a missing path is not an error; the return value
    /// tells whether anything was there.
    pub fn remove(&self, path: &str) -> Result<bool, StoreError> {
        let path = StorePath::parse(path)?;
        let mut inner = self.lock();
        let removed = inner.tree.remove(&path);
        if removed {
            inner.notify(&path);
        }
        Ok(removed)
    }

    /// Subscribes to the value at `path`.
    ///
    /// The returned receiver is already marked changed, so the first `changed()` resolves
    /// immediately with the current value (null when empty).
    pub fn subscribe(&self, path: &str) -> Result<watch::Receiver<Value>, StoreError> {
        let path = StorePath::parse(path)?;
        let mut inner = self.lock();
        inner.watchers.retain(|_, tx| tx.receiver_count() > 0);

        let current = inner.tree.get(&path);
        let mut rx = match inner.watchers.get(&path) {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(current);
                inner.watchers.insert(path.clone(), tx);
                rx
            }
        };
        rx.mark_changed();
        debug!(path = %path, "subscribed");
        Ok(rx)
    }

    // A poisoned lock only means another thread panicked mid-operation; the tree is still
    // structurally valid, so keep serving.
    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HubInner {
    fn notify(&mut self, changed: &StorePath) {
        self.watchers.retain(|_, tx| tx.receiver_count() > 0);

        let Self { tree, watchers } = self;
        for (path, tx) in watchers.iter() {
            if !path.overlaps(changed) {
                continue;
            }
            let latest = tree.get(path);
            tx.send_if_modified(|current| {
                if *current == latest {
                    false
                } else {
                    *current = latest;
                    true
                }
            });
        }
    }
}
