// In-process store client over a shared hub. Used for offline play and tests; several clients
// built from the same hub observe each other exactly as they would over the network.

use crate::domain::{ChangeFeed, RemoteStateStore, StoreError};
use crate::interface_adapters::feed::watch_feed;

use async_trait::async_trait;
use realtime_store::StoreHub;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct LocalStore {
    hub: Arc<StoreHub>,
}

impl LocalStore {
    pub fn from_hub(hub: Arc<StoreHub>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Arc<StoreHub> {
        &self.hub
    }
}

#[async_trait]
impl RemoteStateStore for LocalStore {
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        Ok(self.hub.set(path, value)?)
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        Ok(self.hub.push(path, value)?)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.hub.remove(path)?;
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<ChangeFeed, StoreError> {
        let rx = self.hub.subscribe(path)?;
        Ok(watch_feed(path.to_string(), rx, |v| Some(v.clone())))
    }
}
