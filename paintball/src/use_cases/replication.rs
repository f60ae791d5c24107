// Maps local state to store writes and store snapshots back onto the local scene.
//
// Every client sees its own writes echoed back; records owned by the local identity are
// ignored. Handlers tolerate redelivery of the same snapshot.

use crate::domain::state::{
    BULLETS_PATH, ENEMIES_PATH, PLAYERS_PATH, bullet_path, identity_from_key, player_path,
};
use crate::domain::{
    BulletEvent, ChangeFeed, EnemyState, GameEngineHost, Group, PlayerState, RemoteStateStore,
    SpriteId, StoreError, Texture,
};
use crate::use_cases::simulation::LocalSimulation;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// The three change feeds a client consumes.
pub struct Feeds {
    pub players: ChangeFeed,
    pub bullets: ChangeFeed,
    pub enemies: ChangeFeed,
}

pub struct ReplicationBridge<S> {
    store: S,
    identity: String,
    // Remote identity -> proxy sprite. Proxies are never removed.
    proxies: HashMap<String, SpriteId>,
    // Bullet keys already materialized here; pruned to the keys of the latest snapshot.
    consumed: HashSet<String>,
}

impl<S: RemoteStateStore> ReplicationBridge<S> {
    pub fn new(store: S, identity: impl Into<String>) -> Self {
        Self {
            store,
            identity: identity.into(),
            proxies: HashMap::new(),
            consumed: HashSet::new(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn proxy(&self, identity: &str) -> Option<SpriteId> {
        self.proxies.get(identity).copied()
    }

    pub async fn subscribe_all(&self) -> Result<Feeds, StoreError> {
        Ok(Feeds {
            players: self.store.subscribe(PLAYERS_PATH).await?,
            bullets: self.store.subscribe(BULLETS_PATH).await?,
            enemies: self.store.subscribe(ENEMIES_PATH).await?,
        })
    }

    /// Overwrites this client's player record.
    pub async fn publish_player(&self, state: &PlayerState) -> Result<(), StoreError> {
        let value = serde_json::to_value(state)?;
        self.store.set(&player_path(&self.identity), value).await
    }

    /// Announces a shot; returns the generated record key.
    pub async fn publish_bullet(&self, event: &BulletEvent) -> Result<String, StoreError> {
        let value = serde_json::to_value(event)?;
        self.store.push(BULLETS_PATH, value).await
    }

    /// Creates or repositions one proxy per remote player.
    pub fn on_players_changed<E: GameEngineHost>(
        &mut self,
        sim: &mut LocalSimulation<E>,
        snapshot: &Value,
    ) {
        let Some(records) = records(snapshot) else {
            return;
        };

        for (key, record) in records {
            let identity = identity_from_key(key);
            if identity == self.identity {
                continue;
            }
            let Some(player) = parse_record::<PlayerState>(PLAYERS_PATH, key, record) else {
                continue;
            };
            self.upsert_proxy(sim, &identity, player.x);
        }
    }

    fn upsert_proxy<E: GameEngineHost>(
        &mut self,
        sim: &mut LocalSimulation<E>,
        identity: &str,
        x: f32,
    ) {
        let (_, height) = sim.engine().world_size();
        let y = height - sim.tuning().player.bottom_offset;

        if let Some(&id) = self.proxies.get(identity) {
            match sim.engine_mut().set_position(id, x, y) {
                Ok(()) => return,
                // The sprite vanished underneath us; build a fresh one.
                Err(e) => debug!(%identity, error = %e, "proxy missing, recreating"),
            }
        }

        let tint = sim.tuning().player.proxy_tint;
        let engine = sim.engine_mut();
        let created = engine
            .create_sprite(Texture::Player, x, y, Some(Group::RemotePlayers))
            .and_then(|id| {
                engine.set_tint(id, tint)?;
                engine.set_name(id, &format!("player_{identity}"))?;
                Ok(id)
            });

        match created {
            Ok(id) => {
                info!(%identity, x, "remote player joined");
                self.proxies.insert(identity.to_string(), id);
            }
            Err(e) => warn!(%identity, error = %e, "failed to create remote player proxy"),
        }
    }

    /// Materializes remote shots once each and deletes their records.
    pub async fn on_bullets_changed<E: GameEngineHost>(
        &mut self,
        sim: &mut LocalSimulation<E>,
        snapshot: &Value,
    ) -> usize {
        let Some(records) = records(snapshot) else {
            self.consumed.clear();
            return 0;
        };
        self.consumed.retain(|key| records.contains_key(key));

        let mut materialized = 0;
        for (key, record) in records {
            if self.consumed.contains(key) {
                continue;
            }
            let Some(bullet) = parse_record::<BulletEvent>(BULLETS_PATH, key, record) else {
                continue;
            };
            if bullet.player_id == self.identity {
                continue;
            }
            if sim.spawn_projectile(bullet.x, bullet.y).is_none() {
                continue;
            }

            self.consumed.insert(key.clone());
            materialized += 1;
            debug!(%key, owner = %bullet.player_id, "remote bullet materialized");

            if let Err(e) = self.store.remove(&bullet_path(key)).await {
                warn!(%key, error = %e, "failed to remove consumed bullet");
            }
        }
        materialized
    }

    /// Replaces the local enemy roster with the records in the snapshot.
    pub fn on_enemies_changed<E: GameEngineHost>(
        &mut self,
        sim: &mut LocalSimulation<E>,
        snapshot: &Value,
    ) -> usize {
        let Some(records) = records(snapshot) else {
            return 0;
        };

        let enemies: Vec<EnemyState> = records
            .iter()
            .filter_map(|(key, record)| parse_record(ENEMIES_PATH, key, record))
            .collect();
        let created = sim.replace_enemies(&enemies);
        info!(received = enemies.len(), created, "enemy roster replaced");
        created
    }
}

// Keyed records at a collection path. Null (empty collection) and non-object values yield
// `None`.
fn records(snapshot: &Value) -> Option<&Map<String, Value>> {
    match snapshot {
        Value::Null => None,
        Value::Object(map) => Some(map),
        other => {
            warn!(value = %other, "ignoring non-object snapshot");
            None
        }
    }
}

fn parse_record<T: DeserializeOwned>(collection: &str, key: &str, record: &Value) -> Option<T> {
    match serde_json::from_value::<T>(record.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(%collection, %key, error = %e, "skipping malformed record");
            None
        }
    }
}
