// Frame loop: one task owns the scene and interleaves frames, input and store feeds.

use crate::domain::{GameEngineHost, RemoteStateStore, StoreError};
use crate::use_cases::input::{InputCommand, InputState};
use crate::use_cases::replication::{Feeds, ReplicationBridge};
use crate::use_cases::simulation::LocalSimulation;
use crate::use_cases::throttle::LogThrottle;

use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Simulation, replication and input state for one client.
pub struct PaintballScene<E, S> {
    sim: LocalSimulation<E>,
    bridge: ReplicationBridge<S>,
    input: InputState,
    publish_log: LogThrottle,
}

impl<E: GameEngineHost, S: RemoteStateStore> PaintballScene<E, S> {
    pub fn new(sim: LocalSimulation<E>, bridge: ReplicationBridge<S>) -> Self {
        Self {
            sim,
            bridge,
            input: InputState::default(),
            publish_log: LogThrottle::default(),
        }
    }

    pub fn sim(&self) -> &LocalSimulation<E> {
        &self.sim
    }

    pub fn bridge(&self) -> &ReplicationBridge<S> {
        &self.bridge
    }

    pub fn preload(&mut self) -> usize {
        self.sim.preload()
    }

    /// Builds the scene, announces the player and opens the change feeds.
    pub async fn create(&mut self) -> Result<Feeds, StoreError> {
        self.sim.create();
        if let Some(state) = self.sim.player_state() {
            self.bridge.publish_player(&state).await?;
        }
        let feeds = self.bridge.subscribe_all().await?;
        info!(identity = %self.bridge.identity(), "joined game");
        Ok(feeds)
    }

    pub fn apply_input(&mut self, command: InputCommand) {
        self.input.apply(command);
    }

    /// One frame: input, shooting, physics, cleanup, then the player record.
    pub async fn update(&mut self, now: Duration, dt: f32) {
        let intent = self.input.next_intent();
        if let Some(event) = self.sim.on_input(intent, now) {
            if let Err(e) = self.bridge.publish_bullet(&event).await {
                if self.publish_log.should_log() {
                    warn!(error = %e, "failed to publish bullet");
                }
            }
        }

        self.sim.step_physics(dt);
        self.sim.tick();

        if let Some(state) = self.sim.player_state() {
            if let Err(e) = self.bridge.publish_player(&state).await {
                if self.publish_log.should_log() {
                    warn!(error = %e, "failed to publish player");
                }
            }
        }
    }

    pub fn on_players_changed(&mut self, snapshot: &Value) {
        self.bridge.on_players_changed(&mut self.sim, snapshot);
    }

    pub async fn on_bullets_changed(&mut self, snapshot: &Value) {
        self.bridge.on_bullets_changed(&mut self.sim, snapshot).await;
    }

    pub fn on_enemies_changed(&mut self, snapshot: &Value) {
        self.bridge.on_enemies_changed(&mut self.sim, snapshot);
    }
}

/// Runs the scene until the player quits, input closes or `shutdown` is notified.
pub async fn client_task<E, S>(
    scene: &mut PaintballScene<E, S>,
    mut input_rx: mpsc::Receiver<InputCommand>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) -> Result<(), StoreError>
where
    E: GameEngineHost,
    S: RemoteStateStore,
{
    scene.preload();
    let Feeds {
        players,
        bullets,
        enemies,
    } = scene.create().await?;
    // Fused so a closed feed stays quiet instead of ending the loop.
    let (mut players, mut bullets, mut enemies) = (players.fuse(), bullets.fuse(), enemies.fuse());

    let started = Instant::now();
    let dt = tick_interval.as_secs_f32();
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("shutdown requested");
                break;
            }
            _ = interval.tick() => {
                scene.update(started.elapsed(), dt).await;
                frames += 1;
            }
            command = input_rx.recv() => match command {
                Some(InputCommand::Quit) | None => {
                    info!("player left");
                    break;
                }
                Some(command) => scene.apply_input(command),
            },
            Some(snapshot) = players.next() => scene.on_players_changed(&snapshot.value),
            Some(snapshot) = bullets.next() => scene.on_bullets_changed(&snapshot.value).await,
            Some(snapshot) = enemies.next() => scene.on_enemies_changed(&snapshot.value),
        }
    }

    debug!(frames, score = scene.sim().score(), "client loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{BULLETS_PATH, player_path};
    use crate::domain::{GameTuning, Group};
    use crate::interface_adapters::{ArcadeWorld, LocalStore};
    use crate::use_cases::input::Key;
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;

    fn scene(store: &LocalStore, identity: &str) -> PaintballScene<ArcadeWorld, LocalStore> {
        let sim = LocalSimulation::new(
            ArcadeWorld::new(800.0, 600.0),
            GameTuning::default(),
            StdRng::seed_from_u64(11),
            identity,
        );
        PaintballScene::new(sim, ReplicationBridge::new(store.clone(), identity))
    }

    #[tokio::test]
    async fn when_scene_is_created_then_player_record_is_published() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "AB");
        scene.preload();

        let mut feeds = scene.create().await.expect("create succeeds");

        assert_eq!(
            store.hub().get(&player_path("AB")).expect("valid path"),
            json!({"x": 400.0, "score": 0})
        );
        let players = feeds.players.next().await.expect("initial players value");
        assert_eq!(players.value["AB"]["score"], 0);
    }

    #[tokio::test]
    async fn when_fire_is_tapped_then_frame_publishes_one_bullet() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "AB");
        scene.preload();
        scene.create().await.expect("create succeeds");

        scene.apply_input(InputCommand::KeyDown(Key::Space));
        scene.apply_input(InputCommand::KeyUp(Key::Space));
        scene.update(Duration::from_millis(16), 0.0).await;
        scene.update(Duration::from_millis(32), 0.0).await;

        let bullets = store.hub().get(BULLETS_PATH).expect("valid path");
        let records = bullets.as_object().expect("bullets collection");
        assert_eq!(records.len(), 1);
        let record = records.values().next().expect("one record");
        assert_eq!(record["playerId"], "AB");
        assert_eq!(scene.sim().engine().count_active(Group::Bullets), 1);
    }

    #[tokio::test]
    async fn when_player_moves_then_published_x_follows() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "AB");
        scene.preload();
        scene.create().await.expect("create succeeds");

        scene.apply_input(InputCommand::KeyDown(Key::Right));
        scene.update(Duration::from_millis(16), 0.0).await;
        scene.update(Duration::from_millis(32), 0.1).await;

        let record = store.hub().get(&player_path("AB")).expect("valid path");
        assert_eq!(record["x"], json!(430.0));
    }

    #[tokio::test]
    async fn when_quit_is_received_then_client_task_returns() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "AB");
        let (tx, rx) = mpsc::channel(8);
        tx.send(InputCommand::Quit).await.expect("receiver alive");

        client_task(&mut scene, rx, Duration::from_millis(5), Arc::new(Notify::new()))
            .await
            .expect("task succeeds");

        assert!(!store.hub().get(&player_path("AB")).expect("valid path").is_null());
    }

    #[tokio::test]
    async fn when_shutdown_is_notified_then_client_task_returns() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "AB");
        let (_tx, rx) = mpsc::channel(8);
        let shutdown = Arc::new(Notify::new());
        shutdown.notify_one();

        client_task(&mut scene, rx, Duration::from_millis(5), shutdown)
            .await
            .expect("task succeeds");
    }

    #[tokio::test]
    async fn when_remote_player_joins_during_the_loop_then_proxy_appears() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "A");
        let (tx, rx) = mpsc::channel(8);
        let remote = store.clone();

        let driver = tokio::spawn(async move {
            remote
                .hub()
                .set(&player_path("B"), json!({"x": 120.0, "score": 0}))
                .expect("valid path");
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(InputCommand::Quit).await.expect("receiver alive");
        });

        client_task(&mut scene, rx, Duration::from_millis(5), Arc::new(Notify::new()))
            .await
            .expect("task succeeds");
        driver.await.expect("driver joins");

        assert!(scene.bridge().proxy("B").is_some());
    }

    #[tokio::test]
    async fn when_name_contains_dots_then_scene_still_joins() {
        let store = LocalStore::default();
        let mut scene = scene(&store, "J.R.");
        scene.preload();

        scene.create().await.expect("create succeeds");

        let record = store.hub().get(&player_path("J.R.")).expect("valid path");
        assert_eq!(record["score"], 0);
    }
}
