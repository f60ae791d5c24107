// Local simulation: player movement, shooting, scoring and enemy waves.
//
// Every entry point degrades to a logged no-op when an engine object is missing, so a failed
// sprite never takes the frame loop down.

use crate::domain::{
    BulletEvent, EnemyState, GameEngineHost, GameTuning, Group, Intent, PlayerState, SpriteId,
    TextId, Texture,
};
use crate::use_cases::throttle::LogThrottle;
use rand::{Rng, rngs::StdRng};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub fn score_label(score: u32) -> String {
    format!("Score: {score}")
}

pub struct LocalSimulation<E> {
    engine: E,
    tuning: GameTuning,
    rng: StdRng,
    identity: String,

    player: Option<SpriteId>,
    score_text: Option<TextId>,
    score: u32,

    last_shot_at: Option<Duration>,

    missing_player_log: LogThrottle,
}

impl<E: GameEngineHost> LocalSimulation<E> {
    pub fn new(engine: E, tuning: GameTuning, rng: StdRng, identity: impl Into<String>) -> Self {
        Self {
            engine,
            tuning,
            rng,
            identity: identity.into(),
            player: None,
            score_text: None,
            score: 0,
            last_shot_at: None,
            missing_player_log: LogThrottle::default(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> Option<SpriteId> {
        self.player
    }

    pub fn score_text(&self) -> Option<String> {
        self.score_text.and_then(|id| self.engine.text(id))
    }

    /// Registers every texture. Returns how many loaded; failures are logged and the game
    /// continues without those visuals.
    pub fn preload(&mut self) -> usize {
        let mut loaded = 0;
        for texture in Texture::ALL {
            match self.engine.load_texture(texture) {
                Ok(()) => {
                    debug!(?texture, "texture loaded");
                    loaded += 1;
                }
                Err(e) => error!(?texture, error = %e, "failed to load texture"),
            }
        }
        loaded
    }

    /// Scene setup: score text, player sprite, bullet/enemy collider and the first wave.
    pub fn create(&mut self) {
        let (width, height) = self.engine.world_size();
        self.score_text = Some(self.engine.add_text(20.0, 20.0, &score_label(self.score)));

        let player_tuning = self.tuning.player;
        let spawn_y = height - player_tuning.bottom_offset;
        match self
            .engine
            .create_sprite(Texture::Player, width / 2.0, spawn_y, None)
        {
            Ok(id) => {
                let scale = player_tuning.scale_for(width, height);
                let configured = self
                    .engine
                    .set_collide_world_bounds(id, true)
                    .and_then(|()| self.engine.set_scale(id, scale));
                if let Err(e) = configured {
                    warn!(error = %e, "failed to configure player sprite");
                }
                info!(x = width / 2.0, y = spawn_y, scale, "player created");
                self.player = Some(id);
            }
            Err(e) => error!(error = %e, "failed to create player sprite"),
        }

        self.engine.add_collider(Group::Bullets, Group::Enemies);
        self.spawn_wave(self.tuning.enemy.wave_size);
    }

    /// Applies one frame of input. Returns the shot to announce when one was fired.
    pub fn on_input(&mut self, intent: Intent, now: Duration) -> Option<BulletEvent> {
        let Some(player) = self.player_view() else {
            if self.missing_player_log.should_log() {
                warn!("input ignored; player sprite missing");
            }
            return None;
        };

        let speed = self.tuning.player.speed;
        let vx = if intent.left {
            -speed
        } else if intent.right {
            speed
        } else {
            0.0
        };
        if let Err(e) = self.engine.set_velocity_x(player.0, vx) {
            warn!(error = %e, "failed to set player velocity");
        }

        let wants_shot = intent.shoot_key || intent.shoot_touch;
        if !wants_shot || !self.cooldown_ready(now) {
            return None;
        }

        let (x, y) = (player.1, player.2);
        self.spawn_projectile(x, y - self.tuning.projectile.muzzle_offset)?;
        self.last_shot_at = Some(now);

        Some(BulletEvent {
            x,
            y,
            player_id: self.identity.clone(),
        })
    }

    fn cooldown_ready(&self, now: Duration) -> bool {
        match self.last_shot_at {
            Some(last) => now.saturating_sub(last) >= self.tuning.projectile.cooldown,
            None => true,
        }
    }

    fn player_view(&self) -> Option<(SpriteId, f32, f32)> {
        let id = self.player?;
        self.engine.sprite(id).map(|s| (id, s.x, s.y))
    }

    /// Spawns an upward-moving projectile. Used for local shots and for remote bullets.
    pub fn spawn_projectile(&mut self, x: f32, y: f32) -> Option<SpriteId> {
        let speed = self.tuning.projectile.speed;
        let created = self
            .engine
            .create_sprite(Texture::Bullet, x, y, Some(Group::Bullets))
            .and_then(|id| self.engine.set_velocity(id, 0.0, -speed).map(|()| id));

        match created {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(x, y, error = %e, "failed to spawn projectile");
                None
            }
        }
    }

    /// Handles a bullet/enemy hit. Returns false when either sprite was already gone.
    pub fn on_collision(&mut self, bullet: SpriteId, enemy: SpriteId) -> bool {
        if self.engine.sprite(bullet).is_none() || self.engine.sprite(enemy).is_none() {
            debug!(bullet, enemy, "collision with missing sprite ignored");
            return false;
        }

        self.engine.destroy(bullet);
        self.engine.destroy(enemy);
        self.score += self.tuning.enemy.reward;

        if let Some(text) = self.score_text {
            if let Err(e) = self.engine.set_text(text, &score_label(self.score)) {
                warn!(error = %e, "failed to update score text");
            }
        }
        debug!(bullet, enemy, score = self.score, "enemy hit");

        if self.engine.count_active(Group::Enemies) == 0 {
            info!(score = self.score, "wave cleared");
            self.spawn_wave(self.tuning.enemy.wave_size);
        }
        true
    }

    /// Replaces the enemy roster with `count` enemies at random positions in the upper part
    /// of the playfield. Returns how many were actually created.
    pub fn spawn_wave(&mut self, count: usize) -> usize {
        self.engine.clear_group(Group::Enemies);

        let (width, height) = self.engine.world_size();
        let t = self.tuning.enemy;
        let mut spawned = 0;

        for _ in 0..count {
            let x = uniform(&mut self.rng, t.margin_x, width - t.margin_x);
            let y = uniform(&mut self.rng, t.min_y, height * t.max_y_fraction);
            let vx = uniform(&mut self.rng, t.velocity_x.0, t.velocity_x.1);
            let vy = uniform(&mut self.rng, t.velocity_y.0, t.velocity_y.1);

            let created = self
                .engine
                .create_sprite(Texture::Enemy, x, y, Some(Group::Enemies))
                .and_then(|id| {
                    self.engine.set_collide_world_bounds(id, true)?;
                    self.engine.set_bounce(id, 1.0)?;
                    self.engine.set_velocity(id, vx, vy)
                });

            match created {
                Ok(()) => spawned += 1,
                Err(e) => warn!(error = %e, "failed to spawn enemy"),
            }
        }

        info!(requested = count, spawned, "wave spawned");
        spawned
    }

    /// Replaces the enemy roster with one sprite per received record.
    pub fn replace_enemies(&mut self, enemies: &[EnemyState]) -> usize {
        self.engine.clear_group(Group::Enemies);

        let mut created = 0;
        for enemy in enemies {
            let result = self
                .engine
                .create_sprite(Texture::Enemy, enemy.x, enemy.y, Some(Group::Enemies))
                .and_then(|id| {
                    self.engine
                        .set_velocity(id, enemy.velocity_x, enemy.velocity_y)
                });
            match result {
                Ok(()) => created += 1,
                Err(e) => warn!(error = %e, "failed to create replicated enemy"),
            }
        }
        created
    }

    /// Physics step; every reported bullet/enemy overlap is handled as a hit. Returns the
    /// number of hits.
    pub fn step_physics(&mut self, dt: f32) -> usize {
        let collisions = self.engine.step(dt);
        collisions
            .into_iter()
            .filter(|c| self.on_collision(c.a, c.b))
            .count()
    }

    /// Per-frame cleanup: removes projectiles that left the playfield vertically.
    pub fn tick(&mut self) -> usize {
        let (_, height) = self.engine.world_size();
        let mut removed = 0;
        for id in self.engine.members(Group::Bullets) {
            let Some(bullet) = self.engine.sprite(id) else {
                continue;
            };
            if (bullet.y < 0.0 || bullet.y > height) && self.engine.destroy(id) {
                removed += 1;
            }
        }
        removed
    }

    /// The record to publish for the local player, if the player sprite exists.
    pub fn player_state(&self) -> Option<PlayerState> {
        let (_, x, _) = self.player_view()?;
        Some(PlayerState {
            x,
            score: self.score,
        })
    }
}

fn uniform(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    if high <= low {
        low
    } else {
        rng.random_range(low..=high)
    }
}
