// Headless arcade-physics engine host: sprites, groups, text and a fixed-step integrator.

use crate::domain::{
    Collision, EngineError, GameEngineHost, Group, SpriteId, SpriteView, TextId, Texture,
};
use std::collections::{BTreeMap, HashMap, HashSet};

const DEFAULT_SPRITE_LIMIT: usize = 1024;

struct Body {
    texture: Texture,
    group: Option<Group>,
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    scale: f32,
    tint: Option<u32>,
    name: Option<String>,
    collide_world_bounds: bool,
    bounce: f32,
}

impl Body {
    fn half_extent(&self) -> f32 {
        self.texture.base_size() * self.scale * 0.5
    }

    fn overlaps(&self, other: &Body) -> bool {
        let reach = self.half_extent() + other.half_extent();
        (self.x - other.x).abs() < reach && (self.y - other.y).abs() < reach
    }
}

struct TextObject {
    #[allow(dead_code)]
    x: f32,
    #[allow(dead_code)]
    y: f32,
    content: String,
}

pub struct ArcadeWorld {
    width: f32,
    height: f32,
    sprite_limit: usize,
    next_id: u64,
    textures: HashSet<Texture>,
    // Ordered so integration and collision checks run in creation order.
    bodies: BTreeMap<SpriteId, Body>,
    texts: HashMap<TextId, TextObject>,
    colliders: Vec<(Group, Group)>,
}

impl ArcadeWorld {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            sprite_limit: DEFAULT_SPRITE_LIMIT,
            next_id: 1,
            textures: HashSet::new(),
            bodies: BTreeMap::new(),
            texts: HashMap::new(),
            colliders: Vec::new(),
        }
    }

    /// Caps live sprites; creation beyond the cap fails like a failed engine allocation.
    pub fn with_sprite_limit(mut self, limit: usize) -> Self {
        self.sprite_limit = limit;
        self
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn body_mut(&mut self, id: SpriteId) -> Result<&mut Body, EngineError> {
        self.bodies
            .get_mut(&id)
            .ok_or(EngineError::UnknownSprite(id))
    }

    fn integrate(&mut self, dt: f32) {
        let (width, height) = (self.width, self.height);
        for body in self.bodies.values_mut() {
            body.x += body.vx * dt;
            body.y += body.vy * dt;

            if body.collide_world_bounds {
                let half = body.half_extent();
                clamp_axis(&mut body.x, &mut body.vx, half, width - half, body.bounce);
                clamp_axis(&mut body.y, &mut body.vy, half, height - half, body.bounce);
            }
        }
    }

    // Naive O(A*B) overlap scan per collider. A sprite takes part in at most one collision per
    // step, matching how a destroyed sprite stops colliding immediately.
    fn detect_collisions(&self) -> Vec<Collision> {
        let mut consumed: HashSet<SpriteId> = HashSet::new();
        let mut collisions = Vec::new();

        for &(group_a, group_b) in &self.colliders {
            let members_a = self.members(group_a);
            let members_b = self.members(group_b);

            for a in members_a {
                if consumed.contains(&a) {
                    continue;
                }
                let Some(body_a) = self.bodies.get(&a) else {
                    continue;
                };

                for &b in &members_b {
                    if a == b || consumed.contains(&b) {
                        continue;
                    }
                    let Some(body_b) = self.bodies.get(&b) else {
                        continue;
                    };
                    if body_a.overlaps(body_b) {
                        consumed.insert(a);
                        consumed.insert(b);
                        collisions.push(Collision { a, b });
                        break;
                    }
                }
            }
        }

        collisions
    }
}

fn clamp_axis(pos: &mut f32, vel: &mut f32, min: f32, max: f32, bounce: f32) {
    if *pos < min {
        *pos = min;
        *vel = -*vel * bounce;
    } else if *pos > max {
        *pos = max;
        *vel = -*vel * bounce;
    }
}

impl GameEngineHost for ArcadeWorld {
    fn world_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn load_texture(&mut self, texture: Texture) -> Result<(), EngineError> {
        self.textures.insert(texture);
        Ok(())
    }

    fn create_sprite(
        &mut self,
        texture: Texture,
        x: f32,
        y: f32,
        group: Option<Group>,
    ) -> Result<SpriteId, EngineError> {
        if !self.textures.contains(&texture) {
            return Err(EngineError::MissingTexture(texture));
        }
        if self.bodies.len() >= self.sprite_limit {
            return Err(EngineError::SpriteLimit);
        }

        let id = self.next_id();
        self.bodies.insert(
            id,
            Body {
                texture,
                group,
                x,
                y,
                vx: 0.0,
                vy: 0.0,
                scale: 1.0,
                tint: None,
                name: None,
                collide_world_bounds: false,
                bounce: 0.0,
            },
        );
        Ok(id)
    }

    fn destroy(&mut self, id: SpriteId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn sprite(&self, id: SpriteId) -> Option<SpriteView> {
        self.bodies.get(&id).map(|b| SpriteView {
            id,
            texture: b.texture,
            group: b.group,
            x: b.x,
            y: b.y,
            vx: b.vx,
            vy: b.vy,
            scale: b.scale,
            tint: b.tint,
        })
    }

    fn set_position(&mut self, id: SpriteId, x: f32, y: f32) -> Result<(), EngineError> {
        let body = self.body_mut(id)?;
        body.x = x;
        body.y = y;
        Ok(())
    }

    fn set_velocity(&mut self, id: SpriteId, vx: f32, vy: f32) -> Result<(), EngineError> {
        let body = self.body_mut(id)?;
        body.vx = vx;
        body.vy = vy;
        Ok(())
    }

    fn set_velocity_x(&mut self, id: SpriteId, vx: f32) -> Result<(), EngineError> {
        self.body_mut(id)?.vx = vx;
        Ok(())
    }

    fn set_collide_world_bounds(
        &mut self,
        id: SpriteId,
        enabled: bool,
    ) -> Result<(), EngineError> {
        self.body_mut(id)?.collide_world_bounds = enabled;
        Ok(())
    }

    fn set_bounce(&mut self, id: SpriteId, bounce: f32) -> Result<(), EngineError> {
        self.body_mut(id)?.bounce = bounce;
        Ok(())
    }

    fn set_scale(&mut self, id: SpriteId, scale: f32) -> Result<(), EngineError> {
        self.body_mut(id)?.scale = scale;
        Ok(())
    }

    fn set_tint(&mut self, id: SpriteId, tint: u32) -> Result<(), EngineError> {
        self.body_mut(id)?.tint = Some(tint);
        Ok(())
    }

    fn set_name(&mut self, id: SpriteId, name: &str) -> Result<(), EngineError> {
        self.body_mut(id)?.name = Some(name.to_string());
        Ok(())
    }

    fn name(&self, id: SpriteId) -> Option<String> {
        self.bodies.get(&id).and_then(|b| b.name.clone())
    }

    fn members(&self, group: Group) -> Vec<SpriteId> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.group == Some(group))
            .map(|(&id, _)| id)
            .collect()
    }

    fn clear_group(&mut self, group: Group) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|_, b| b.group != Some(group));
        before - self.bodies.len()
    }

    fn add_text(&mut self, x: f32, y: f32, content: &str) -> TextId {
        let id = self.next_id();
        self.texts.insert(
            id,
            TextObject {
                x,
                y,
                content: content.to_string(),
            },
        );
        id
    }

    fn set_text(&mut self, id: TextId, content: &str) -> Result<(), EngineError> {
        let text = self
            .texts
            .get_mut(&id)
            .ok_or(EngineError::UnknownText(id))?;
        text.content = content.to_string();
        Ok(())
    }

    fn text(&self, id: TextId) -> Option<String> {
        self.texts.get(&id).map(|t| t.content.clone())
    }

    fn add_collider(&mut self, a: Group, b: Group) {
        if !self.colliders.contains(&(a, b)) {
            self.colliders.push((a, b));
        }
    }

    fn step(&mut self, dt: f32) -> Vec<Collision> {
        self.integrate(dt);
        self.detect_collisions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> ArcadeWorld {
        let mut world = ArcadeWorld::new(800.0, 600.0);
        for texture in Texture::ALL {
            world.load_texture(texture).expect("texture loads");
        }
        world
    }

    #[test]
    fn when_texture_is_not_loaded_then_sprite_creation_fails() {
        let mut world = ArcadeWorld::new(800.0, 600.0);
        assert_eq!(
            world.create_sprite(Texture::Enemy, 10.0, 10.0, None),
            Err(EngineError::MissingTexture(Texture::Enemy))
        );
    }

    #[test]
    fn when_sprite_limit_is_reached_then_creation_fails() {
        let mut world = world().with_sprite_limit(1);
        world
            .create_sprite(Texture::Bullet, 0.0, 0.0, Some(Group::Bullets))
            .expect("first sprite fits");
        assert_eq!(
            world.create_sprite(Texture::Bullet, 0.0, 0.0, Some(Group::Bullets)),
            Err(EngineError::SpriteLimit)
        );
    }

    #[test]
    fn when_stepping_then_velocity_is_integrated() {
        let mut world = world();
        let id = world
            .create_sprite(Texture::Bullet, 100.0, 300.0, Some(Group::Bullets))
            .expect("sprite created");
        world.set_velocity(id, 0.0, -400.0).expect("sprite exists");

        world.step(0.5);

        let view = world.sprite(id).expect("sprite exists");
        assert_eq!((view.x, view.y), (100.0, 100.0));
    }

    #[test]
    fn when_bouncy_sprite_hits_the_wall_then_velocity_reverses() {
        let mut world = world();
        let id = world
            .create_sprite(Texture::Enemy, 790.0, 300.0, Some(Group::Enemies))
            .expect("sprite created");
        world.set_collide_world_bounds(id, true).expect("sprite exists");
        world.set_bounce(id, 1.0).expect("sprite exists");
        world.set_velocity(id, 100.0, 0.0).expect("sprite exists");

        world.step(0.1);

        let view = world.sprite(id).expect("sprite exists");
        assert_eq!(view.x, 800.0 - 24.0);
        assert_eq!(view.vx, -100.0);
    }

    #[test]
    fn when_bounded_sprite_without_bounce_hits_the_wall_then_it_stops() {
        let mut world = world();
        let id = world
            .create_sprite(Texture::Player, 10.0, 550.0, None)
            .expect("sprite created");
        world.set_collide_world_bounds(id, true).expect("sprite exists");
        world.set_velocity_x(id, -300.0).expect("sprite exists");

        world.step(1.0);

        let view = world.sprite(id).expect("sprite exists");
        assert_eq!(view.x, 32.0);
        assert_eq!(view.vx, 0.0);
    }

    #[test]
    fn when_groups_overlap_then_collider_reports_each_sprite_once() {
        let mut world = world();
        world.add_collider(Group::Bullets, Group::Enemies);
        let bullet = world
            .create_sprite(Texture::Bullet, 100.0, 100.0, Some(Group::Bullets))
            .expect("sprite created");
        let first = world
            .create_sprite(Texture::Enemy, 100.0, 105.0, Some(Group::Enemies))
            .expect("sprite created");
        let _second = world
            .create_sprite(Texture::Enemy, 100.0, 95.0, Some(Group::Enemies))
            .expect("sprite created");

        let collisions = world.step(0.0);

        assert_eq!(collisions, vec![Collision { a: bullet, b: first }]);
    }

    #[test]
    fn when_no_collider_is_registered_then_overlaps_are_ignored() {
        let mut world = world();
        world
            .create_sprite(Texture::Bullet, 100.0, 100.0, Some(Group::Bullets))
            .expect("sprite created");
        world
            .create_sprite(Texture::Enemy, 100.0, 100.0, Some(Group::Enemies))
            .expect("sprite created");

        assert!(world.step(0.0).is_empty());
    }

    #[test]
    fn when_group_is_cleared_then_only_its_members_are_destroyed() {
        let mut world = world();
        world
            .create_sprite(Texture::Enemy, 0.0, 0.0, Some(Group::Enemies))
            .expect("sprite created");
        world
            .create_sprite(Texture::Enemy, 0.0, 0.0, Some(Group::Enemies))
            .expect("sprite created");
        let bullet = world
            .create_sprite(Texture::Bullet, 0.0, 0.0, Some(Group::Bullets))
            .expect("sprite created");

        assert_eq!(world.clear_group(Group::Enemies), 2);
        assert_eq!(world.count_active(Group::Enemies), 0);
        assert!(world.sprite(bullet).is_some());
    }

    #[test]
    fn when_text_is_updated_then_new_content_is_readable() {
        let mut world = world();
        let id = world.add_text(20.0, 20.0, "Score: 0");
        world.set_text(id, "Score: 10").expect("text exists");
        assert_eq!(world.text(id).as_deref(), Some("Score: 10"));
        assert_eq!(world.set_text(999, "x"), Err(EngineError::UnknownText(999)));
    }

    #[test]
    fn when_sprite_is_named_then_name_is_readable_until_destroyed() {
        let mut world = world();
        let id = world
            .create_sprite(Texture::Player, 0.0, 0.0, Some(Group::RemotePlayers))
            .expect("sprite created");
        assert_eq!(world.name(id), None);

        world.set_name(id, "player_AB").expect("sprite exists");
        assert_eq!(world.name(id).as_deref(), Some("player_AB"));

        world.destroy(id);
        assert_eq!(world.name(id), None);
        assert_eq!(world.set_name(id, "x"), Err(EngineError::UnknownSprite(id)));
    }
}
