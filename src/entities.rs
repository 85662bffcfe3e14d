use log::debug;

use crate::registry::{EntityId, EntityRegistry};
use crate::types::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Laser,
    Asteroid,
}

/// A movable game object. Position lives in play-field pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub rect: Rect,
    pub vertical_speed: f64, // Pixels per frame, negative is upwards
    pub alive: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, rect: Rect, vertical_speed: f64) -> Self {
        Entity {
            kind,
            rect,
            vertical_speed,
            alive: true,
        }
    }

    /// Laser whose bottom edge starts at `(center_x, bottom)`.
    pub fn laser(center_x: f64, bottom: f64, width: f64, height: f64, speed: f64) -> Self {
        let mut rect = Rect::new(0.0, 0.0, width, height);
        rect.set_center_x(center_x);
        rect.set_bottom(bottom);
        Entity::new(EntityKind::Laser, rect, -speed.abs())
    }

    /// Asteroid entering from the top edge.
    pub fn asteroid(x: f64, width: f64, height: f64, speed: f64) -> Self {
        Entity::new(EntityKind::Asteroid, Rect::new(x, 0.0, width, height), speed.abs())
    }

    /// Advances one frame. The player is moved by [`Player::steer`] instead.
    pub fn update(&mut self, field_height: f64) {
        match self.kind {
            EntityKind::Player => {}
            EntityKind::Laser => {
                self.rect.y += self.vertical_speed;
                if self.rect.bottom() < 0.0 {
                    self.alive = false;
                }
            }
            EntityKind::Asteroid => {
                self.rect.y += self.vertical_speed;
                if self.rect.top() > field_height {
                    self.alive = false;
                }
            }
        }
    }
}

/// Tuning for the player's ship and the lasers it fires.
#[derive(Clone, Copy, Debug)]
pub struct PlayerSpec {
    pub width: f64,
    pub height: f64,
    pub speed: f64,
    pub shoot_delay_ms: u64,
    pub bottom_margin: f64,
    pub laser_width: f64,
    pub laser_height: f64,
    pub laser_speed: f64,
}

/// The one ship per session. Its body lives in the registry; this keeps the
/// handle plus the weapon state.
#[derive(Debug)]
pub struct Player {
    pub id: EntityId,
    pub spec: PlayerSpec,
    pub last_shot_ms: Option<u64>,
}

impl Player {
    pub fn spawn(
        registry: &mut EntityRegistry,
        spec: PlayerSpec,
        field_width: f64,
        field_height: f64,
    ) -> Self {
        let rect = Player::start_rect(&spec, field_width, field_height);
        let id = registry.add(Entity::new(EntityKind::Player, rect, 0.0));
        Player {
            id,
            spec,
            last_shot_ms: None,
        }
    }

    fn start_rect(spec: &PlayerSpec, field_width: f64, field_height: f64) -> Rect {
        Rect::new(
            field_width / 2.0 - spec.width / 2.0,
            field_height - spec.bottom_margin - spec.height / 2.0,
            spec.width,
            spec.height,
        )
    }

    pub fn rect(&self, registry: &EntityRegistry) -> Option<Rect> {
        registry.get(self.id).map(|entity| entity.rect)
    }

    /// Moves the ship back to its starting spot and clears the cooldown.
    pub fn reset(&mut self, registry: &mut EntityRegistry, field_width: f64, field_height: f64) {
        let start = Player::start_rect(&self.spec, field_width, field_height);
        if let Some(entity) = registry.get_mut(self.id) {
            entity.rect = start;
        }
        self.last_shot_ms = None;
    }

    /// Applies one frame of horizontal movement for whichever arrows are held.
    pub fn steer(&self, registry: &mut EntityRegistry, left: bool, right: bool, field_width: f64) {
        let Some(entity) = registry.get_mut(self.id) else {
            return;
        };
        if left {
            entity.rect.x -= self.spec.speed;
        }
        if right {
            entity.rect.x += self.spec.speed;
        }
        entity.rect.clamp_horizontal(field_width);
    }

    /// Fires a laser unless the weapon is still cooling down. Calls inside the
    /// cooldown window are dropped.
    pub fn shoot(&mut self, registry: &mut EntityRegistry, now_ms: u64) -> Option<EntityId> {
        if let Some(last) = self.last_shot_ms {
            if now_ms.saturating_sub(last) <= self.spec.shoot_delay_ms {
                return None;
            }
        }
        let rect = self.rect(registry)?;
        self.last_shot_ms = Some(now_ms);
        let laser = Entity::laser(
            rect.center_x(),
            rect.top(),
            self.spec.laser_width,
            self.spec.laser_height,
            self.spec.laser_speed,
        );
        let id = registry.add(laser);
        debug!("Laser fired at x={:.0}", rect.center_x());
        Some(id)
    }
}
