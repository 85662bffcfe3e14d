//! Arena of live entities plus the index sets the game loop iterates.
//!
//! Entities are owned by the arena and addressed through stable [`EntityId`]
//! handles. The `all`, `lasers` and `asteroids` sets only hold handles, in
//! insertion order, and [`EntityRegistry::prune`] drops every handle whose
//! entity has been marked dead.

use slotmap::{SlotMap, new_key_type};

use crate::entities::{Entity, EntityKind};

new_key_type! {
    pub struct EntityId;
}

#[derive(Default)]
pub struct EntityRegistry {
    arena: SlotMap<EntityId, Entity>,
    all: Vec<EntityId>,
    lasers: Vec<EntityId>,
    asteroids: Vec<EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the entity and indexes it in `all` plus its kind's set.
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let kind = entity.kind;
        let id = self.arena.insert(entity);
        self.all.push(id);
        match kind {
            EntityKind::Laser => self.lasers.push(id),
            EntityKind::Asteroid => self.asteroids.push(id),
            EntityKind::Player => {}
        }
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.arena.get_mut(id)
    }

    #[cfg(test)]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.arena.get(id).is_some_and(|entity| entity.alive)
    }

    /// Marks the entity dead; it disappears from every set on the next prune.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.arena.get_mut(id) {
            entity.alive = false;
        }
    }

    pub fn all(&self) -> &[EntityId] {
        &self.all
    }

    pub fn lasers(&self) -> &[EntityId] {
        &self.lasers
    }

    pub fn asteroids(&self) -> &[EntityId] {
        &self.asteroids
    }

    /// Entities in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.all.iter().filter_map(|id| self.arena.get(*id))
    }

    pub fn update_all(&mut self, field_height: f64) {
        for id in &self.all {
            if let Some(entity) = self.arena.get_mut(*id) {
                entity.update(field_height);
            }
        }
    }

    /// Removes dead entities from the arena and every index set. Returns how
    /// many were dropped.
    pub fn prune(&mut self) -> usize {
        let arena = &mut self.arena;
        let before = arena.len();
        arena.retain(|_, entity| entity.alive);
        self.all.retain(|id| arena.contains_key(*id));
        self.lasers.retain(|id| arena.contains_key(*id));
        self.asteroids.retain(|id| arena.contains_key(*id));
        before - arena.len()
    }

    /// Kills and prunes every laser and asteroid, leaving the player alone.
    pub fn clear_projectiles(&mut self) {
        for id in self.lasers.iter().chain(self.asteroids.iter()) {
            if let Some(entity) = self.arena.get_mut(*id) {
                entity.alive = false;
            }
        }
        self.prune();
    }
}
