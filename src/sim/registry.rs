//! Object registry
//!
//! Owns every entity in append order. Cars and NPCs are additionally listed in
//! id indices; those are views, never copies.

use super::entity::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    cars: Vec<EntityId>,
    npcs: Vec<EntityId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity, indexing it if it is a car or NPC
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        entity.id = id;
        match entity.kind() {
            EntityKind::Car => self.cars.push(id),
            EntityKind::Npc => self.npcs.push(id),
            _ => {}
        }
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn car_ids(&self) -> &[EntityId] {
        &self.cars
    }

    pub fn npc_ids(&self) -> &[EntityId] {
        &self.npcs
    }

    /// Number of entities of a given kind
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Car => self.cars.len(),
            EntityKind::Npc => self.npcs.len(),
            _ => self.entities.iter().filter(|e| e.kind() == kind).count(),
        }
    }
}
