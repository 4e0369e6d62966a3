//! Read-only views of the live entities for renderers.

use crate::entity::{Entity, EntityId};
use bytemuck::{Pod, Zeroable};
use std::ops::Index;

/// Per-entity instance record, laid out for a GPU vertex/instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub position: [f32; 2],
    /// `size * scale`.
    pub size: f32,
    pub opacity: f32,
    pub color: [f32; 3],
    pub shape: u32,
}

impl From<&Entity> for RenderInstance {
    fn from(e: &Entity) -> Self {
        Self {
            position: e.position.to_array(),
            size: e.visual_size(),
            opacity: e.opacity,
            color: e.color.to_array(),
            shape: e.shape.index(),
        }
    }
}

/// Borrowed view of a store's live entities, oldest first.
///
/// The store cannot be ticked or spawned into while a snapshot is held.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    entities: &'a [Entity],
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(entities: &'a [Entity]) -> Self {
        Self { entities }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Entity> {
        self.entities.iter()
    }

    pub fn as_slice(&self) -> &'a [Entity] {
        self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&'a Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + 'a {
        self.entities.iter().map(Entity::id)
    }

    pub fn to_instances(&self) -> Vec<RenderInstance> {
        self.entities.iter().map(RenderInstance::from).collect()
    }

    /// Instance data as raw bytes, ready for a buffer upload.
    pub fn instance_bytes(&self) -> Vec<u8> {
        let instances = self.to_instances();
        bytemuck::cast_slice(&instances).to_vec()
    }
}

impl<'a> Index<usize> for Snapshot<'a> {
    type Output = Entity;

    fn index(&self, index: usize) -> &Entity {
        &self.entities[index]
    }
}

impl<'a> IntoIterator for Snapshot<'a> {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
