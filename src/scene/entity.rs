// src/scene/entity.rs
use super::material::Material;
use super::particles::ParticleEmitter;
use super::types::{EntityId, Transform};
use crate::anchor::AnchorId;
use crate::geometry::TriangleMesh;
use glam::Vec3;
use std::sync::Arc;

/// A reconstructed surface. Owned by the mesh store, one per anchor identity.
#[derive(Debug, Clone)]
pub struct MeshEntity {
    pub id: EntityId,
    pub anchor: AnchorId,
    /// Geometry derived once, when the entity was created.
    pub mesh: Arc<TriangleMesh>,
    pub material: Material,
    pub transform: Transform,
    /// Compositing opacity of the whole entity.
    pub opacity: f32,
}

/// The fixed, pre-placed object that emits particles.
#[derive(Debug, Clone)]
pub struct EffectEntity {
    pub id: EntityId,
    pub transform: Transform,
    pub particles: ParticleEmitter,
}

impl EffectEntity {
    pub fn new(position: Vec3, particles: ParticleEmitter) -> Self {
        Self {
            id: EntityId::next(),
            transform: Transform::from_translation(position),
            particles,
        }
    }
}

/// External container new entities are attached to. Append-only.
#[derive(Debug, Default)]
pub struct SceneRoot {
    children: Vec<EntityId>,
}

impl SceneRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child(&mut self, id: EntityId) {
        self.children.push(id);
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.children.contains(&id)
    }
}
