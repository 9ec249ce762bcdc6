// src/scene/store.rs
//! Anchor-keyed store of reconstructed mesh entities.
//!
//! Each anchor identity maps to at most one entity. The entity is created the
//! first time its anchor is seen; later updates only move it. Geometry is not
//! regenerated on later updates, so a surface that the sensor refines keeps
//! its first reconstruction.

use super::entity::{MeshEntity, SceneRoot};
use super::material::SharedMaterial;
use super::types::{EntityId, Transform};
use crate::anchor::{AnchorId, MeshAnchor};
use crate::geometry;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new entity was built and attached to the scene root.
    Created(EntityId),
    /// An existing entity received the anchor's current pose.
    Moved(EntityId),
    /// Geometry conversion failed; nothing was created.
    Skipped,
}

pub struct MeshStore {
    entities: HashMap<AnchorId, MeshEntity>,
    uv_scale: f32,
    opacity: f32,
}

impl MeshStore {
    pub fn new(uv_scale: f32, opacity: f32) -> Self {
        Self {
            entities: HashMap::new(),
            uv_scale,
            opacity,
        }
    }

    /// Creates or moves the entity for `anchor`.
    ///
    /// The material is taken from `shared` only when the entity is created.
    pub fn upsert(
        &mut self,
        anchor: &MeshAnchor,
        shared: &SharedMaterial,
        root: &mut SceneRoot,
    ) -> Upsert {
        if let Some(entity) = self.entities.get_mut(&anchor.id) {
            entity.transform = Transform::from_matrix(anchor.origin_from_anchor);
            return Upsert::Moved(entity.id);
        }

        let mesh = match geometry::convert(&format!("anchor-{}", anchor.id), &anchor.geometry, self.uv_scale) {
            Ok(mesh) => mesh,
            Err(e) => {
                warn!("Skipping anchor {}: {}", anchor.id, e);
                return Upsert::Skipped;
            }
        };

        let (min, max) = mesh.bounds();
        debug!(
            "Anchor {}: verts={}, tris={}, AABB=min({:.2},{:.2},{:.2}) max({:.2},{:.2},{:.2}), shader={}",
            anchor.id,
            mesh.vertex_count(),
            mesh.triangle_count(),
            min.x, min.y, min.z,
            max.x, max.y, max.z,
            shared.is_loaded(),
        );

        let entity = MeshEntity {
            id: EntityId::next(),
            anchor: anchor.id,
            mesh: Arc::new(mesh),
            material: shared.instantiate(),
            transform: Transform::from_matrix(anchor.origin_from_anchor),
            opacity: self.opacity,
        };
        let id = entity.id;
        self.entities.insert(anchor.id, entity);
        root.add_child(id);
        Upsert::Created(id)
    }

    pub fn get(&self, anchor: &AnchorId) -> Option<&MeshEntity> {
        self.entities.get(anchor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MeshEntity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEFAULT_UV_SCALE;
    use crate::scene::material::{Material, ParameterValue, ShaderMaterial};
    use glam::{Mat4, Vec3};
    use meshbuf::{IndexWidth, RawGeometry};

    fn triangle() -> RawGeometry {
        RawGeometry::from_parts(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            16,
            &[0, 1, 2],
            IndexWidth::U16,
        )
        .unwrap()
    }

    fn anchor(id: AnchorId, at: Vec3) -> MeshAnchor {
        MeshAnchor {
            id,
            origin_from_anchor: Mat4::from_translation(at),
            geometry: triangle(),
        }
    }

    fn store() -> MeshStore {
        MeshStore::new(DEFAULT_UV_SCALE, 0.25)
    }

    #[test]
    fn test_create_then_move() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let id = AnchorId::new_v4();

        let created = s.upsert(&anchor(id, Vec3::ZERO), &SharedMaterial::Unavailable, &mut root);
        let Upsert::Created(eid) = created else { panic!("expected Created, got {created:?}") };
        assert!(root.contains(eid));

        let moved = s.upsert(&anchor(id, Vec3::new(0.0, 2.0, 0.0)), &SharedMaterial::Unavailable, &mut root);
        assert_eq!(moved, Upsert::Moved(eid));
        assert_eq!(s.len(), 1);
        assert_eq!(root.children().len(), 1);
        assert_eq!(s.get(&id).unwrap().transform.translation, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_idempotent_upsert() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let a = anchor(AnchorId::new_v4(), Vec3::new(1.0, 0.0, -2.0));

        s.upsert(&a, &SharedMaterial::Unavailable, &mut root);
        let first = s.get(&a.id).unwrap().transform;
        s.upsert(&a, &SharedMaterial::Unavailable, &mut root);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(&a.id).unwrap().transform, first);
    }

    #[test]
    fn test_distinct_anchors_are_unique() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let ids: Vec<AnchorId> = (0..5).map(|_| AnchorId::new_v4()).collect();
        for id in &ids {
            s.upsert(&anchor(*id, Vec3::ZERO), &SharedMaterial::Unavailable, &mut root);
        }
        assert_eq!(s.len(), 5);

        s.upsert(&anchor(ids[2], Vec3::ONE), &SharedMaterial::Unavailable, &mut root);
        assert_eq!(s.len(), 5);
        assert_eq!(root.children().len(), 5);
    }

    #[test]
    fn test_geometry_not_regenerated() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let id = AnchorId::new_v4();
        s.upsert(&anchor(id, Vec3::ZERO), &SharedMaterial::Unavailable, &mut root);
        let before = Arc::clone(&s.get(&id).unwrap().mesh);

        let mut refined = anchor(id, Vec3::ZERO);
        refined.geometry = RawGeometry::from_parts(
            &[[0.0; 3], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [2.0, 2.0, 0.0]],
            12,
            &[0, 1, 2, 1, 3, 2],
            IndexWidth::U32,
        )
        .unwrap();
        s.upsert(&refined, &SharedMaterial::Unavailable, &mut root);
        assert!(Arc::ptr_eq(&before, &s.get(&id).unwrap().mesh));
    }

    #[test]
    fn test_bad_geometry_is_skipped() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let mut a = anchor(AnchorId::new_v4(), Vec3::ZERO);
        a.geometry.index_width = 3;

        assert_eq!(s.upsert(&a, &SharedMaterial::Unavailable, &mut root), Upsert::Skipped);
        assert!(s.is_empty());
        assert!(root.children().is_empty());

        // A later valid update for the same anchor still creates it.
        a.geometry = triangle();
        assert!(matches!(
            s.upsert(&a, &SharedMaterial::Unavailable, &mut root),
            Upsert::Created(_)
        ));
    }

    #[test]
    fn test_material_choice_at_creation() {
        let mut s = store();
        let mut root = SceneRoot::new();
        let shader = ShaderMaterial::new("env").with_parameter("Intensity", ParameterValue::Float(0.0));

        let fallback_id = AnchorId::new_v4();
        s.upsert(&anchor(fallback_id, Vec3::ZERO), &SharedMaterial::Unavailable, &mut root);

        let shared = SharedMaterial::Loaded(shader);
        let shaded_id = AnchorId::new_v4();
        s.upsert(&anchor(shaded_id, Vec3::ZERO), &shared, &mut root);
        // Existing entities keep their original material.
        s.upsert(&anchor(fallback_id, Vec3::ONE), &shared, &mut root);

        assert!(matches!(s.get(&fallback_id).unwrap().material, Material::Simple(_)));
        assert!(matches!(s.get(&shaded_id).unwrap().material, Material::Shader(_)));
        assert!((s.get(&shaded_id).unwrap().opacity - 0.25).abs() < f32::EPSILON);
    }
}
