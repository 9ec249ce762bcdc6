// src/scene/types.rs
//! Small value types shared by entities and materials.

use glam::{Mat4, Quat, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing entity ID generator.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Decomposed rigid (plus scale) transform of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    /// Warm gold used by the resting particle gradient.
    pub const GOLD: Self = Self::rgb(1.0, 0.8, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_transform_matrix_roundtrip() {
        let m = Mat4::from_rotation_translation(
            Quat::from_rotation_x(0.4),
            Vec3::new(0.5, -1.0, 2.0),
        );
        let t = Transform::from_matrix(m);
        assert!(t.matrix().abs_diff_eq(m, 1e-5));
        assert!((t.scale - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn test_color_with_alpha() {
        let c = Color::CYAN.with_alpha(0.1);
        assert_eq!(c.to_array(), [0.0, 1.0, 1.0, 0.1]);
    }
}
