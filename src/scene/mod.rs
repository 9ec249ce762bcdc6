// src/scene/mod.rs
//! Scene-side state owned by the visualization.
//!
//! This module provides:
//! - Mesh entities keyed by anchor identity (`store`)
//! - Environment and fallback materials (`material`)
//! - The particle-emitting effect entity (`entity`, `particles`)
//! - Intensity propagation into both (`effects`)

pub mod effects;
pub mod entity;
pub mod material;
pub mod particles;
pub mod store;
pub mod types;

pub use effects::EffectPropagator;
pub use entity::{EffectEntity, MeshEntity, SceneRoot};
pub use material::{
    JsonMaterialLibrary, Material, MaterialError, MaterialLibrary, ParameterValue, ShaderMaterial,
    SharedMaterial, SimpleMaterial,
};
pub use particles::{ColorGradient, ParticleEmitter, TextureHandle};
pub use store::{MeshStore, Upsert};
pub use types::{Color, EntityId, Transform};
