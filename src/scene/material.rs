// src/scene/material.rs
//! Materials bound to reconstructed meshes.
//!
//! The environment is drawn with a shared shader material when one could be
//! loaded at startup, and with a translucent fallback otherwise. The choice is
//! made once per entity at creation time.

use super::types::Color;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("material {material} has no parameter named {name}")]
    UnknownParameter { material: String, name: String },

    #[error("parameter {name} expects a {expected} value")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("material {name} not found in {library}")]
    NotFound { name: String, library: String },

    #[error("failed to read material library {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse material library {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A value bound to a named shader input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    Float(f32),
    Color([f32; 4]),
}

impl ParameterValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Color(_) => "color",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Color(_) => None,
        }
    }
}

/// A shader-graph material with a fixed set of declared parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderMaterial {
    pub name: String,
    /// Declared inputs and their current values. Only declared inputs can be set.
    pub parameters: BTreeMap<String, ParameterValue>,
}

impl ShaderMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<ParameterValue> {
        self.parameters.get(name).copied()
    }

    /// Overwrites a declared parameter. Unknown names and type changes are rejected.
    pub fn set_parameter(&mut self, name: &str, value: ParameterValue) -> Result<(), MaterialError> {
        let slot = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| MaterialError::UnknownParameter {
                material: self.name.clone(),
                name: name.to_string(),
            })?;
        if slot.kind() != value.kind() {
            return Err(MaterialError::TypeMismatch {
                name: name.to_string(),
                expected: slot.kind(),
            });
        }
        *slot = value;
        Ok(())
    }
}

/// Fixed-function physically based material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleMaterial {
    pub base_color: Color,
    pub metallic: bool,
    pub roughness: f32,
}

impl SimpleMaterial {
    /// Translucent cyan, metallic, low roughness: marks surfaces that are
    /// drawn without the environment shader.
    pub fn translucent_fallback() -> Self {
        Self {
            base_color: Color::CYAN.with_alpha(0.1),
            metallic: true,
            roughness: 0.1,
        }
    }
}

/// Material bound to a single entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Shader(ShaderMaterial),
    Simple(SimpleMaterial),
}

impl Material {
    pub fn as_shader(&self) -> Option<&ShaderMaterial> {
        match self {
            Self::Shader(m) => Some(m),
            Self::Simple(_) => None,
        }
    }

    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match self {
            Self::Shader(m) => Some(m),
            Self::Simple(_) => None,
        }
    }
}

/// Outcome of the one-shot environment material load.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SharedMaterial {
    Loaded(ShaderMaterial),
    #[default]
    Unavailable,
}

impl SharedMaterial {
    /// Runs the loader once. Any failure degrades to [`SharedMaterial::Unavailable`].
    pub async fn load<L: MaterialLibrary>(library: &L, name: &str) -> Self {
        match library.load_shader_material(name).await {
            Ok(material) => {
                info!(
                    "Environment material {} loaded ({} parameters)",
                    material.name,
                    material.parameters.len()
                );
                Self::Loaded(material)
            }
            Err(e) => {
                warn!("Environment material unavailable, using fallback: {e}");
                Self::Unavailable
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Material for a newly created mesh entity.
    pub fn instantiate(&self) -> Material {
        match self {
            Self::Loaded(m) => Material::Shader(m.clone()),
            Self::Unavailable => Material::Simple(SimpleMaterial::translucent_fallback()),
        }
    }
}

/// Source of shader materials, resolved by name.
pub trait MaterialLibrary {
    fn load_shader_material(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<ShaderMaterial, MaterialError>> + Send;
}

/// Material library stored as a JSON array of [`ShaderMaterial`] definitions.
#[derive(Debug, Clone)]
pub struct JsonMaterialLibrary {
    pub path: PathBuf,
}

impl JsonMaterialLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MaterialLibrary for JsonMaterialLibrary {
    async fn load_shader_material(&self, name: &str) -> Result<ShaderMaterial, MaterialError> {
        let path = self.path.display().to_string();
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| MaterialError::Io { path: path.clone(), source })?;
        let materials: Vec<ShaderMaterial> = serde_json::from_str(&text)
            .map_err(|source| MaterialError::Parse { path: path.clone(), source })?;
        materials
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| MaterialError::NotFound {
                name: name.to_string(),
                library: path,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star_material() -> ShaderMaterial {
        ShaderMaterial::new("/Root/SuperStarMaterial")
            .with_parameter("Intensity", ParameterValue::Float(0.0))
    }

    struct FixedLibrary(Option<ShaderMaterial>);

    impl MaterialLibrary for FixedLibrary {
        async fn load_shader_material(&self, name: &str) -> Result<ShaderMaterial, MaterialError> {
            self.0.clone().ok_or_else(|| MaterialError::NotFound {
                name: name.to_string(),
                library: "fixed".into(),
            })
        }
    }

    #[test]
    fn test_set_declared_parameter() {
        let mut m = star_material();
        m.set_parameter("Intensity", ParameterValue::Float(2.5)).unwrap();
        assert_eq!(m.parameter("Intensity"), Some(ParameterValue::Float(2.5)));
    }

    #[test]
    fn test_set_unknown_parameter_fails() {
        let mut m = star_material();
        let err = m.set_parameter("Glow", ParameterValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, MaterialError::UnknownParameter { .. }));
        assert!(m.parameter("Glow").is_none());
    }

    #[test]
    fn test_set_parameter_type_mismatch() {
        let mut m = star_material();
        let err = m
            .set_parameter("Intensity", ParameterValue::Color([1.0; 4]))
            .unwrap_err();
        assert!(matches!(err, MaterialError::TypeMismatch { expected: "float", .. }));
        assert_eq!(m.parameter("Intensity"), Some(ParameterValue::Float(0.0)));
    }

    #[test]
    fn test_fallback_instantiation() {
        match SharedMaterial::Unavailable.instantiate() {
            Material::Simple(s) => {
                assert!(s.metallic);
                assert!((s.roughness - 0.1).abs() < f32::EPSILON);
                assert!((s.base_color.a - 0.1).abs() < f32::EPSILON);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_loaded_instantiation_clones() {
        let shared = SharedMaterial::Loaded(star_material());
        let mut a = shared.instantiate();
        let b = shared.instantiate();
        a.as_shader_mut()
            .unwrap()
            .set_parameter("Intensity", ParameterValue::Float(4.0))
            .unwrap();
        // Entities carry independent copies.
        assert_eq!(
            b.as_shader().unwrap().parameter("Intensity"),
            Some(ParameterValue::Float(0.0))
        );
    }

    #[test]
    fn test_json_definition() {
        let json = r#"[{ "name": "/Root/SuperStarMaterial",
                         "parameters": { "Intensity": { "float": 0.0 },
                                         "Tint": { "color": [1.0, 0.8, 0.0, 1.0] } } }]"#;
        let parsed: Vec<ShaderMaterial> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].parameters.len(), 2);
        assert_eq!(parsed[0].parameter("Intensity"), Some(ParameterValue::Float(0.0)));
    }

    #[tokio::test]
    async fn test_load_success_and_failure() {
        let ok = SharedMaterial::load(&FixedLibrary(Some(star_material())), "/Root/SuperStarMaterial").await;
        assert!(ok.is_loaded());

        let missing = SharedMaterial::load(&FixedLibrary(None), "/Root/SuperStarMaterial").await;
        assert_eq!(missing, SharedMaterial::Unavailable);
    }

    #[tokio::test]
    async fn test_json_library_missing_file() {
        let lib = JsonMaterialLibrary::new("/nonexistent/materials.json");
        let shared = SharedMaterial::load(&lib, "/Root/SuperStarMaterial").await;
        assert!(!shared.is_loaded());
    }
}
