// src/geometry.rs
//! Conversion of raw anchor geometry into renderable triangle meshes.
//!
//! Decoding of the opaque buffers is delegated to `meshbuf`; this module
//! validates the decoded data as a triangle list and derives texture
//! coordinates with a cheap planar projection. The projection only exists to
//! give the environment material spatial variation, it is not a UV unwrap.

use glam::{Vec2, Vec3};
use meshbuf::{DecodeError, RawGeometry};
use rayon::prelude::*;
use thiserror::Error;

/// Default scale of the `(x + z, y)` texture projection.
pub const DEFAULT_UV_SCALE: f32 = 0.18;

/// Vertex count above which per-vertex work is spread over the rayon pool.
const PARALLEL_VERTEX_THRESHOLD: usize = 16 * 1024;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("failed to decode anchor buffers: {0}")]
    Decode(#[from] DecodeError),

    #[error("mesh has no vertices")]
    Empty,

    #[error("triangle list length {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("vertex {0} has a non-finite position")]
    NonFinite(usize),

    #[error("{tex_coords} texture coordinates for {positions} positions")]
    TexCoordMismatch { positions: usize, tex_coords: usize },
}

/// Planar texture coordinate for a single vertex: `(x + z, y) * scale`.
#[inline]
pub fn planar_tex_coord(p: Vec3, scale: f32) -> Vec2 {
    Vec2::new(p.x + p.z, p.y) * scale
}

/// Unvalidated mesh data, as assembled from decoded buffers.
#[derive(Debug, Clone, Default)]
pub struct MeshDescriptor {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub tex_coords: Vec<Vec2>,
}

/// A validated, renderer-ready triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Flat triangle list, three indices per face.
    pub indices: Vec<u32>,
    pub tex_coords: Vec<Vec2>,
}

impl TriangleMesh {
    /// Builds a mesh from a descriptor, rejecting data a renderer could not draw.
    pub fn from_descriptor(desc: MeshDescriptor) -> Result<Self, GeometryError> {
        if desc.positions.is_empty() {
            return Err(GeometryError::Empty);
        }
        if desc.indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(desc.indices.len()));
        }
        if desc.tex_coords.len() != desc.positions.len() {
            return Err(GeometryError::TexCoordMismatch {
                positions: desc.positions.len(),
                tex_coords: desc.tex_coords.len(),
            });
        }
        if let Some(i) = desc.positions.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite(i));
        }
        let vertex_count = desc.positions.len();
        if let Some(&index) = desc.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange { index, vertex_count });
        }

        Ok(Self {
            name: desc.name,
            positions: desc.positions,
            indices: desc.indices,
            tex_coords: desc.tex_coords,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds in anchor space.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }
}

/// Decodes an anchor's raw buffers into a validated triangle mesh.
///
/// # Arguments
/// * `name` - Label carried by the mesh (used in diagnostics and GPU labels)
/// * `raw` - Vertex and face buffers as delivered by the sensor
/// * `uv_scale` - Scale of the planar texture projection
///
/// # Returns
/// The mesh, or the first decode/validation error encountered.
pub fn convert(name: &str, raw: &RawGeometry, uv_scale: f32) -> Result<TriangleMesh, GeometryError> {
    let positions: Vec<Vec3> = raw
        .vertex_source()
        .read_positions()?
        .into_iter()
        .map(Vec3::from_array)
        .collect();
    let indices = raw.face_element()?.read_indices()?;

    let tex_coords: Vec<Vec2> = if positions.len() >= PARALLEL_VERTEX_THRESHOLD {
        positions.par_iter().map(|p| planar_tex_coord(*p, uv_scale)).collect()
    } else {
        positions.iter().map(|p| planar_tex_coord(*p, uv_scale)).collect()
    };

    TriangleMesh::from_descriptor(MeshDescriptor {
        name: name.to_string(),
        positions,
        indices,
        tex_coords,
    })
}
