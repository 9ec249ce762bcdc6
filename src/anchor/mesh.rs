// src/anchor/mesh.rs
use glam::Mat4;
use meshbuf::RawGeometry;
use std::fmt;
use uuid::Uuid;

/// Stable identity of a reconstructed surface patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub Uuid);

impl AnchorId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A surface anchor: identity, rigid pose, and the raw geometry buffers.
#[derive(Debug, Clone)]
pub struct MeshAnchor {
    pub id: AnchorId,
    /// World-from-anchor transform.
    pub origin_from_anchor: Mat4,
    pub geometry: RawGeometry,
}

/// What happened to an anchor in a given update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEvent {
    Added,
    Updated,
    Removed,
}

/// One item of the mesh-anchor stream.
#[derive(Debug, Clone)]
pub struct AnchorUpdate {
    pub event: AnchorEvent,
    pub anchor: MeshAnchor,
}
