// src/anchor/mod.rs
//! Sensor-side data model.
//!
//! Anchors are received, never owned: the sensing subsystem hands out
//! snapshots of tracked surfaces and hands, and the rest of the crate derives
//! its own state from them.

pub mod hand;
pub mod mesh;

pub use hand::{Chirality, HandAnchor, HandJoint, HandSkeleton, JointPose};
pub use mesh::{AnchorEvent, AnchorId, AnchorUpdate, MeshAnchor};
