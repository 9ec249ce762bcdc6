// src/lib.rs
//! Live spatial-mesh reconstruction with hand-motion driven effects.
//!
//! Mesh anchors stream in and become one renderable entity each; wrist motion
//! is turned into a smoothed intensity that drives an environment shader
//! parameter and a particle emitter. An optional headless wgpu mirror draws
//! the reconstructed surfaces offscreen.

pub mod anchor;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod motion;
pub mod renderer;
pub mod scene;
pub mod session;
