// src/renderer/pipelines/mod.rs
//! Rendering pipeline implementations.

pub mod base;
pub mod environment;
