// src/motion/mod.rs
//! Hand-motion signal processing.
//!
//! This module turns raw wrist samples into the single normalized intensity
//! that drives every visual effect:
//! - Per-hand speed estimation and clamped linear mapping
//! - Asymmetric (fast attack, slow decay) exponential smoothing

pub mod estimator;
pub mod smoother;

pub use self::estimator::{map_speed_to_intensity, MotionEstimator, MotionSample};
pub use self::smoother::{lerp, IntensitySmoother};
