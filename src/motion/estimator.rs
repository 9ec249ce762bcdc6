// src/motion/estimator.rs
//! Per-hand speed estimation.
//!
//! Speed is the Euclidean distance between two consecutive wrist samples of
//! the same hand, i.e. meters per update rather than meters per second. The
//! two hands are tracked independently and never interact.

use crate::anchor::Chirality;
use glam::Vec3;

/// Maps a speed to a normalized intensity by clamped linear interpolation.
///
/// # Arguments
/// * `speed` - Displacement per update in world units
/// * `min_speed` - Speed at or below which the result is 0
/// * `max_speed` - Speed at or above which the result is 1
///
/// # Returns
/// A value in [0, 1], monotonically non-decreasing in `speed`.
pub fn map_speed_to_intensity(speed: f32, min_speed: f32, max_speed: f32) -> f32 {
    if speed <= min_speed {
        return 0.0;
    }
    if speed >= max_speed {
        return 1.0;
    }
    (speed - min_speed) / (max_speed - min_speed)
}

/// Result of feeding one wrist sample into the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub chirality: Chirality,
    pub speed: f32,
    /// Speed mapped into [0, 1].
    pub intensity: f32,
}

/// Keeps the last wrist position per hand and derives speed from it.
#[derive(Debug, Clone)]
pub struct MotionEstimator {
    min_speed: f32,
    max_speed: f32,
    last_left: Option<Vec3>,
    last_right: Option<Vec3>,
}

impl MotionEstimator {
    pub fn new(min_speed: f32, max_speed: f32) -> Self {
        Self {
            min_speed,
            max_speed,
            last_left: None,
            last_right: None,
        }
    }

    fn slot_mut(&mut self, chirality: Chirality) -> &mut Option<Vec3> {
        match chirality {
            Chirality::Left => &mut self.last_left,
            Chirality::Right => &mut self.last_right,
        }
    }

    /// Records `position` as the latest sample for `chirality` and returns the
    /// speed relative to the previous sample of the same hand. The first
    /// sample of a hand always has speed 0.
    pub fn observe(&mut self, chirality: Chirality, position: Vec3) -> MotionSample {
        let slot = self.slot_mut(chirality);
        let speed = slot.map_or(0.0, |last| position.distance(last));
        *slot = Some(position);

        MotionSample {
            chirality,
            speed,
            intensity: map_speed_to_intensity(speed, self.min_speed, self.max_speed),
        }
    }

    pub fn last_position(&self, chirality: Chirality) -> Option<Vec3> {
        match chirality {
            Chirality::Left => self.last_left,
            Chirality::Right => self.last_right,
        }
    }

    /// Forgets both hands; the next sample of each reports speed 0.
    pub fn reset(&mut self) {
        self.last_left = None;
        self.last_right = None;
    }
}
