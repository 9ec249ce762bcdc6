// src/scene/effects.rs
//! Fans the smoothed intensity out to the environment shader and the particle emitter.

use super::entity::EffectEntity;
use super::material::ParameterValue;
use super::particles::ColorGradient;
use super::store::MeshStore;
use crate::config::Calibration;
use log::trace;

/// Writes intensity-derived parameters into scene entities.
///
/// Both writes are idempotent for a given intensity and cheap enough to run
/// on every hand update.
#[derive(Debug, Clone)]
pub struct EffectPropagator {
    parameter: String,
    headroom: f32,
    rate_ceiling: f32,
    threshold: f32,
    dead_band: f32,
    charged: bool,
}

impl EffectPropagator {
    pub fn new(cal: &Calibration) -> Self {
        Self {
            parameter: cal.intensity_parameter.clone(),
            headroom: cal.intensity_headroom,
            rate_ceiling: cal.particle_rate_ceiling,
            threshold: cal.charged_threshold,
            dead_band: cal.gradient_dead_band,
            charged: false,
        }
    }

    /// Whether the emitter currently shows the charged gradient.
    pub fn is_charged(&self) -> bool {
        self.charged
    }

    /// Applies `intensity` to every shader-bound mesh and to the effect entity.
    ///
    /// Returns the number of meshes whose shader parameter was updated.
    pub fn apply(&mut self, intensity: f32, meshes: &mut MeshStore, effect: Option<&mut EffectEntity>) -> usize {
        let updated = self.apply_to_meshes(intensity, meshes);
        if let Some(effect) = effect {
            self.apply_to_emitter(intensity, effect);
        }
        trace!(
            "intensity={:.3} shader_meshes={} charged={}",
            intensity, updated, self.charged
        );
        updated
    }

    fn apply_to_meshes(&self, intensity: f32, meshes: &mut MeshStore) -> usize {
        let value = ParameterValue::Float(intensity * self.headroom);
        let mut updated = 0;
        for material in meshes.iter_mut().filter_map(|e| e.material.as_shader_mut()) {
            // A rejected write leaves the previous value in place.
            match material.set_parameter(&self.parameter, value) {
                Ok(()) => updated += 1,
                Err(e) => trace!("Keeping stale {}: {e}", self.parameter),
            }
        }
        updated
    }

    fn apply_to_emitter(&mut self, intensity: f32, effect: &mut EffectEntity) {
        self.charged = if intensity > self.threshold + self.dead_band {
            true
        } else if intensity <= self.threshold - self.dead_band {
            false
        } else {
            self.charged
        };

        let emitter = &mut effect.particles;
        emitter.birth_rate = intensity * self.rate_ceiling;
        emitter.color = if self.charged {
            ColorGradient::CHARGED
        } else {
            ColorGradient::RESTING
        };
    }
}
