// src/scene/particles.rs
//! Particle emitter configuration carried by the effect entity.

use super::types::Color;

/// Two-stop color ramp applied over each particle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorGradient {
    pub start: Color,
    pub end: Color,
}

impl ColorGradient {
    /// Gold to white: the default look of the effect.
    pub const RESTING: Self = Self { start: Color::GOLD, end: Color::WHITE };
    /// Yellow to cyan: shown while motion intensity is high.
    pub const CHARGED: Self = Self { start: Color::YELLOW, end: Color::CYAN };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterShape {
    Point,
    Box,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthLocation {
    Volume,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    Additive,
}

/// Handle to a texture produced outside this crate (e.g. the collectible icon).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    pub shape: EmitterShape,
    pub birth_location: BirthLocation,
    pub blend_mode: BlendMode,
    /// Particles per second.
    pub birth_rate: f32,
    /// Seconds each particle lives.
    pub life_span: f32,
    /// Initial particle speed (m/s).
    pub speed: f32,
    /// Particle size (m).
    pub size: f32,
    /// Emission cone half-angle in radians; π spreads in all directions.
    pub spreading_angle: f32,
    pub color: ColorGradient,
    pub image: Option<TextureHandle>,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self {
            shape: EmitterShape::Box,
            birth_location: BirthLocation::Surface,
            blend_mode: BlendMode::Alpha,
            // Nothing is emitted until motion is detected.
            birth_rate: 0.0,
            life_span: 2.5,
            speed: 0.8,
            size: 0.16,
            spreading_angle: std::f32::consts::PI,
            color: ColorGradient::RESTING,
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_emitter_is_idle() {
        let e = ParticleEmitter::default();
        assert_eq!(e.birth_rate, 0.0);
        assert_eq!(e.color, ColorGradient::RESTING);
        assert_eq!(e.shape, EmitterShape::Box);
        assert_eq!(e.birth_location, BirthLocation::Surface);
        assert!((e.spreading_angle - std::f32::consts::PI).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gradients_differ() {
        assert_ne!(ColorGradient::RESTING, ColorGradient::CHARGED);
        assert_eq!(ColorGradient::RESTING.start, Color::rgb(1.0, 0.8, 0.0));
    }
}
