// src/motion/smoother.rs
//! Asymmetric exponential smoothing of the intensity signal.

/// Linear interpolation helper.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One process-wide intensity value, moved toward each new target with a
/// fast step while rising and a slow step while falling.
#[derive(Debug, Clone)]
pub struct IntensitySmoother {
    current: f32,
    attack: f32,
    decay: f32,
}

impl IntensitySmoother {
    pub fn new(attack: f32, decay: f32) -> Self {
        Self {
            current: 0.0,
            attack,
            decay,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Steps toward `target` and returns the new value.
    ///
    /// The update is a convex combination of two values in [0, 1], so the
    /// result stays in [0, 1] as long as the factors are in (0, 1]. A NaN
    /// target leaves the value unchanged.
    pub fn update(&mut self, target: f32) -> f32 {
        if target.is_nan() {
            return self.current;
        }
        let target = target.clamp(0.0, 1.0);
        let factor = if target > self.current { self.attack } else { self.decay };
        self.current = lerp(self.current, target, factor);
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(IntensitySmoother::new(0.3, 0.05).current(), 0.0);
    }

    #[test]
    fn test_attack_step() {
        let mut s = IntensitySmoother::new(0.3, 0.05);
        assert!((s.update(1.0) - 0.3).abs() < 1e-6);
        // 0.3 + 0.7 * 0.3
        assert!((s.update(1.0) - 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_attack_then_decay_monotonic() {
        let mut s = IntensitySmoother::new(0.3, 0.05);

        let mut prev = s.current();
        for _ in 0..50 {
            let expected = prev + (1.0 - prev) * 0.3;
            let v = s.update(1.0);
            assert!((v - expected).abs() < 1e-6);
            assert!(v >= prev && v <= 1.0);
            prev = v;
        }
        assert!(prev > 0.999);

        for _ in 0..200 {
            let expected = prev + (0.0 - prev) * 0.05;
            let v = s.update(0.0);
            assert!((v - expected).abs() < 1e-6);
            assert!(v <= prev && v >= 0.0);
            prev = v;
        }
        assert!(prev < 0.001);
    }

    #[test]
    fn test_equal_target_uses_decay() {
        let mut s = IntensitySmoother::new(0.3, 0.05);
        s.update(1.0);
        let before = s.current();
        // target == current is treated as decay and leaves the value unchanged
        assert_eq!(s.update(before), before);
    }

    #[test]
    fn test_out_of_range_targets_are_clamped() {
        let mut s = IntensitySmoother::new(1.0, 1.0);
        assert_eq!(s.update(7.0), 1.0);
        assert_eq!(s.update(-3.0), 0.0);
    }

    #[test]
    fn test_nan_target_is_skipped() {
        let mut s = IntensitySmoother::new(0.3, 0.05);
        s.update(1.0);
        assert!((s.update(f32::NAN) - 0.3).abs() < 1e-6);
        assert!((s.update(1.0) - 0.51).abs() < 1e-6);
        assert!(s.update(f32::INFINITY).is_finite());
    }

    #[test]
    fn test_stays_in_unit_range() {
        let mut s = IntensitySmoother::new(0.3, 0.05);
        for i in 0..500 {
            let target = ((i * 37) % 11) as f32 / 10.0;
            let v = s.update(target);
            assert!((0.0..=1.0).contains(&v), "left range: {v}");
        }
    }

    #[test]
    fn test_reset() {
        let mut s = IntensitySmoother::new(0.3, 0.05);
        s.update(1.0);
        s.reset();
        assert_eq!(s.current(), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(2.0, 2.0, 0.9), 2.0);
    }
}
