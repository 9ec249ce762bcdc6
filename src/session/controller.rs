// src/session/controller.rs
//! The single consumer of the merged sensor channel.

use super::SensorEvent;
use crate::anchor::{AnchorEvent, AnchorUpdate, HandAnchor};
use crate::config::Calibration;
use crate::motion::{IntensitySmoother, MotionEstimator};
use crate::scene::{
    EffectEntity, EffectPropagator, MeshStore, ParticleEmitter, SceneRoot, SharedMaterial, Upsert,
};
use glam::Vec3;
use log::{debug, info, trace};
use tokio::sync::mpsc;

/// Where the particle effect sits when the host does not place it.
pub const DEFAULT_EFFECT_POSITION: Vec3 = Vec3::new(0.0, 1.5, -1.5);

/// Counters for the session summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStats {
    pub meshes_created: u64,
    pub meshes_moved: u64,
    pub meshes_skipped: u64,
    pub removals_ignored: u64,
    pub hand_updates: u64,
    pub hand_updates_ignored: u64,
}

/// Owns all mutable session state and applies sensor events to it in order.
pub struct Controller {
    estimator: MotionEstimator,
    smoother: IntensitySmoother,
    store: MeshStore,
    root: SceneRoot,
    effect: Option<EffectEntity>,
    material: SharedMaterial,
    propagator: EffectPropagator,
    stats: ControllerStats,
}

impl Controller {
    /// Builds a controller with the effect entity at [`DEFAULT_EFFECT_POSITION`].
    ///
    /// `material` must already be resolved; entities pick their material from
    /// it at creation time.
    pub fn new(cal: &Calibration, material: SharedMaterial) -> Self {
        Self {
            estimator: MotionEstimator::new(cal.min_speed, cal.max_speed),
            smoother: IntensitySmoother::new(cal.attack, cal.decay),
            store: MeshStore::new(cal.uv_scale, cal.environment_opacity),
            root: SceneRoot::new(),
            effect: Some(EffectEntity::new(DEFAULT_EFFECT_POSITION, ParticleEmitter::default())),
            material,
            propagator: EffectPropagator::new(cal),
            stats: ControllerStats::default(),
        }
    }

    /// Replaces the effect entity. `None` runs without particles.
    pub fn with_effect(mut self, effect: Option<EffectEntity>) -> Self {
        self.effect = effect;
        self
    }

    pub fn handle(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Mesh(update) => {
                self.handle_mesh(&update);
            }
            SensorEvent::Hand(hand) => {
                self.handle_hand(&hand);
            }
        }
    }

    /// Applies one mesh anchor update. Returns `None` for removals.
    pub fn handle_mesh(&mut self, update: &AnchorUpdate) -> Option<Upsert> {
        if update.event == AnchorEvent::Removed {
            // Entities are never evicted.
            debug!("Ignoring removal of anchor {}", update.anchor.id);
            self.stats.removals_ignored += 1;
            return None;
        }

        let outcome = self.store.upsert(&update.anchor, &self.material, &mut self.root);
        match outcome {
            Upsert::Created(_) => self.stats.meshes_created += 1,
            Upsert::Moved(_) => self.stats.meshes_moved += 1,
            Upsert::Skipped => self.stats.meshes_skipped += 1,
        }
        Some(outcome)
    }

    /// Applies one hand update and returns the new smoothed intensity.
    ///
    /// Updates without a tracked, finite wrist are ignored and leave every
    /// piece of state untouched.
    pub fn handle_hand(&mut self, hand: &HandAnchor) -> Option<f32> {
        let Some(wrist) = hand.wrist_position() else {
            trace!("{} hand update without a usable wrist", hand.chirality.as_str());
            self.stats.hand_updates_ignored += 1;
            return None;
        };
        self.stats.hand_updates += 1;

        let sample = self.estimator.observe(hand.chirality, wrist);
        let intensity = self.smoother.update(sample.intensity);
        trace!(
            "{} wrist speed={:.4} target={:.3} smoothed={:.3}",
            hand.chirality.as_str(),
            sample.speed,
            sample.intensity,
            intensity
        );
        self.propagator.apply(intensity, &mut self.store, self.effect.as_mut());
        Some(intensity)
    }

    /// Drains `events` until every sender is gone.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<SensorEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!(
            "Sensor session ended: {} meshes ({} skipped), {} hand updates, intensity {:.3}",
            self.store.len(),
            self.stats.meshes_skipped,
            self.stats.hand_updates,
            self.intensity()
        );
    }

    pub fn intensity(&self) -> f32 {
        self.smoother.current()
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn root(&self) -> &SceneRoot {
        &self.root
    }

    pub fn effect(&self) -> Option<&EffectEntity> {
        self.effect.as_ref()
    }

    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn is_charged(&self) -> bool {
        self.propagator.is_charged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{AnchorId, Chirality, HandSkeleton, MeshAnchor};
    use crate::scene::{ColorGradient, ParameterValue, ShaderMaterial};
    use crate::session::{ChannelProvider, Session};
    use glam::Mat4;
    use meshbuf::{IndexWidth, RawGeometry};

    const EPS: f32 = 1e-5;

    fn controller() -> Controller {
        Controller::new(&Calibration::default(), SharedMaterial::Unavailable)
    }

    fn hand(chirality: Chirality, x: f32, y: f32, z: f32) -> HandAnchor {
        HandAnchor::at_wrist(chirality, Vec3::new(x, y, z))
    }

    fn mesh_update(event: AnchorEvent, id: AnchorId, at: Vec3) -> AnchorUpdate {
        AnchorUpdate {
            event,
            anchor: MeshAnchor {
                id,
                origin_from_anchor: Mat4::from_translation(at),
                geometry: RawGeometry::from_parts(
                    &[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
                    16,
                    &[0, 1, 2, 1, 3, 2],
                    IndexWidth::U32,
                )
                .unwrap(),
            },
        }
    }

    #[test]
    fn test_fast_hand_scenario() {
        let mut c = controller();

        assert_eq!(c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.0)), Some(0.0));
        let smoothed = c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.2)).unwrap();
        assert!((smoothed - 0.3).abs() < EPS);

        let fx = c.effect().unwrap();
        assert!((fx.particles.birth_rate - 22.5).abs() < 1e-4);
        assert_eq!(fx.particles.color, ColorGradient::RESTING);
    }

    #[test]
    fn test_sustained_motion_charges_the_effect() {
        let mut c = controller();
        let mut z = 0.0;
        c.handle_hand(&hand(Chirality::Left, 0.0, 1.0, z));

        let mut steps = 0;
        while !c.is_charged() {
            z += 0.2;
            c.handle_hand(&hand(Chirality::Left, 0.0, 1.0, z));
            steps += 1;
            assert!(steps < 20, "never charged");
        }
        // 1 - 0.7^n > 0.8 first holds at n = 5.
        assert_eq!(steps, 5);
        assert!(c.intensity() > 0.8);
        assert_eq!(c.effect().unwrap().particles.color, ColorGradient::CHARGED);
    }

    #[test]
    fn test_first_sample_per_hand_is_zero() {
        let mut c = controller();
        c.handle_hand(&hand(Chirality::Left, 0.0, 0.0, 0.0));
        c.handle_hand(&hand(Chirality::Left, 0.0, 0.0, 0.2));
        let before = c.intensity();

        // The right hand's first sample, far away, reports speed 0 and decays.
        let after = c.handle_hand(&hand(Chirality::Right, 5.0, 5.0, 5.0)).unwrap();
        assert!((after - before * 0.95).abs() < EPS);
    }

    #[test]
    fn test_missing_wrist_is_ignored() {
        let mut c = controller();
        c.handle_hand(&hand(Chirality::Left, 0.0, 0.0, 0.0));
        c.handle_hand(&hand(Chirality::Left, 0.0, 0.0, 0.2));
        let before = c.intensity();

        let no_skeleton = HandAnchor {
            chirality: Chirality::Left,
            origin_from_anchor: Mat4::IDENTITY,
            skeleton: None,
        };
        let empty_skeleton = HandAnchor {
            skeleton: Some(HandSkeleton::new()),
            ..no_skeleton.clone()
        };
        assert_eq!(c.handle_hand(&no_skeleton), None);
        assert_eq!(c.handle_hand(&empty_skeleton), None);
        assert_eq!(c.intensity(), before);
        assert_eq!(c.stats().hand_updates_ignored, 2);
    }

    #[test]
    fn test_non_finite_wrist_is_ignored() {
        let mut c = controller();
        c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.0));
        c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.2));
        assert!((c.intensity() - 0.3).abs() < EPS);

        assert_eq!(c.handle_hand(&hand(Chirality::Right, f32::NAN, 0.0, 0.0)), None);
        assert_eq!(c.handle_hand(&hand(Chirality::Right, f32::INFINITY, 0.0, 0.0)), None);
        assert!((c.intensity() - 0.3).abs() < EPS);
        assert_eq!(c.stats().hand_updates_ignored, 2);

        for i in 0..50 {
            let z = 0.2 + (i % 2) as f32 * 0.01;
            let v = c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, z)).unwrap();
            assert!((0.0..=1.0).contains(&v), "intensity left [0,1]: {v}");
        }
        let rate = c.effect().unwrap().particles.birth_rate;
        assert!(rate.is_finite() && (0.0..=75.0).contains(&rate));
    }

    #[test]
    fn test_mesh_updates_and_removals() {
        let mut c = controller();
        let id = AnchorId::new_v4();

        assert!(matches!(
            c.handle_mesh(&mesh_update(AnchorEvent::Added, id, Vec3::ZERO)),
            Some(Upsert::Created(_))
        ));
        assert!(matches!(
            c.handle_mesh(&mesh_update(AnchorEvent::Updated, id, Vec3::Y)),
            Some(Upsert::Moved(_))
        ));
        assert_eq!(c.handle_mesh(&mesh_update(AnchorEvent::Removed, id, Vec3::Y)), None);

        assert_eq!(c.store().len(), 1);
        assert_eq!(c.root().children().len(), 1);
        let stats = c.stats();
        assert_eq!((stats.meshes_created, stats.meshes_moved, stats.removals_ignored), (1, 1, 1));
    }

    #[test]
    fn test_intensity_reaches_shader_meshes() {
        let shader = ShaderMaterial::new("env").with_parameter("Intensity", ParameterValue::Float(0.0));
        let mut c = Controller::new(&Calibration::default(), SharedMaterial::Loaded(shader));
        let id = AnchorId::new_v4();
        c.handle_mesh(&mesh_update(AnchorEvent::Added, id, Vec3::ZERO));

        c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.0));
        c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.2));

        let value = c
            .store()
            .get(&id)
            .and_then(|e| e.material.as_shader())
            .and_then(|m| m.parameter("Intensity"))
            .and_then(|v| v.as_float())
            .unwrap();
        assert!((value - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_runs_without_effect_entity() {
        let mut c = controller().with_effect(None);
        c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.0));
        assert!(c.handle_hand(&hand(Chirality::Right, 0.0, 0.0, 0.2)).is_some());
        assert!(c.effect().is_none());
    }

    #[tokio::test]
    async fn test_run_drains_merged_session() {
        let (anchor_tx, mut anchors) = ChannelProvider::<AnchorUpdate>::new("anchors", 8);
        let (hand_tx, mut hands) = ChannelProvider::<HandAnchor>::new("hands", 8);
        let mut session = Session::start(&mut anchors, &mut hands).unwrap();

        let ids: Vec<AnchorId> = (0..3).map(|_| AnchorId::new_v4()).collect();
        for id in &ids {
            anchor_tx.send(mesh_update(AnchorEvent::Added, *id, Vec3::ZERO)).await.unwrap();
        }
        anchor_tx.send(mesh_update(AnchorEvent::Updated, ids[0], Vec3::X)).await.unwrap();
        hand_tx.send(hand(Chirality::Left, 0.0, 0.0, 0.0)).await.unwrap();
        hand_tx.send(hand(Chirality::Left, 0.0, 0.0, 0.2)).await.unwrap();
        drop(anchor_tx);
        drop(hand_tx);

        let mut c = controller();
        c.run(&mut session.events).await;

        assert_eq!(c.store().len(), 3);
        assert_eq!(c.root().children().len(), 3);
        assert_eq!(c.stats().hand_updates, 2);
        assert!((c.intensity() - 0.3).abs() < EPS);
        assert_eq!(c.store().get(&ids[0]).unwrap().transform.translation, Vec3::X);
    }
}
