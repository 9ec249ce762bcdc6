// src/session/synthetic.rs
//! Deterministic sensor providers for demos and soak runs.
//!
//! `ScriptedAnchors` reports a floor and a wall plane and then keeps
//! re-posing them. `ScriptedHands` waves the right hand in alternating calm
//! and fast phases while the left hand idles.

use super::provider::{SensorProvider, UpdateStream};
use super::SessionError;
use crate::anchor::{AnchorEvent, AnchorId, AnchorUpdate, Chirality, HandAnchor, MeshAnchor};
use glam::{Mat4, Quat, Vec3};
use meshbuf::{DecodeError, IndexWidth, RawGeometry};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

/// Vertex stride the scripted planes are encoded with (position plus padding).
const PLANE_STRIDE: usize = 16;

/// Builds an `n × n` quad grid of side `size` in the anchor's XZ plane.
pub fn plane_grid(n: u32, size: f32, stride: usize, width: IndexWidth) -> Result<RawGeometry, DecodeError> {
    let n = n.max(1);
    let step = size / n as f32;
    let half = size * 0.5;

    let mut positions = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for row in 0..=n {
        for col in 0..=n {
            positions.push([col as f32 * step - half, 0.0, row as f32 * step - half]);
        }
    }

    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for row in 0..n {
        for col in 0..n {
            let i = row * (n + 1) + col;
            let below = i + n + 1;
            indices.extend_from_slice(&[i, below, i + 1, i + 1, below, below + 1]);
        }
    }

    RawGeometry::from_parts(&positions, stride, &indices, width)
}

struct ScriptedPlane {
    id: AnchorId,
    base: Mat4,
    geometry: RawGeometry,
}

/// A floor at the origin and a wall two meters ahead.
pub struct ScriptedAnchors {
    period: Duration,
    planes: Option<Vec<ScriptedPlane>>,
}

impl ScriptedAnchors {
    pub fn new(period: Duration) -> Result<Self, DecodeError> {
        let floor = ScriptedPlane {
            id: AnchorId::new_v4(),
            base: Mat4::IDENTITY,
            geometry: plane_grid(8, 4.0, PLANE_STRIDE, IndexWidth::U16)?,
        };
        // Stand the grid up so its normal faces the viewer.
        let wall = ScriptedPlane {
            id: AnchorId::new_v4(),
            base: Mat4::from_rotation_translation(
                Quat::from_rotation_x(FRAC_PI_2),
                Vec3::new(0.0, 1.5, -2.0),
            ),
            geometry: plane_grid(6, 3.0, PLANE_STRIDE, IndexWidth::U32)?,
        };
        Ok(Self {
            period,
            planes: Some(vec![floor, wall]),
        })
    }
}

impl SensorProvider for ScriptedAnchors {
    type Update = AnchorUpdate;

    fn name(&self) -> &'static str {
        "scripted-anchors"
    }

    fn start(&mut self) -> Result<UpdateStream<AnchorUpdate>, SessionError> {
        let planes = self.planes.take().ok_or(SessionError::AlreadyStarted("scripted-anchors"))?;
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick = 0usize;
        let stream = IntervalStream::new(ticker).map(move |_| {
            let plane = &planes[tick % planes.len()];
            let event = if tick < planes.len() {
                AnchorEvent::Added
            } else {
                AnchorEvent::Updated
            };
            // Millimetre drift, like a tracker refining its estimate.
            let phase = tick as f32 * 0.37;
            let drift = Vec3::new(phase.sin(), 0.0, phase.cos()) * 0.002;
            tick += 1;

            AnchorUpdate {
                event,
                anchor: MeshAnchor {
                    id: plane.id,
                    origin_from_anchor: Mat4::from_translation(drift) * plane.base,
                    geometry: plane.geometry.clone(),
                },
            }
        });
        Ok(Box::pin(stream))
    }
}

/// Motion phases of the scripted right hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveScript {
    /// Updates spent barely moving.
    pub calm_ticks: u32,
    /// Updates spent waving.
    pub fast_ticks: u32,
    pub calm_amplitude: f32,
    pub fast_amplitude: f32,
    /// Wave frequency in cycles per update.
    pub frequency: f32,
}

impl Default for WaveScript {
    fn default() -> Self {
        Self {
            calm_ticks: 90,
            fast_ticks: 60,
            calm_amplitude: 0.01,
            fast_amplitude: 0.3,
            frequency: 0.12,
        }
    }
}

impl WaveScript {
    /// Right wrist offset along X at update `tick`.
    pub fn offset(&self, tick: u32) -> f32 {
        let cycle = (self.calm_ticks + self.fast_ticks).max(1);
        let amplitude = if tick % cycle < self.calm_ticks {
            self.calm_amplitude
        } else {
            self.fast_amplitude
        };
        amplitude * (tick as f32 * self.frequency * TAU).sin()
    }
}

pub struct ScriptedHands {
    period: Duration,
    script: WaveScript,
    started: bool,
}

impl ScriptedHands {
    pub fn new(period: Duration, script: WaveScript) -> Self {
        Self {
            period,
            script,
            started: false,
        }
    }
}

impl SensorProvider for ScriptedHands {
    type Update = HandAnchor;

    fn name(&self) -> &'static str {
        "scripted-hands"
    }

    fn start(&mut self) -> Result<UpdateStream<HandAnchor>, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted("scripted-hands"));
        }
        self.started = true;

        let script = self.script;
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick = 0u32;
        let stream = IntervalStream::new(ticker).map(move |_| {
            let t = tick;
            tick = tick.wrapping_add(1);
            if t % 2 == 0 {
                HandAnchor::at_wrist(Chirality::Left, Vec3::new(-0.25, 1.1, -0.4))
            } else {
                let x = 0.25 + script.offset(t / 2);
                HandAnchor::at_wrist(Chirality::Right, Vec3::new(x, 1.2, -0.4))
            }
        });
        Ok(Box::pin(stream))
    }
}
