// src/anchor/hand.rs
//! Hand anchors and the skeleton joints the pipeline reads from them.

use glam::{Mat4, Vec3};
use std::collections::HashMap;

// ── Chirality ──────────────────────────────────────────────

/// Which hand an anchor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    Left,
    Right,
}

impl Chirality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ── Joints ─────────────────────────────────────────────────

/// Skeleton joints exposed by the hand provider.
///
/// Only the wrist drives the effect; fingertips are carried so providers can
/// forward full skeletons without dropping data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ForearmWrist,
    ThumbTip,
    IndexFingerTip,
    MiddleFingerTip,
    RingFingerTip,
    LittleFingerTip,
}

impl HandJoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ForearmWrist => "forearm-wrist",
            Self::ThumbTip => "thumb-tip",
            Self::IndexFingerTip => "index-finger-tip",
            Self::MiddleFingerTip => "middle-finger-tip",
            Self::RingFingerTip => "ring-finger-tip",
            Self::LittleFingerTip => "little-finger-tip",
        }
    }
}

/// Pose of one joint relative to its hand anchor.
#[derive(Debug, Clone, Copy)]
pub struct JointPose {
    pub anchor_from_joint: Mat4,
    /// Whether the provider currently has tracking data for this joint.
    pub tracked: bool,
}

impl JointPose {
    pub fn tracked(anchor_from_joint: Mat4) -> Self {
        Self { anchor_from_joint, tracked: true }
    }
}

// ── Skeleton ───────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct HandSkeleton {
    joints: HashMap<HandJoint, JointPose>,
}

impl HandSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_joint(mut self, joint: HandJoint, pose: JointPose) -> Self {
        self.joints.insert(joint, pose);
        self
    }

    pub fn set_joint(&mut self, joint: HandJoint, pose: JointPose) {
        self.joints.insert(joint, pose);
    }

    pub fn joint(&self, joint: HandJoint) -> Option<&JointPose> {
        self.joints.get(&joint)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

// ── Anchor ─────────────────────────────────────────────────

/// One item of the hand-anchor stream.
#[derive(Debug, Clone)]
pub struct HandAnchor {
    pub chirality: Chirality,
    /// World-from-anchor transform.
    pub origin_from_anchor: Mat4,
    /// Absent while the provider has no skeleton for this hand.
    pub skeleton: Option<HandSkeleton>,
}

impl HandAnchor {
    /// World-space wrist position, or `None` when no tracked wrist is available
    /// or the composed pose is not finite.
    pub fn wrist_position(&self) -> Option<Vec3> {
        let wrist = self.skeleton.as_ref()?.joint(HandJoint::Wrist)?;
        if !wrist.tracked {
            return None;
        }
        let world_from_joint = self.origin_from_anchor * wrist.anchor_from_joint;
        let position = world_from_joint.w_axis.truncate();
        position.is_finite().then_some(position)
    }

    /// Convenience constructor for a hand whose wrist sits at `position` in world space.
    pub fn at_wrist(chirality: Chirality, position: Vec3) -> Self {
        let skeleton = HandSkeleton::new()
            .with_joint(HandJoint::Wrist, JointPose::tracked(Mat4::IDENTITY));
        Self {
            chirality,
            origin_from_anchor: Mat4::from_translation(position),
            skeleton: Some(skeleton),
        }
    }
}
