//! Forward kinematics: resolve every joint's world transform for one frame.
//!
//! A joint's local transform is its rest offset plus any animated translation, rotated by the
//! product of its rotation channels in the order they are declared (see
//! `utils::rotation_from_channels`). World transforms are composed parent-first down the
//! pre-order, so each joint is resolved in one pass with no caching between frames.

use crate::animation::Animation;
use crate::error::{BvhError, Result};
use crate::skeleton::Skeleton;
use crate::types::*;
use crate::utils;
use cgmath::{Decomposed, One};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an out-of-range frame index is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Fail with [`BvhError::Range`].
    #[default]
    Strict,
    /// Snap to the last frame.
    Clamp,
    /// Loop back to the start, as a looping player would.
    Wrap,
}

impl RangePolicy {
    /// Map a requested index onto a valid one. Every policy fails on an empty animation.
    pub fn apply(&self, index: usize, frame_count: usize) -> Result<usize> {
        if frame_count == 0 {
            return Err(BvhError::Range { index, frame_count });
        }
        match self {
            RangePolicy::Strict if index >= frame_count => Err(BvhError::Range { index, frame_count }),
            RangePolicy::Strict => Ok(index),
            RangePolicy::Clamp => Ok(index.min(frame_count - 1)),
            RangePolicy::Wrap => Ok(index % frame_count),
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub position: Position,
    pub rotation: Quaternion,
}

impl JointTransform {
    pub fn identity() -> Self {
        JointTransform {
            position: Position::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
        }
    }

    /// Rotation as X, Y, Z euler angles in degrees.
    pub fn rotation_degrees(&self) -> [f64; 3] {
        utils::quat_to_euler_degrees(self.rotation)
    }

    fn to_decomposed(self) -> Decomposed<Position, Quaternion> {
        Decomposed {
            scale: 1.0,
            rot: self.rotation,
            disp: self.position,
        }
    }

    fn from_decomposed(transform: Decomposed<Position, Quaternion>) -> Self {
        JointTransform {
            position: transform.disp,
            rotation: transform.rot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointPose {
    pub name: String,
    pub index: Index,
    pub parent_index: Option<Index>,
    /// Relative to the parent joint.
    pub local: JointTransform,
    pub world: JointTransform,
}

/// Every joint of a skeleton resolved at one instant, in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub frame: Option<usize>,
    joints: Vec<JointPose>,
}

impl Pose {
    pub fn joints(&self) -> &[JointPose] {
        &self.joints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointPose> {
        self.joints.iter()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&JointPose> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    pub fn world(&self, name: &str) -> Option<&JointTransform> {
        self.get(name).map(|joint| &joint.world)
    }

    /// Joint name → world transform.
    pub fn to_map(&self) -> HashMap<String, JointTransform> {
        self.joints
            .iter()
            .map(|joint| (joint.name.clone(), joint.world))
            .collect()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Forward kinematics over one frame's channel values (`None` = rest pose).
fn __compose(skeleton: &Skeleton, values: Option<&[f64]>, frame: Option<usize>) -> Pose {
    let mut joints: Vec<JointPose> = Vec::with_capacity(skeleton.len());
    let mut channel_offset = 0;

    for joint in skeleton.iter() {
        let count = joint.channels.len();
        let local = match values {
            Some(values) => {
                let values = &values[channel_offset..channel_offset + count];
                JointTransform {
                    position: joint.offset + utils::translation_from_channels(&joint.channels, values),
                    rotation: utils::rotation_from_channels(&joint.channels, values),
                }
            }
            None => JointTransform {
                position: joint.offset,
                rotation: Quaternion::one(),
            },
        };
        channel_offset += count;

        //// parents precede children in pre-order, so the parent is already resolved
        let world = match joint.parent_index {
            Some(parent) => {
                let parent_world = joints[parent].world.to_decomposed();
                JointTransform::from_decomposed(parent_world * local.to_decomposed())
            }
            None => local,
        };

        joints.push(JointPose {
            name: joint.name.clone(),
            index: joint.index,
            parent_index: joint.parent_index,
            local,
            world,
        });
    }

    Pose { frame, joints }
}

/// Resolve `frame_index`, failing with [`BvhError::Range`] when it is out of bounds.
pub fn resolve(animation: &Animation, frame_index: usize) -> Result<Pose> {
    resolve_with(animation, frame_index, RangePolicy::Strict)
}

pub fn resolve_with(animation: &Animation, frame_index: usize, policy: RangePolicy) -> Result<Pose> {
    let frame = policy.apply(frame_index, animation.frame_count())?;
    let values = &animation.frames()[frame];
    Ok(__compose(animation.skeleton(), Some(values), Some(frame)))
}

/// Frame shown at `seconds` into playback.
pub fn frame_at_time(animation: &Animation, seconds: f64, policy: RangePolicy) -> Result<usize> {
    let frame_count = animation.frame_count();
    if !seconds.is_finite() {
        return Err(BvhError::InvalidTime(seconds));
    }
    let real_frame = seconds / animation.frame_time();
    match policy {
        RangePolicy::Wrap if frame_count > 0 => {
            let frame = real_frame.rem_euclid(frame_count as f64).floor() as usize;
            // rem_euclid can round up to frame_count itself
            Ok(frame.min(frame_count - 1))
        }
        RangePolicy::Clamp => policy.apply(real_frame.max(0.0).floor() as usize, frame_count),
        _ if real_frame < 0.0 => Err(BvhError::InvalidTime(seconds)),
        _ => policy.apply(real_frame.floor() as usize, frame_count),
    }
}

pub fn resolve_at_time(animation: &Animation, seconds: f64, policy: RangePolicy) -> Result<Pose> {
    let frame = frame_at_time(animation, seconds, policy)?;
    resolve_with(animation, frame, RangePolicy::Strict)
}

/// The skeleton with every channel at zero.
pub fn rest_pose(skeleton: &Skeleton) -> Pose {
    __compose(skeleton, None, None)
}
