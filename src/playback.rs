//! JSON payloads handed to a renderer: static skeleton metadata once, then one snapshot per
//! requested frame.

use crate::animation::Animation;
use crate::error::Result;
use crate::query::{self, Pose, RangePolicy};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSummary {
    /// Pre-order.
    pub joint_names: Vec<String>,
    /// `[parent, child]` pairs, one per bone.
    pub bone_connections: Vec<[String; 2]>,
    pub joint_offsets: BTreeMap<String, [f64; 3]>,
    pub total_frames: usize,
    pub frame_rate: f64,
    pub frame_time: f64,
    pub duration: f64,
}

impl MotionSummary {
    pub fn from_animation(animation: &Animation) -> Self {
        let skeleton = animation.skeleton();
        MotionSummary {
            joint_names: skeleton.iter().map(|joint| joint.name.clone()).collect(),
            bone_connections: skeleton
                .bone_connections()
                .into_iter()
                .map(|(parent, child)| [parent.to_string(), child.to_string()])
                .collect(),
            joint_offsets: skeleton
                .iter()
                .map(|joint| {
                    (
                        joint.name.clone(),
                        [joint.offset.x, joint.offset.y, joint.offset.z],
                    )
                })
                .collect(),
            total_frames: animation.frame_count(),
            frame_rate: animation.frame_rate(),
            frame_time: animation.frame_time(),
            duration: animation.duration(),
        }
    }
}

/// World transform of one joint: position, XYZ euler degrees and the quaternion `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub quaternion: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub frame: usize,
    pub time: f64,
    pub joints: BTreeMap<String, JointSample>,
}

impl FrameSnapshot {
    pub fn from_pose(pose: &Pose, frame_time: f64) -> Self {
        let frame = pose.frame.unwrap_or(0);
        let joints = pose
            .iter()
            .map(|joint| {
                let world = &joint.world;
                let [rx, ry, rz] = world.rotation_degrees();
                let sample = JointSample {
                    x: world.position.x,
                    y: world.position.y,
                    z: world.position.z,
                    rx,
                    ry,
                    rz,
                    quaternion: [
                        world.rotation.v.x,
                        world.rotation.v.y,
                        world.rotation.v.z,
                        world.rotation.s,
                    ],
                };
                (joint.name.clone(), sample)
            })
            .collect();
        FrameSnapshot {
            frame,
            time: frame as f64 * frame_time,
            joints,
        }
    }
}

/// Resolve `frame_index` under `policy` and package it for the renderer.
pub fn snapshot(animation: &Animation, frame_index: usize, policy: RangePolicy) -> Result<FrameSnapshot> {
    let pose = query::resolve_with(animation, frame_index, policy)?;
    Ok(FrameSnapshot::from_pose(&pose, animation.frame_time()))
}

pub fn to_json<T: Serialize>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}
