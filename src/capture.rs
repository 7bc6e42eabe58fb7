//! Turning raw capture tables into an [`Animation`].
//!
//! A capture export is a pair of numeric tables (joint centres and joint rotations) with one
//! row per frame. Each row holds a fixed-size block of fields per capture joint:
//!
//! ```text
//! X Y Z Length vX vY vZ vAbs aX aY aZ aAbs | X Y Z Length ... | ...
//! ```
//!
//! Only the leading X, Y, Z of each block drive the skeleton; velocities and accelerations are
//! ignored. Capture joint `i` feeds skeleton joint `i` (pre-order).

use crate::animation::Animation;
use crate::config::Config;
use crate::error::{BvhError, Result};
use crate::normalize::radians_to_degrees;
use crate::skeleton::Skeleton;
use crate::types::*;
use crate::utils;
use std::path::Path;

/// Numeric rows of one capture export, in frame order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptureTable {
    rows: Vec<Vec<f64>>,
}

fn __parse_row(line: &str) -> Option<Vec<f64>> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok())
        .collect()
}

impl CaptureTable {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        CaptureTable { rows }
    }

    /// Parse whitespace- or comma-separated text. Rows that are not entirely numeric (column
    /// headers, stray notes) are skipped.
    pub fn parse(text: &str) -> Self {
        let mut rows = Vec::new();
        let mut seen_data = false;
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match __parse_row(line) {
                Some(row) => {
                    seen_data = true;
                    rows.push(row);
                }
                None if !seen_data => tracing::debug!("Skipping header line {}", number + 1),
                None => tracing::warn!("Skipping non-numeric capture line {}", number + 1),
            }
        }
        CaptureTable { rows }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::parse(&std::fs::read_to_string(path)?);
        tracing::info!("Loaded {} capture rows from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, frame: usize) -> Option<&[f64]> {
        self.rows.get(frame).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fixed per-joint column schema of a capture row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLayout {
    fields_per_joint: usize,
}

impl CaptureLayout {
    /// Each block must at least hold X, Y, Z.
    pub fn new(fields_per_joint: usize) -> Result<Self> {
        if fields_per_joint < 3 {
            return Err(BvhError::Config(format!(
                "fields_per_joint must be at least 3 (X, Y, Z), got {}",
                fields_per_joint
            )));
        }
        Ok(CaptureLayout { fields_per_joint })
    }

    pub fn fields_per_joint(&self) -> usize {
        self.fields_per_joint
    }

    /// Number of complete joint blocks in `row`.
    pub fn joint_count(&self, row: &[f64]) -> usize {
        row.len() / self.fields_per_joint
    }

    /// The X, Y, Z fields of capture joint `joint`, if the row is long enough to hold them.
    pub fn triple(&self, row: &[f64], joint: usize) -> Option<[f64; 3]> {
        let start = joint * self.fields_per_joint;
        match row.get(start..start + 3)? {
            &[x, y, z] => Some([x, y, z]),
            _ => None,
        }
    }
}

/// Build an animation for `skeleton` from capture centres and rotations.
///
/// The root's position channels take capture joint 0's centre, mapped into display space.
/// Every joint's rotation channels take the rotation of the capture joint with the same index,
/// in degrees, packed in that joint's own channel order. Missing data becomes zero. Position
/// channels below the root are left at zero: world-space centres carry no local translation.
pub fn assemble_animation(
    skeleton: Skeleton,
    centers: &CaptureTable,
    rotations: &CaptureTable,
    config: &Config,
) -> Result<Animation> {
    config.validate()?;
    if centers.len() != rotations.len() {
        tracing::warn!(
            "Frame count mismatch between centres ({}) and rotations ({}); using the shorter",
            centers.len(),
            rotations.len()
        );
    }
    let frame_count = centers.len().min(rotations.len());
    let layout = CaptureLayout::new(config.fields_per_joint)?;
    let mapping = config.coordinates;

    let mut frames: Vec<Frame> = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let centers_row = centers.row(frame).unwrap_or(&[]);
        let rotations_row = rotations.row(frame).unwrap_or(&[]);

        let mut values = Frame::with_capacity(skeleton.total_channels());
        for joint in skeleton.iter() {
            let position = if joint.is_root() {
                layout
                    .triple(centers_row, 0)
                    .map(|[x, y, z]| {
                        let mapped = mapping.map_point(x, y, z);
                        [mapped.x, mapped.y, mapped.z]
                    })
                    .unwrap_or([0.0; 3])
            } else {
                [0.0; 3]
            };
            let rotation = layout
                .triple(rotations_row, joint.index)
                .map(|[x, y, z]| {
                    let mapped = mapping.map_rotation(x, y, z);
                    if config.rotations_in_radians {
                        radians_to_degrees(mapped)
                    } else {
                        mapped
                    }
                })
                .unwrap_or([0.0; 3]);
            values.extend(utils::pack_channels(&joint.channels, position, rotation));
        }
        frames.push(values);
    }

    let rotation_joints = rotations
        .row(0)
        .map_or(0, |row| layout.joint_count(row));
    if frame_count > 0 && rotation_joints < skeleton.len() {
        tracing::warn!(
            "Rotation table covers {} of {} joints; the rest stay at rest",
            rotation_joints,
            skeleton.len()
        );
    }
    tracing::info!(
        "Assembled {} frames for {} joints",
        frames.len(),
        skeleton.len()
    );
    Animation::new(skeleton, frames, config.frame_time)
}
