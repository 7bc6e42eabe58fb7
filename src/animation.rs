use crate::error::{BvhError, Result};
use crate::skeleton::Skeleton;
use crate::types::*;

/// A decoded (or assembled) animation: a skeleton plus its frames, in time order.
///
/// Every frame is exactly [`Skeleton::total_channels`] values wide; the constructor refuses
/// anything else, so downstream code can slice frames without re-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    skeleton: Skeleton,
    frames: Vec<Frame>,
    frame_time: f64,
}

impl Animation {
    pub fn new(skeleton: Skeleton, frames: Vec<Frame>, frame_time: f64) -> Result<Animation> {
        if frame_time.is_nan() || frame_time <= 0.0 {
            return Err(BvhError::Config(format!(
                "frame time must be positive, got {}",
                frame_time
            )));
        }
        let expected = skeleton.total_channels();
        if let Some((frame, values)) = frames
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(BvhError::ChannelMismatch {
                frame,
                expected,
                actual: values.len(),
            });
        }
        Ok(Animation {
            skeleton,
            frames,
            frame_time,
        })
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds per frame.
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn frame_rate(&self) -> f64 {
        1.0 / self.frame_time
    }

    /// Total length in seconds; zero for an animation without frames.
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 * self.frame_time
    }

    /// The values of `joint`'s channels at `frame`, in the joint's channel order.
    pub fn joint_values(&self, frame: usize, joint: Index) -> Option<&[f64]> {
        let values = self.frames.get(frame)?;
        let target = self.skeleton.joint(joint)?;
        let start: usize = self.skeleton.joints()[..joint]
            .iter()
            .map(|joint| joint.channels.len())
            .sum();
        values.get(start..start + target.channels.len())
    }

    pub fn into_parts(self) -> (Skeleton, Vec<Frame>, f64) {
        (self.skeleton, self.frames, self.frame_time)
    }
}
