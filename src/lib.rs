//! bvh_mocap
//!
//! Converts tabular motion-capture exports into `.bvh` animations, reads `.bvh` files back, and
//! resolves world-space joint transforms frame by frame for a renderer.

pub mod animation;
pub mod capture;
pub mod config;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod playback;
pub mod query;
pub mod skeleton;
pub mod types;
pub mod utils;
pub mod write;

pub use animation::Animation;
pub use capture::{assemble_animation, CaptureLayout, CaptureTable};
pub use config::Config;
pub use error::{BvhError, Result};
pub use normalize::{normalize, CoordinateMapping};
pub use parse::{load_bvh_from_file, load_bvh_from_string, ParseOptions, ShortRowPolicy};
pub use playback::{FrameSnapshot, MotionSummary};
pub use query::{resolve, resolve_with, JointTransform, Pose, RangePolicy};
pub use skeleton::{baseball_skeleton, Skeleton, SkeletonBuilder};
pub use write::{save_bvh_to_file, to_bvh_string, write_bvh};
