//! Coordinate and unit normalisation from the capture frame into the display frame.
//!
//! The display frame is right-handed, Y-up, in centimetres. The capture system records metres
//! with X = left/right, Y = up/down, Z = forward/back, which already agrees with the display
//! axes, so the default table is the identity and only the unit scale changes.

use crate::types::{Axis, Position};
use serde::Deserialize;

/// Where one target axis takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AxisSource {
    pub axis: Axis,
    #[serde(default)]
    pub negate: bool,
}

impl AxisSource {
    pub const fn positive(axis: Axis) -> Self {
        AxisSource { axis, negate: false }
    }

    pub const fn negative(axis: Axis) -> Self {
        AxisSource { axis, negate: true }
    }

    fn pick(&self, x: f64, y: f64, z: f64) -> f64 {
        let value = match self.axis {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        };
        if self.negate {
            -value
        } else {
            value
        }
    }
}

/// Axis correspondence table plus a linear unit scale.
///
/// | target | source (default) |
/// |--------|------------------|
/// | X      | +X               |
/// | Y      | +Y               |
/// | Z      | +Z               |
///
/// Default scale: 100 (metres to centimetres).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinateMapping {
    pub axes: [AxisSource; 3],
    pub scale: f64,
}

impl CoordinateMapping {
    pub const METERS_TO_CENTIMETERS: f64 = 100.0;

    pub const MOCAP_TO_DISPLAY: CoordinateMapping = CoordinateMapping {
        axes: [
            AxisSource::positive(Axis::X),
            AxisSource::positive(Axis::Y),
            AxisSource::positive(Axis::Z),
        ],
        scale: Self::METERS_TO_CENTIMETERS,
    };

    /// Source data recorded Z-up: target Y takes source Z, target Z takes -Y.
    pub const Z_UP_TO_DISPLAY: CoordinateMapping = CoordinateMapping {
        axes: [
            AxisSource::positive(Axis::X),
            AxisSource::positive(Axis::Z),
            AxisSource::negative(Axis::Y),
        ],
        scale: Self::METERS_TO_CENTIMETERS,
    };

    pub fn with_scale(self, scale: f64) -> Self {
        CoordinateMapping { scale, ..self }
    }

    /// Map one capture-space point into display space. Non-finite values pass through unchanged.
    pub fn map_point(&self, x: f64, y: f64, z: f64) -> Position {
        let [ax, ay, az] = self.axes;
        Position::new(
            ax.pick(x, y, z) * self.scale,
            ay.pick(x, y, z) * self.scale,
            az.pick(x, y, z) * self.scale,
        )
    }

    /// Reorder/negate a rotation triple (radians or degrees) without scaling it.
    pub fn map_rotation(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let [ax, ay, az] = self.axes;
        [ax.pick(x, y, z), ay.pick(x, y, z), az.pick(x, y, z)]
    }
}

impl Default for CoordinateMapping {
    fn default() -> Self {
        Self::MOCAP_TO_DISPLAY
    }
}

/// Shorthand for [`CoordinateMapping::MOCAP_TO_DISPLAY`] with a caller-chosen unit scale.
pub fn normalize(x: f64, y: f64, z: f64, scale: Option<f64>) -> Position {
    let mapping = CoordinateMapping::MOCAP_TO_DISPLAY;
    match scale {
        Some(scale) => mapping.with_scale(scale).map_point(x, y, z),
        None => mapping.map_point(x, y, z),
    }
}

pub fn radians_to_degrees(values: [f64; 3]) -> [f64; 3] {
    values.map(f64::to_degrees)
}
