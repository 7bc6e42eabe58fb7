use crate::types::{Axis, Channel, Position, Quaternion};
use cgmath::{Deg, Euler, One, Rad, Rotation3};

/// Rotation of `degrees` about a single principal axis.
pub(crate) fn axis_rotation(axis: Axis, degrees: f64) -> Quaternion {
    match axis {
        Axis::X => Quaternion::from_angle_x(Deg(degrees)),
        Axis::Y => Quaternion::from_angle_y(Deg(degrees)),
        Axis::Z => Quaternion::from_angle_z(Deg(degrees)),
    }
}

/// Convert euler angles in DEGREES to a quaternion.
///
/// Rotations compose in the order the channels are listed (intrinsic), so a joint declared as
/// `Zrotation Xrotation Yrotation` gets `Rz * Rx * Ry`. Position channels are skipped.
pub(crate) fn rotation_from_channels(channels: &[Channel], values: &[f64]) -> Quaternion {
    channels
        .iter()
        .zip(values)
        .filter(|(channel, _)| channel.is_rotation())
        .fold(Quaternion::one(), |rotation, (channel, &degrees)| {
            rotation * axis_rotation(channel.axis(), degrees)
        })
}

/// Animated translation of a joint; zero on axes without a position channel.
pub(crate) fn translation_from_channels(channels: &[Channel], values: &[f64]) -> Position {
    let mut translation = Position::new(0.0, 0.0, 0.0);
    for (channel, &value) in channels.iter().zip(values) {
        match channel {
            Channel::Xposition => translation.x = value,
            Channel::Yposition => translation.y = value,
            Channel::Zposition => translation.z = value,
            _ => {}
        }
    }
    translation
}

/// Reorder (x, y, z) position and rotation triples into a joint's channel order.
pub(crate) fn pack_channels(channels: &[Channel], position: [f64; 3], rotation: [f64; 3]) -> Vec<f64> {
    channels
        .iter()
        .map(|channel| {
            let source = if channel.is_rotation() {
                &rotation
            } else {
                &position
            };
            match channel.axis() {
                Axis::X => source[0],
                Axis::Y => source[1],
                Axis::Z => source[2],
            }
        })
        .collect()
}

/// Decompose a rotation into X, Y, Z euler angles in degrees (`Rx * Ry * Rz`).
pub fn quat_to_euler_degrees(rotation: Quaternion) -> [f64; 3] {
    let euler: Euler<Rad<f64>> = Euler::from(rotation);
    [
        Deg::from(euler.x).0,
        Deg::from(euler.y).0,
        Deg::from(euler.z).0,
    ]
}
