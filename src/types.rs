use cgmath::{Quaternion as CgQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Depth = usize;
pub type Quaternion = CgQuaternion<f64>;
pub type Position = Vector3<f64>;

/// One time-sample: every channel value of every joint, in skeleton pre-order.
pub type Frame = Vec<f64>;

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A single animated degree of freedom of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Xposition,
    Yposition,
    Zposition,
    Xrotation,
    Yrotation,
    Zrotation,
}

impl Channel {
    /// Parse a channel token as it appears on a `CHANNELS` line.
    pub fn from_token(token: &str) -> Option<Channel> {
        match token {
            "Xposition" => Some(Channel::Xposition),
            "Yposition" => Some(Channel::Yposition),
            "Zposition" => Some(Channel::Zposition),
            "Xrotation" => Some(Channel::Xrotation),
            "Yrotation" => Some(Channel::Yrotation),
            "Zrotation" => Some(Channel::Zrotation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Xposition => "Xposition",
            Channel::Yposition => "Yposition",
            Channel::Zposition => "Zposition",
            Channel::Xrotation => "Xrotation",
            Channel::Yrotation => "Yrotation",
            Channel::Zrotation => "Zrotation",
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Channel::Xposition | Channel::Xrotation => Axis::X,
            Channel::Yposition | Channel::Yrotation => Axis::Y,
            Channel::Zposition | Channel::Zrotation => Axis::Z,
        }
    }

    pub fn is_rotation(&self) -> bool {
        matches!(
            self,
            Channel::Xrotation | Channel::Yrotation | Channel::Zrotation
        )
    }

    pub fn is_position(&self) -> bool {
        !self.is_rotation()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Terminal marker closing a kinematic chain. Not a traversable joint: it carries no channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Endsite {
    pub offset: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// Position in the skeleton's pre-order.
    pub index: Index,
    /// `None` only for the root.
    pub parent_index: Option<Index>,
    pub depth: Depth,
    /// Rest-pose offset, local to the parent.
    pub offset: Position,
    /// Animated channels, in the order they are packed into a frame.
    pub channels: Vec<Channel>,
    pub children: Vec<Index>,
    pub endsite: Option<Endsite>,
}

impl Joint {
    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_position_channels(&self) -> bool {
        self.channels.iter().any(Channel::is_position)
    }
}
