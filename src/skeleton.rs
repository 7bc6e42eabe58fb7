use crate::error::{BvhError, Result};
use crate::types::*;
use std::collections::HashSet;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Channels carried by the template root: translation plus rotation.
pub const ROOT_CHANNELS: [Channel; 6] = [
    Channel::Xposition,
    Channel::Yposition,
    Channel::Zposition,
    Channel::Zrotation,
    Channel::Xrotation,
    Channel::Yrotation,
];

/// Channels carried by every other template joint.
pub const JOINT_CHANNELS: [Channel; 3] = [Channel::Zrotation, Channel::Xrotation, Channel::Yrotation];

/// Deepest joint nesting accepted by the builder and the decoder (the root is depth 0).
pub const MAX_DEPTH: Depth = 256;

/// A name the text format can carry: non-empty, no whitespace, no braces.
pub fn is_valid_joint_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '{' || c == '}')
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Joint hierarchy stored as a pre-order arena.
///
/// Joint `i` is the `i`-th joint visited by a pre-order walk, so the arena order is also the
/// order in which joint channels are packed into a [`Frame`]. Parents and children refer to each
/// other by index, never by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Wrap joints that are already laid out in pre-order with consistent indices.
    /// Childless joints without an end site get a zero-length one.
    pub(crate) fn from_preorder(mut joints: Vec<Joint>) -> Skeleton {
        for joint in joints.iter_mut() {
            if joint.children.is_empty() && joint.endsite.is_none() {
                joint.endsite = Some(Endsite {
                    offset: Position::new(0.0, 0.0, 0.0),
                });
            }
        }
        Skeleton { joints }
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Joint> {
        self.joints.iter()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    pub fn joint(&self, index: Index) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    pub fn parent(&self, joint: &Joint) -> Option<&Joint> {
        joint.parent_index.map(|index| &self.joints[index])
    }

    /// Sum of every joint's channel count: the width of one frame.
    pub fn total_channels(&self) -> usize {
        self.joints.iter().map(|joint| joint.channels.len()).sum()
    }

    /// Offset of each joint's first channel inside a frame (running sum over the pre-order).
    pub fn channel_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.joints.len());
        let mut running = 0;
        for joint in self.joints.iter() {
            offsets.push(running);
            running += joint.channels.len();
        }
        offsets
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|joint| joint.name.as_str()).collect()
    }

    /// Parent/child name pairs, one per bone, for drawing line segments.
    pub fn bone_connections(&self) -> Vec<(&str, &str)> {
        self.joints
            .iter()
            .filter_map(|joint| {
                joint
                    .parent_index
                    .map(|parent| (self.joints[parent].name.as_str(), joint.name.as_str()))
            })
            .collect()
    }

    /// Returns the kinematic chains like \[\[0,1,2,3,4,5\],\[3,6,7,8,9\],\[3,10,11,12,13\],...\]
    /// Every chain after the first starts at the joint it branches off from, so consecutive
    /// indices of a chain can be drawn as one polyline.
    pub fn kinematic_chains(&self) -> Vec<Vec<Index>> {
        let mut chains: Vec<Vec<Index>> = Vec::new();
        let mut chain: Vec<Index> = Vec::new();
        let mut last_depth: Option<Depth> = None;
        for joint in self.joints.iter() {
            let continues = matches!(last_depth, Some(depth) if depth + 1 == joint.depth);
            if !continues && !chain.is_empty() {
                chains.push(std::mem::take(&mut chain));
                if let Some(parent) = joint.parent_index {
                    chain.push(parent);
                }
            }
            last_depth = Some(joint.depth);
            chain.push(joint.index);
        }
        if !chain.is_empty() {
            chains.push(chain);
        }
        chains
    }
}

impl<'a> IntoIterator for &'a Skeleton {
    type Item = &'a Joint;
    type IntoIter = std::slice::Iter<'a, Joint>;

    fn into_iter(self) -> Self::IntoIter {
        self.joints.iter()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

struct PendingJoint {
    name: String,
    parent: Option<Index>,
    depth: Depth,
    offset: Position,
    channels: Vec<Channel>,
    endsite: Option<Position>,
    children: Vec<Index>,
}

/// Incremental skeleton construction. Each joint is created after its parent (the parent is
/// named by the handle returned when it was added), so the result is a tree by construction.
#[derive(Default)]
pub struct SkeletonBuilder {
    pending: Vec<PendingJoint>,
    names: HashSet<String>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&mut self, name: &str, offset: Position, channels: &[Channel]) -> Result<Index> {
        if !self.pending.is_empty() {
            return Err(BvhError::Hierarchy(format!(
                "cannot add root '{}': skeleton already has root '{}'",
                name, self.pending[0].name
            )));
        }
        self.push(name, None, offset, channels)
    }

    pub fn joint(
        &mut self,
        parent: Index,
        name: &str,
        offset: Position,
        channels: &[Channel],
    ) -> Result<Index> {
        if parent >= self.pending.len() {
            return Err(BvhError::InvalidJointIndex(parent));
        }
        let index = self.push(name, Some(parent), offset, channels)?;
        self.pending[parent].children.push(index);
        Ok(index)
    }

    /// Close the chain at `joint` with an end site.
    pub fn end_site(&mut self, joint: Index, offset: Position) -> Result<()> {
        let pending = self
            .pending
            .get_mut(joint)
            .ok_or(BvhError::InvalidJointIndex(joint))?;
        pending.endsite = Some(offset);
        Ok(())
    }

    fn push(
        &mut self,
        name: &str,
        parent: Option<Index>,
        offset: Position,
        channels: &[Channel],
    ) -> Result<Index> {
        if !is_valid_joint_name(name) {
            return Err(BvhError::Hierarchy(format!(
                "joint name '{}' must be non-empty without whitespace or braces",
                name
            )));
        }
        let depth = parent.map_or(0, |parent| self.pending[parent].depth + 1);
        if depth > MAX_DEPTH {
            return Err(BvhError::Hierarchy(format!(
                "joint '{}' nested deeper than {} levels",
                name, MAX_DEPTH
            )));
        }
        if !self.names.insert(name.to_string()) {
            return Err(BvhError::Hierarchy(format!("duplicate joint name '{}'", name)));
        }
        self.pending.push(PendingJoint {
            name: name.to_string(),
            parent,
            depth,
            offset,
            channels: channels.to_vec(),
            endsite: None,
            children: Vec::new(),
        });
        Ok(self.pending.len() - 1)
    }

    /// Lay the joints out in pre-order (children in insertion order).
    pub fn build(self) -> Result<Skeleton> {
        if self.pending.is_empty() {
            return Err(BvhError::Hierarchy("skeleton has no root joint".to_string()));
        }

        //// pre-order walk over insertion indices
        let mut order: Vec<Index> = Vec::with_capacity(self.pending.len());
        let mut stack: Vec<Index> = vec![0];
        while let Some(current) = stack.pop() {
            order.push(current);
            for &child in self.pending[current].children.iter().rev() {
                stack.push(child);
            }
        }

        //// remap insertion indices to pre-order indices
        let mut remap = vec![0; self.pending.len()];
        for (new_index, &old_index) in order.iter().enumerate() {
            remap[old_index] = new_index;
        }

        let mut depths = vec![0; self.pending.len()];
        let mut slots: Vec<Option<PendingJoint>> = self.pending.into_iter().map(Some).collect();
        let mut joints = Vec::with_capacity(order.len());
        for (new_index, &old_index) in order.iter().enumerate() {
            let Some(pending) = slots[old_index].take() else {
                continue;
            };
            let parent_index = pending.parent.map(|parent| remap[parent]);
            let depth = parent_index.map_or(0, |parent| depths[parent] + 1);
            depths[new_index] = depth;
            joints.push(Joint {
                name: pending.name,
                index: new_index,
                parent_index,
                depth,
                offset: pending.offset,
                channels: pending.channels,
                children: pending.children.iter().map(|&child| remap[child]).collect(),
                endsite: pending.endsite.map(|offset| Endsite { offset }),
            });
        }

        Ok(Skeleton::from_preorder(joints))
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// (name, parent, offset in centimetres). Parents always precede their children.
const BASEBALL_TEMPLATE: [(&str, Option<&str>, [f64; 3]); 22] = [
    ("Hips", None, [0.0, 0.0, 0.0]),
    ("Spine", Some("Hips"), [0.0, 12.0, 0.0]),
    ("Spine1", Some("Spine"), [0.0, 15.0, 0.0]),
    ("Spine2", Some("Spine1"), [0.0, 15.0, 0.0]),
    ("Neck", Some("Spine2"), [0.0, 12.0, 0.0]),
    ("Head", Some("Neck"), [0.0, 8.0, 0.0]),
    ("LeftShoulder", Some("Spine2"), [-8.0, 5.0, 0.0]),
    ("LeftArm", Some("LeftShoulder"), [-18.0, 0.0, 0.0]),
    ("LeftForeArm", Some("LeftArm"), [-25.0, 0.0, 0.0]),
    ("LeftHand", Some("LeftForeArm"), [-18.0, 0.0, 0.0]),
    ("RightShoulder", Some("Spine2"), [8.0, 5.0, 0.0]),
    ("RightArm", Some("RightShoulder"), [18.0, 0.0, 0.0]),
    ("RightForeArm", Some("RightArm"), [25.0, 0.0, 0.0]),
    ("RightHand", Some("RightForeArm"), [18.0, 0.0, 0.0]),
    ("LeftUpLeg", Some("Hips"), [-5.0, 0.0, 0.0]),
    ("LeftLeg", Some("LeftUpLeg"), [0.0, -40.0, 0.0]),
    ("LeftFoot", Some("LeftLeg"), [0.0, -40.0, 0.0]),
    ("LeftToeBase", Some("LeftFoot"), [0.0, 0.0, 15.0]),
    ("RightUpLeg", Some("Hips"), [5.0, 0.0, 0.0]),
    ("RightLeg", Some("RightUpLeg"), [0.0, -40.0, 0.0]),
    ("RightFoot", Some("RightLeg"), [0.0, -40.0, 0.0]),
    ("RightToeBase", Some("RightFoot"), [0.0, 0.0, 15.0]),
];

fn build_template(template: &[(&str, Option<&str>, [f64; 3])]) -> Result<Skeleton> {
    let mut builder = SkeletonBuilder::new();
    let mut handles: Vec<(&str, Index)> = Vec::with_capacity(template.len());
    for &(name, parent, [x, y, z]) in template {
        let offset = Position::new(x, y, z);
        let handle = match parent {
            None => builder.root(name, offset, &ROOT_CHANNELS)?,
            Some(parent) => {
                let parent = handles
                    .iter()
                    .find(|(candidate, _)| *candidate == parent)
                    .map(|&(_, handle)| handle)
                    .ok_or_else(|| BvhError::UnknownJoint(parent.to_string()))?;
                builder.joint(parent, name, offset, &JOINT_CHANNELS)?
            }
        };
        handles.push((name, handle));
    }
    builder.build()
}

/// The human skeleton used for baseball captures: hip root, spine chain up to the head, two arm
/// chains off the upper spine and two leg chains off the hips. 22 joints, 69 channels.
pub fn baseball_skeleton() -> Skeleton {
    build_template(&BASEBALL_TEMPLATE).expect("BUG: the built-in skeleton template is not a tree")
}
