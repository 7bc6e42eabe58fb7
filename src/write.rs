use crate::animation::Animation;
use crate::error::{BvhError, Result};
use crate::skeleton::Skeleton;
use crate::types::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const INDENT: &str = "  ";

/// Shortest representation that parses back to the same `f64`, always with a decimal point.
fn fmt_value(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text + ".0"
    } else {
        text
    }
}

fn fmt_triple(position: &Position) -> String {
    format!(
        "{} {} {}",
        fmt_value(position.x),
        fmt_value(position.y),
        fmt_value(position.z)
    )
}

/// Every frame must be exactly as wide as the skeleton's channel layout.
pub(crate) fn check_frames(skeleton: &Skeleton, frames: &[Frame]) -> Result<()> {
    let expected = skeleton.total_channels();
    for (frame, values) in frames.iter().enumerate() {
        if values.len() != expected {
            return Err(BvhError::ChannelMismatch {
                frame,
                expected,
                actual: values.len(),
            });
        }
    }
    Ok(())
}

fn __write_joint<W: Write>(writer: &mut W, skeleton: &Skeleton, index: Index) -> io::Result<()> {
    let joint = &skeleton.joints()[index];
    let indent = INDENT.repeat(joint.depth);
    let keyword = if joint.is_root() { "ROOT" } else { "JOINT" };

    writeln!(writer, "{}{} {}", indent, keyword, joint.name)?;
    writeln!(writer, "{}{{", indent)?;
    writeln!(writer, "{}{}OFFSET {}", indent, INDENT, fmt_triple(&joint.offset))?;
    if !joint.channels.is_empty() {
        let names: Vec<&str> = joint.channels.iter().map(Channel::as_str).collect();
        writeln!(
            writer,
            "{}{}CHANNELS {} {}",
            indent,
            INDENT,
            joint.channels.len(),
            names.join(" ")
        )?;
    }

    for &child in joint.children.iter() {
        __write_joint(writer, skeleton, child)?;
    }

    if let Some(endsite) = &joint.endsite {
        writeln!(writer, "{}{}End Site", indent, INDENT)?;
        writeln!(writer, "{}{}{{", indent, INDENT)?;
        writeln!(
            writer,
            "{}{}{}OFFSET {}",
            indent,
            INDENT,
            INDENT,
            fmt_triple(&endsite.offset)
        )?;
        writeln!(writer, "{}{}}}", indent, INDENT)?;
    }

    writeln!(writer, "{}}}", indent)
}

fn __write_document<W: Write>(
    writer: &mut W,
    skeleton: &Skeleton,
    frames: &[Frame],
    frame_time: f64,
) -> io::Result<()> {
    writeln!(writer, "HIERARCHY")?;
    __write_joint(writer, skeleton, 0)?;

    writeln!(writer, "MOTION")?;
    writeln!(writer, "Frames: {}", frames.len())?;
    writeln!(writer, "Frame Time: {}", fmt_value(frame_time))?;
    for frame in frames {
        let row: Vec<String> = frame.iter().map(|&value| fmt_value(value)).collect();
        writeln!(writer, "{}", row.join(" "))?;
    }
    Ok(())
}

/// Encode a skeleton and raw frames. The frame widths are checked before anything is written.
pub fn write_bvh_parts<W: Write>(
    writer: &mut W,
    skeleton: &Skeleton,
    frames: &[Frame],
    frame_time: f64,
) -> Result<()> {
    check_frames(skeleton, frames)?;
    __write_document(writer, skeleton, frames, frame_time)?;
    Ok(())
}

pub fn write_bvh<W: Write>(writer: &mut W, animation: &Animation) -> Result<()> {
    write_bvh_parts(
        writer,
        animation.skeleton(),
        animation.frames(),
        animation.frame_time(),
    )
}

pub fn to_bvh_string(animation: &Animation) -> Result<String> {
    let mut buffer: Vec<u8> = Vec::new();
    write_bvh(&mut buffer, animation)?;
    String::from_utf8(buffer).map_err(|err| BvhError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

pub fn save_bvh_to_file(animation: &Animation, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_bvh(&mut writer, animation)?;
    writer.flush()?;

    tracing::info!(
        "Wrote {:?}: {} joints, {} frames",
        path,
        animation.skeleton().len(),
        animation.frame_count()
    );
    Ok(())
}
