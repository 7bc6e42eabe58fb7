use crate::animation::Animation;
use crate::error::{BvhError, Result};
use crate::skeleton::{is_valid_joint_name, Skeleton, MAX_DEPTH};
use crate::types::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

///////////////////////////////////////////////////////////////////////////////////////////////////

/// What to do with a motion row that has fewer values than the hierarchy has channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShortRowPolicy {
    /// Fill the missing trailing values with 0.0 and log a warning.
    #[default]
    #[serde(rename = "pad")]
    PadWithZero,
    /// Fail with [`BvhError::DataIntegrity`].
    #[serde(rename = "reject")]
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub short_rows: ShortRowPolicy,
}

///////////////////////////////////////////////////////////////////////////////////////////////////

struct Patterns {
    joint: Regex,
    end_site: Regex,
    offset: Regex,
    channels: Regex,
    frames: Regex,
    frame_time: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        joint: Regex::new(r"^(ROOT|JOINT)\s+(\S+)$").expect("BUG: invalid joint pattern"),
        end_site: Regex::new(r"(?i)^end\s+site$").expect("BUG: invalid end site pattern"),
        offset: Regex::new(r"^OFFSET(\s+.*)?$").expect("BUG: invalid offset pattern"),
        channels: Regex::new(r"^CHANNELS\s+(\S+)(.*)$").expect("BUG: invalid channels pattern"),
        frames: Regex::new(r"^Frames:\s*(.*)$").expect("BUG: invalid frames pattern"),
        frame_time: Regex::new(r"^Frame\s+Time:\s*(.*)$").expect("BUG: invalid frame time pattern"),
    })
}

///////////////////////////////////////////////////////////////////////////////////////////////////

/// A trimmed, non-blank line and its 1-based line number.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    text: &'a str,
}

/// Position in the document (index of the next unread line).
///
/// Every parsing step takes the cursor by value and returns the cursor after what it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor(usize);

struct Document<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    fn new(text: &'a str) -> Self {
        Document {
            lines: text.lines().collect(),
        }
    }

    /// Next non-blank line at or after `cursor`.
    fn next(&self, cursor: Cursor) -> Option<(Line<'a>, Cursor)> {
        let mut index = cursor.0;
        while index < self.lines.len() {
            let text = self.lines[index].trim();
            index += 1;
            if !text.is_empty() {
                return Some((Line { number: index, text }, Cursor(index)));
            }
        }
        None
    }

    /// Like [`Document::next`], but running out of lines is a structural error.
    fn expect(&self, cursor: Cursor, what: &str) -> Result<(Line<'a>, Cursor)> {
        self.next(cursor).ok_or_else(|| {
            BvhError::structural(
                self.lines.len(),
                format!("unexpected end of file, expected {}", what),
            )
        })
    }

    /// The line at `cursor` even when it is blank.
    fn next_raw(&self, cursor: Cursor) -> Option<(Line<'a>, Cursor)> {
        let text = self.lines.get(cursor.0)?.trim();
        Some((
            Line {
                number: cursor.0 + 1,
                text,
            },
            Cursor(cursor.0 + 1),
        ))
    }

    fn remaining(&self, cursor: Cursor) -> usize {
        self.lines[cursor.0.min(self.lines.len())..]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .count()
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////

/// Joints collected so far, in the order they were declared (which is the pre-order).
struct Hierarchy {
    joints: Vec<Joint>,
    names: HashSet<String>,
}

fn __parse_floats(text: &str, line: Line) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                BvhError::format(line.number, format!("'{}' is not a number", token))
            })
        })
        .collect()
}

fn __parse_offset(line: Line) -> Result<Position> {
    let captures = patterns().offset.captures(line.text).ok_or_else(|| {
        BvhError::format(line.number, format!("expected OFFSET, found '{}'", line.text))
    })?;
    let values = __parse_floats(captures.get(1).map_or("", |m| m.as_str()), line)?;
    if values.len() != 3 {
        return Err(BvhError::format(
            line.number,
            format!("OFFSET needs 3 values, found {}", values.len()),
        ));
    }
    Ok(Position::new(values[0], values[1], values[2]))
}

fn __parse_channels(line: Line) -> Result<Vec<Channel>> {
    let captures = patterns().channels.captures(line.text).ok_or_else(|| {
        BvhError::format(line.number, format!("malformed CHANNELS line '{}'", line.text))
    })?;
    let declared = captures[1].parse::<usize>().map_err(|_| {
        BvhError::format(
            line.number,
            format!("channel count '{}' is not an integer", &captures[1]),
        )
    })?;
    let channels = captures[2]
        .split_whitespace()
        .map(|token| {
            Channel::from_token(token).ok_or_else(|| {
                BvhError::format(line.number, format!("unknown channel '{}'", token))
            })
        })
        .collect::<Result<Vec<Channel>>>()?;
    if channels.len() != declared {
        return Err(BvhError::format(
            line.number,
            format!(
                "CHANNELS declares {} channels but lists {}",
                declared,
                channels.len()
            ),
        ));
    }
    Ok(channels)
}

fn __expect_open_brace(doc: &Document, cursor: Cursor, owner: &str) -> Result<Cursor> {
    let (line, cursor) = doc.expect(cursor, "'{'")?;
    if line.text != "{" {
        return Err(BvhError::structural(
            line.number,
            format!("expected '{{' after {}, found '{}'", owner, line.text),
        ));
    }
    Ok(cursor)
}

/// `End Site { OFFSET x y z }`. Closes the chain of `owner` without adding a joint.
fn __parse_end_site(
    doc: &Document,
    cursor: Cursor,
    owner: Index,
    hierarchy: &mut Hierarchy,
) -> Result<Cursor> {
    let cursor = __expect_open_brace(doc, cursor, "End Site")?;
    let (line, cursor) = doc.expect(cursor, "OFFSET")?;
    let offset = __parse_offset(line)?;
    let (line, cursor) = doc.expect(cursor, "'}'")?;
    if line.text != "}" {
        return Err(BvhError::structural(
            line.number,
            format!("expected '}}' closing End Site, found '{}'", line.text),
        ));
    }

    let joint = &mut hierarchy.joints[owner];
    if joint.endsite.is_some() {
        return Err(BvhError::structural(
            line.number,
            format!("joint '{}' has more than one End Site", joint.name),
        ));
    }
    joint.endsite = Some(Endsite { offset });
    Ok(cursor)
}

/// Parse one joint block (the `ROOT`/`JOINT` line has been consumed already) and, recursively,
/// everything nested inside it.
fn __parse_joint(
    doc: &Document,
    cursor: Cursor,
    name: &str,
    name_line: Line,
    parent_index: Option<Index>,
    depth: Depth,
    hierarchy: &mut Hierarchy,
) -> Result<Cursor> {
    if depth > MAX_DEPTH {
        return Err(BvhError::structural(
            name_line.number,
            format!("joint '{}' nested deeper than {} levels", name, MAX_DEPTH),
        ));
    }
    if !is_valid_joint_name(name) {
        return Err(BvhError::format(
            name_line.number,
            format!("invalid joint name '{}'", name),
        ));
    }
    if !hierarchy.names.insert(name.to_string()) {
        return Err(BvhError::structural(
            name_line.number,
            format!("duplicate joint name '{}'", name),
        ));
    }

    let cursor = __expect_open_brace(doc, cursor, name)?;
    let (line, mut cursor) = doc.expect(cursor, "OFFSET")?;
    let offset = __parse_offset(line)?;

    //// CHANNELS is optional
    let mut channels = Vec::new();
    if let Some((line, after)) = doc.next(cursor) {
        if line.text.starts_with("CHANNELS") {
            channels = __parse_channels(line)?;
            cursor = after;
        }
    }

    let index = hierarchy.joints.len();
    tracing::debug!(
        "Joint '{}' (index {}, depth {}, {} channels)",
        name,
        index,
        depth,
        channels.len()
    );
    hierarchy.joints.push(Joint {
        name: name.to_string(),
        index,
        parent_index,
        depth,
        offset,
        channels,
        children: Vec::new(),
        endsite: None,
    });
    if let Some(parent) = parent_index {
        hierarchy.joints[parent].children.push(index);
    }

    //// nested joints and end sites until the closing brace
    loop {
        let (line, after) = doc.expect(cursor, &format!("'}}' closing joint '{}'", name))?;
        if line.text == "}" {
            return Ok(after);
        } else if let Some(captures) = patterns().joint.captures(line.text) {
            if &captures[1] == "ROOT" {
                return Err(BvhError::structural(
                    line.number,
                    "ROOT may only appear once, at the top of the hierarchy",
                ));
            }
            cursor = __parse_joint(
                doc,
                after,
                &captures[2],
                line,
                Some(index),
                depth + 1,
                hierarchy,
            )?;
        } else if patterns().end_site.is_match(line.text) {
            cursor = __parse_end_site(doc, after, index, hierarchy)?;
        } else {
            return Err(BvhError::structural(
                line.number,
                format!("unexpected line '{}' inside joint '{}'", line.text, name),
            ));
        }
    }
}

fn __parse_hierarchy(doc: &Document, cursor: Cursor) -> Result<(Skeleton, Cursor)> {
    let (line, cursor) = doc
        .next(cursor)
        .ok_or_else(|| BvhError::structural(0, "empty document, expected HIERARCHY"))?;
    if line.text != "HIERARCHY" {
        return Err(BvhError::structural(
            line.number,
            format!("expected HIERARCHY, found '{}'", line.text),
        ));
    }

    let (line, cursor) = doc.expect(cursor, "ROOT")?;
    let captures = patterns()
        .joint
        .captures(line.text)
        .filter(|captures| &captures[1] == "ROOT")
        .ok_or_else(|| {
            BvhError::structural(line.number, format!("expected ROOT, found '{}'", line.text))
        })?;

    let mut hierarchy = Hierarchy {
        joints: Vec::new(),
        names: HashSet::new(),
    };
    let cursor = __parse_joint(doc, cursor, &captures[2], line, None, 0, &mut hierarchy)?;
    Ok((Skeleton::from_preorder(hierarchy.joints), cursor))
}

fn __parse_header_value<'a>(
    doc: &Document<'a>,
    cursor: Cursor,
    pattern: &Regex,
    what: &str,
) -> Result<(&'a str, Line<'a>, Cursor)> {
    let (line, cursor) = doc.next(cursor).ok_or_else(|| {
        BvhError::format(doc.lines.len(), format!("missing '{}' declaration", what))
    })?;
    let value = pattern
        .captures(line.text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| {
            BvhError::format(
                line.number,
                format!("expected '{}' declaration, found '{}'", what, line.text),
            )
        })?;
    Ok((value, line, cursor))
}

fn __parse_motion(
    doc: &Document,
    cursor: Cursor,
    skeleton: &Skeleton,
    options: &ParseOptions,
) -> Result<(Vec<Frame>, f64, Cursor)> {
    let (line, cursor) = doc
        .next(cursor)
        .ok_or_else(|| BvhError::structural(doc.lines.len(), "missing MOTION section"))?;
    if line.text != "MOTION" {
        return Err(BvhError::structural(
            line.number,
            format!("expected MOTION, found '{}'", line.text),
        ));
    }

    let (value, line, cursor) = __parse_header_value(doc, cursor, &patterns().frames, "Frames:")?;
    let frame_count = value.parse::<usize>().map_err(|_| {
        BvhError::format(line.number, format!("frame count '{}' is not an integer", value))
    })?;

    let (value, line, mut cursor) =
        __parse_header_value(doc, cursor, &patterns().frame_time, "Frame Time:")?;
    let frame_time = value.parse::<f64>().map_err(|_| {
        BvhError::format(line.number, format!("frame time '{}' is not a number", value))
    })?;
    if !frame_time.is_finite() || frame_time <= 0.0 {
        return Err(BvhError::format(
            line.number,
            format!("frame time must be positive, got {}", frame_time),
        ));
    }

    //// PARSING MOTION ROWS (channel layout is fixed by the hierarchy)
    let expected = skeleton.total_channels();
    let mut frames: Vec<Frame> = Vec::with_capacity(frame_count);
    let mut padded_rows = 0;
    for frame in 0..frame_count {
        //// without channels every row is an empty line
        if expected == 0 {
            if let Some((line, after)) = doc.next_raw(cursor) {
                if !line.text.is_empty() {
                    return Err(BvhError::format(
                        line.number,
                        format!(
                            "motion row '{}' has values, hierarchy declares no channels",
                            line.text
                        ),
                    ));
                }
                cursor = after;
            }
            frames.push(Frame::new());
            continue;
        }

        let (line, after) = doc.next(cursor).ok_or_else(|| {
            BvhError::structural(
                doc.lines.len(),
                format!("declared {} frames, found only {}", frame_count, frame),
            )
        })?;
        cursor = after;

        let mut values = __parse_floats(line.text, line)?;
        if values.len() > expected {
            return Err(BvhError::format(
                line.number,
                format!(
                    "motion row has {} values, hierarchy declares {} channels",
                    values.len(),
                    expected
                ),
            ));
        }
        if values.len() < expected {
            match options.short_rows {
                ShortRowPolicy::Reject => {
                    return Err(BvhError::DataIntegrity {
                        line: line.number,
                        expected,
                        actual: values.len(),
                    });
                }
                ShortRowPolicy::PadWithZero => {
                    tracing::warn!(
                        "Motion row at line {} has {} of {} values; padding with zeros",
                        line.number,
                        values.len(),
                        expected
                    );
                    values.resize(expected, 0.0);
                    padded_rows += 1;
                }
            }
        }
        frames.push(values);
    }

    if padded_rows > 0 {
        tracing::warn!("{} of {} motion rows were padded", padded_rows, frame_count);
    }
    Ok((frames, frame_time, cursor))
}

fn parse_bvh(text: &str, options: &ParseOptions) -> Result<Animation> {
    let doc = Document::new(text);
    let (skeleton, cursor) = __parse_hierarchy(&doc, Cursor(0))?;
    let (frames, frame_time, cursor) = __parse_motion(&doc, cursor, &skeleton, options)?;

    let trailing = doc.remaining(cursor);
    if trailing > 0 {
        tracing::warn!("Ignoring {} lines after the last declared frame", trailing);
    }

    tracing::info!(
        "Parsed bvh: {} joints, {} channels, {} frames at {:.4}s",
        skeleton.len(),
        skeleton.total_channels(),
        frames.len(),
        frame_time
    );
    Animation::new(skeleton, frames, frame_time)
}

//////////////////////////////////////////////////////////////// PUBLIC ////////////////////////////////////////////////////////////////

/// load a bvh file from a file path
pub fn load_bvh_from_file(file_path: impl AsRef<Path>) -> Result<Animation> {
    load_bvh_from_file_with(file_path, &ParseOptions::default())
}

pub fn load_bvh_from_file_with(file_path: impl AsRef<Path>, options: &ParseOptions) -> Result<Animation> {
    let contents = std::fs::read_to_string(file_path.as_ref())?;
    parse_bvh(&contents, options)
}

/// load a bvh file from a string
pub fn load_bvh_from_string(bvh_string: &str) -> Result<Animation> {
    parse_bvh(bvh_string, &ParseOptions::default())
}

pub fn load_bvh_from_string_with(bvh_string: &str, options: &ParseOptions) -> Result<Animation> {
    parse_bvh(bvh_string, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0.0 0.0 0.0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  JOINT Spine
  {
    OFFSET 0.0 5.0 0.0
    CHANNELS 3 Zrotation Xrotation Yrotation
    End Site
    {
      OFFSET 0.0 3.0 0.0
    }
  }
  JOINT Leg
  {
    OFFSET 2.0 0.0 0.0
    CHANNELS 3 Zrotation Xrotation Yrotation
    JOINT Foot
    {
      OFFSET 0.0 -18.0 0.0
      CHANNELS 3 Zrotation Xrotation Yrotation
      End Site
      {
        OFFSET 0.0 0.0 5.0
      }
    }
  }
}
MOTION
Frames: 2
Frame Time: 0.033333
1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
0 0 0 0 0 0 0 0 0 0 0 0 0 0 0
";

    fn structural_line(result: Result<Animation>) -> usize {
        match result {
            Err(BvhError::Structural { line, .. }) => line,
            other => panic!("expected StructuralError, got {:?}", other),
        }
    }

    fn format_line(result: Result<Animation>) -> usize {
        match result {
            Err(BvhError::Format { line, .. }) => line,
            other => panic!("expected FormatError, got {:?}", other),
        }
    }

    #[test]
    fn parses_hierarchy_in_preorder() {
        let animation = load_bvh_from_string(SIMPLE).unwrap();
        let skeleton = animation.skeleton();
        assert_eq!(skeleton.joint_names(), vec!["Hips", "Spine", "Leg", "Foot"]);
        assert_eq!(skeleton.root().children, vec![1, 2]);
        assert_eq!(skeleton.find("Foot").unwrap().parent_index, Some(2));
        assert_eq!(skeleton.find("Foot").unwrap().depth, 2);
        assert_eq!(skeleton.channel_offsets(), vec![0, 6, 9, 12]);
        assert_eq!(
            skeleton.find("Spine").unwrap().endsite,
            Some(Endsite {
                offset: Position::new(0.0, 3.0, 0.0)
            })
        );
        assert!(skeleton.find("Leg").unwrap().endsite.is_none());
        assert_eq!(skeleton.root().channels.len(), 6);
    }

    #[test]
    fn parses_motion_rows() {
        let animation = load_bvh_from_string(SIMPLE).unwrap();
        assert_eq!(animation.frame_count(), 2);
        assert!((animation.frame_time() - 0.033333).abs() < 1e-12);
        assert_eq!(animation.joint_values(0, 2).unwrap(), &[10.0, 11.0, 12.0]);
        assert_eq!(animation.joint_values(0, 3).unwrap(), &[13.0, 14.0, 15.0]);
    }

    #[test]
    fn missing_motion_section_is_structural() {
        let hierarchy_only = SIMPLE.split("MOTION").next().unwrap();
        structural_line(load_bvh_from_string(hierarchy_only));
    }

    #[test]
    fn missing_header_is_structural() {
        let line = structural_line(load_bvh_from_string(&SIMPLE.replacen("HIERARCHY", "HIERARCHIES", 1)));
        assert_eq!(line, 1);
        structural_line(load_bvh_from_string(""));
        structural_line(load_bvh_from_string(&SIMPLE.replacen("ROOT Hips", "JOINT Hips", 1)));
    }

    #[test]
    fn missing_frame_declarations_are_format_errors() {
        let line = format_line(load_bvh_from_string(&SIMPLE.replacen("Frames: 2", "Frame count 2", 1)));
        assert_eq!(line, 31);
        format_line(load_bvh_from_string(&SIMPLE.replacen("Frames: 2", "Frames: two", 1)));
        format_line(load_bvh_from_string(&SIMPLE.replacen(
            "Frame Time: 0.033333",
            "Frame Time: fast",
            1,
        )));
        format_line(load_bvh_from_string(&SIMPLE.replacen(
            "Frame Time: 0.033333",
            "Frame Time: 0",
            1,
        )));
        let truncated = &SIMPLE[..SIMPLE.find("Frame Time").unwrap()];
        format_line(load_bvh_from_string(truncated));
    }

    #[test]
    fn too_few_frame_lines_is_structural() {
        let text = SIMPLE.replacen("Frames: 2", "Frames: 3", 1);
        structural_line(load_bvh_from_string(&text));
    }

    #[test]
    fn unbalanced_braces_are_structural() {
        let text = SIMPLE.replacen("      OFFSET 0.0 0.0 5.0\n      }\n", "      OFFSET 0.0 0.0 5.0\n", 1);
        assert!(matches!(
            load_bvh_from_string(&text),
            Err(BvhError::Structural { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_structural() {
        let text = SIMPLE.replacen("JOINT Leg", "JOINT Spine", 1);
        let line = structural_line(load_bvh_from_string(&text));
        assert_eq!(line, 15);
    }

    #[test]
    fn bad_channel_lines_are_format_errors() {
        format_line(load_bvh_from_string(&SIMPLE.replacen(
            "CHANNELS 3 Zrotation Xrotation Yrotation",
            "CHANNELS 3 Zrotation Xrotation",
            1,
        )));
        format_line(load_bvh_from_string(&SIMPLE.replacen(
            "CHANNELS 3 Zrotation Xrotation Yrotation",
            "CHANNELS 3 Zrotation Xrotation Wrotation",
            1,
        )));
        format_line(load_bvh_from_string(&SIMPLE.replacen(
            "OFFSET 0.0 5.0 0.0",
            "OFFSET 0.0 5.0",
            1,
        )));
    }

    #[test]
    fn short_rows_are_padded_by_default() {
        let text = SIMPLE.replacen(
            "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15",
            "1 2 3 4 5 6 7 8 9 10 11 12",
            1,
        );
        let animation = load_bvh_from_string(&text).unwrap();
        assert_eq!(animation.frames()[0].len(), 15);
        assert_eq!(animation.joint_values(0, 3).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(animation.joint_values(0, 2).unwrap(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn short_rows_can_be_rejected() {
        let text = SIMPLE.replacen(
            "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15",
            "1 2 3 4 5 6 7 8 9 10 11 12",
            1,
        );
        let options = ParseOptions {
            short_rows: ShortRowPolicy::Reject,
        };
        match load_bvh_from_string_with(&text, &options) {
            Err(BvhError::DataIntegrity {
                line,
                expected,
                actual,
            }) => assert_eq!((line, expected, actual), (33, 15, 12)),
            other => panic!("expected DataIntegrity, got {:?}", other),
        }
    }

    #[test]
    fn long_rows_and_bad_numbers_are_format_errors() {
        let long = SIMPLE.replacen(
            "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15",
            "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16",
            1,
        );
        assert_eq!(format_line(load_bvh_from_string(&long)), 33);
        let garbled = SIMPLE.replacen("1 2 3 4 5", "1 2 x 4 5", 1);
        assert_eq!(format_line(load_bvh_from_string(&garbled)), 33);
    }

    #[test]
    fn zero_frames_is_valid() {
        let text = SIMPLE
            .replacen("Frames: 2", "Frames: 0", 1)
            .replacen("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15\n", "", 1)
            .replacen("0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n", "", 1);
        let animation = load_bvh_from_string(&text).unwrap();
        assert!(animation.is_empty());
        assert_eq!(animation.duration(), 0.0);
    }

    #[test]
    fn blank_lines_and_indentation_are_ignored() {
        let text = SIMPLE.replace("\n", "\n\n").replace("  ", "\t");
        let animation = load_bvh_from_string(&text).unwrap();
        assert_eq!(animation.skeleton().len(), 4);
        assert_eq!(animation.frame_count(), 2);
    }

    #[test]
    fn joint_without_channels() {
        let text = SIMPLE
            .replacen("    CHANNELS 3 Zrotation Xrotation Yrotation\n    End Site", "    End Site", 1)
            .replace("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15", "1 2 3 4 5 6 10 11 12 13 14 15")
            .replace("0 0 0 0 0 0 0 0 0 0 0 0 0 0 0", "0 0 0 0 0 0 0 0 0 0 0 0");
        let animation = load_bvh_from_string(&text).unwrap();
        assert!(animation.skeleton().find("Spine").unwrap().channels.is_empty());
        assert_eq!(animation.skeleton().channel_offsets(), vec![0, 6, 6, 9]);
        assert_eq!(animation.joint_values(0, 2).unwrap(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn rows_of_a_channelless_skeleton_are_blank_lines() {
        let text = "HIERARCHY\nROOT Marker\n{\n  OFFSET 0.0 0.0 0.0\n}\nMOTION\nFrames: 3\nFrame Time: 0.5\n\n\n\n";
        let animation = load_bvh_from_string(text).unwrap();
        assert_eq!(animation.frame_count(), 3);
        assert!(animation.frames().iter().all(|frame| frame.is_empty()));

        // a missing trailing blank line loses nothing
        let trimmed = load_bvh_from_string(text.trim_end()).unwrap();
        assert_eq!(trimmed.frame_count(), 3);

        let with_values = text.replacen("Frame Time: 0.5\n\n", "Frame Time: 0.5\n1 2 3\n", 1);
        assert_eq!(format_line(load_bvh_from_string(&with_values)), 9);
    }

    #[test]
    fn nesting_is_limited() {
        let depth = MAX_DEPTH + 10;
        let mut text = String::from("HIERARCHY\nROOT j0\n{\nOFFSET 0 0 0\n");
        for level in 1..=depth {
            text.push_str(&format!("JOINT j{}\n{{\nOFFSET 0 1 0\n", level));
        }
        text.push_str(&"}\n".repeat(depth + 1));
        text.push_str("MOTION\nFrames: 0\nFrame Time: 0.1\n");
        // the offending JOINT line of level MAX_DEPTH + 1
        assert_eq!(structural_line(load_bvh_from_string(&text)), 5 + 3 * MAX_DEPTH);
    }

    #[test]
    fn braces_in_joint_names_are_format_errors() {
        assert_eq!(
            format_line(load_bvh_from_string(&SIMPLE.replacen("JOINT Leg", "JOINT Leg{", 1))),
            15
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simple.bvh");
        std::fs::write(&path, SIMPLE).unwrap();
        let animation = load_bvh_from_file(&path).unwrap();
        assert_eq!(animation.frame_count(), 2);
        assert!(matches!(
            load_bvh_from_file(dir.path().join("missing.bvh")),
            Err(BvhError::Io(_))
        ));
    }
}
