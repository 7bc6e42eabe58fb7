use bvh_mocap::parse::load_bvh_from_string;
use bvh_mocap::query::{resolve, resolve_with, RangePolicy};
use bvh_mocap::skeleton::{SkeletonBuilder, ROOT_CHANNELS};
use bvh_mocap::types::{Channel, Position};
use bvh_mocap::write::to_bvh_string;
use bvh_mocap::{
    assemble_animation, baseball_skeleton, load_bvh_from_file, save_bvh_to_file, Animation,
    BvhError, CaptureTable, Config,
};
use cgmath::InnerSpace;

fn assert_frames_close(a: &Animation, b: &Animation) {
    assert_eq!(a.frame_count(), b.frame_count());
    for (left, right) in a.frames().iter().zip(b.frames()) {
        assert_eq!(left.len(), right.len());
        for (x, y) in left.iter().zip(right) {
            assert!((x - y).abs() <= 1e-5, "{} != {}", x, y);
        }
    }
}

fn swing(num_frames: usize) -> Animation {
    let skeleton = baseball_skeleton();
    let width = skeleton.total_channels();
    let frames = (0..num_frames)
        .map(|frame| {
            (0..width)
                .map(|channel| ((frame * width + channel) as f64 * 0.37).sin() * 123.456789)
                .collect()
        })
        .collect();
    Animation::new(skeleton, frames, 1.0 / 30.0).unwrap()
}

fn three_joint_chain() -> Animation {
    let xyz = [Channel::Xrotation, Channel::Yrotation, Channel::Zrotation];
    let mut builder = SkeletonBuilder::new();
    let root = builder.root("root", Position::new(0.0, 0.0, 0.0), &ROOT_CHANNELS).unwrap();
    let mid = builder.joint(root, "mid", Position::new(0.0, 5.0, 0.0), &xyz).unwrap();
    builder.joint(mid, "tip", Position::new(0.0, 5.0, 0.0), &xyz).unwrap();
    let frames = vec![
        vec![0.0; 12],
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 90.0, 0.0, 0.0, 0.0],
    ];
    Animation::new(builder.build().unwrap(), frames, 0.1).unwrap()
}

#[test]
fn encode_then_decode_preserves_animation() {
    let original = swing(12);
    let decoded = load_bvh_from_string(&to_bvh_string(&original).unwrap()).unwrap();

    assert_eq!(decoded.skeleton(), original.skeleton());
    assert!((decoded.frame_time() - original.frame_time()).abs() <= 1e-9);
    assert_frames_close(&original, &decoded);
}

#[test]
fn encoding_is_deterministic_preorder() {
    let animation = swing(2);
    let first = to_bvh_string(&animation).unwrap();
    assert_eq!(first, to_bvh_string(&animation).unwrap());

    let order: Vec<&str> = first
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            line.strip_prefix("ROOT ").or_else(|| line.strip_prefix("JOINT "))
        })
        .collect();
    assert_eq!(order, animation.skeleton().joint_names());
    assert_eq!(
        &order[..7],
        &["Hips", "Spine", "Spine1", "Spine2", "Neck", "Head", "LeftShoulder"]
    );
}

#[test]
fn truncated_document_is_structural_error() {
    let text = to_bvh_string(&swing(1)).unwrap();
    let hierarchy_only = &text[..text.find("MOTION").unwrap()];
    assert!(matches!(
        load_bvh_from_string(hierarchy_only),
        Err(BvhError::Structural { .. })
    ));
}

#[test]
fn decoded_chain_resolves_through_parent_rotation() {
    let decoded = load_bvh_from_string(&to_bvh_string(&three_joint_chain()).unwrap()).unwrap();

    let rest = resolve(&decoded, 0).unwrap();
    let tip = rest.world("tip").unwrap().position;
    assert!((tip - Position::new(0.0, 10.0, 0.0)).magnitude() < 1e-9);

    let bent = resolve(&decoded, 1).unwrap();
    let tip = bent.world("tip").unwrap().position;
    assert!((tip - Position::new(-5.0, 5.0, 0.0)).magnitude() < 1e-9, "{:?}", tip);

    assert!(matches!(resolve(&decoded, 2), Err(BvhError::Range { index: 2, frame_count: 2 })));
    assert_eq!(resolve_with(&decoded, 5, RangePolicy::Clamp).unwrap().frame, Some(1));
}

#[test]
fn capture_tables_convert_to_file_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swing.bvh");

    // one 12-field block per joint, 22 joints, 3 frames
    let row = |scale: f64| -> String {
        (0..22 * 12)
            .map(|field| format!("{}", (field % 12) as f64 * scale * 0.01))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let text = format!("header\n{}\n{}\n{}\n", row(1.0), row(2.0), row(3.0));
    let centers = CaptureTable::parse(&text);
    let rotations = CaptureTable::parse(&text);

    let animation =
        assemble_animation(baseball_skeleton(), &centers, &rotations, &Config::default()).unwrap();
    save_bvh_to_file(&animation, &path).unwrap();
    let loaded = load_bvh_from_file(&path).unwrap();

    assert_eq!(loaded.frame_count(), 3);
    assert_eq!(loaded.skeleton().total_channels(), 69);
    assert_frames_close(&animation, &loaded);
}

fn same_value(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
}

fn edge_skeletons() -> Vec<bvh_mocap::Skeleton> {
    let origin = Position::new(0.0, 0.0, 0.0);
    let mut skeletons = Vec::new();

    // nothing animated at all
    let mut builder = SkeletonBuilder::new();
    builder.root("Marker", origin, &[]).unwrap();
    skeletons.push(builder.build().unwrap());

    // channel-less joints mixed with partial and reordered channel sets
    let mut builder = SkeletonBuilder::new();
    let root = builder.root("Root", Position::new(1.5, -2.0, 0.25), &[]).unwrap();
    let slider = builder
        .joint(root, "Slider", Position::new(0.0, 3.0, 0.0), &[Channel::Yposition, Channel::Xposition])
        .unwrap();
    let wrist = builder
        .joint(slider, "Wrist_L", Position::new(-1.0, 0.0, 0.0), &[Channel::Yrotation, Channel::Zrotation])
        .unwrap();
    builder.joint(wrist, "Fixed", Position::new(0.0, 0.0, 2.0), &[]).unwrap();
    // end site on a joint that also has children
    builder.end_site(slider, Position::new(0.0, 0.5, 0.0)).unwrap();
    builder.end_site(wrist, Position::new(0.0, 0.0, -0.5)).unwrap();
    skeletons.push(builder.build().unwrap());

    // a long single chain
    let mut builder = SkeletonBuilder::new();
    let mut parent = builder.root("Chain0", origin, &ROOT_CHANNELS).unwrap();
    for link in 1..40 {
        parent = builder
            .joint(parent, &format!("Chain{}", link), Position::new(0.0, 1.0, 0.0), &[Channel::Xrotation])
            .unwrap();
    }
    skeletons.push(builder.build().unwrap());

    skeletons
}

#[test]
fn edge_skeletons_survive_encode_then_decode() {
    let specials = [
        0.0,
        -0.0,
        1e-300,
        f64::MIN_POSITIVE,
        f64::MAX,
        -123.456789,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
    ];

    for skeleton in edge_skeletons() {
        let width = skeleton.total_channels();
        for num_frames in [0, 1, 3] {
            let frames: Vec<Vec<f64>> = (0..num_frames)
                .map(|frame| {
                    (0..width)
                        .map(|channel| specials[(frame * 7 + channel) % specials.len()])
                        .collect()
                })
                .collect();
            let original = Animation::new(skeleton.clone(), frames, 0.008333).unwrap();
            let text = to_bvh_string(&original).unwrap();
            let decoded = load_bvh_from_string(&text)
                .unwrap_or_else(|err| panic!("failed to decode:\n{}\n{}", text, err));

            assert_eq!(decoded.skeleton(), original.skeleton());
            assert_eq!(decoded.frame_count(), num_frames);
            assert_eq!(decoded.frame_time(), original.frame_time());
            for (left, right) in original.frames().iter().zip(decoded.frames()) {
                assert_eq!(left.len(), right.len());
                for (&x, &y) in left.iter().zip(right) {
                    assert!(same_value(x, y), "{} != {}", x, y);
                }
            }
        }
    }
}

#[test]
fn names_the_decoder_cannot_read_are_refused_up_front() {
    let mut builder = SkeletonBuilder::new();
    let root = builder.root("root", Position::new(0.0, 0.0, 0.0), &ROOT_CHANNELS).unwrap();
    assert!(matches!(
        builder.joint(root, "Left Arm", Position::new(0.0, 1.0, 0.0), &[]),
        Err(BvhError::Hierarchy(_))
    ));
}
