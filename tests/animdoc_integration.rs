//! Animation document integration tests: parsing defaults, writing and
//! re-reading, on-end classification and child-name synchronisation.

use serde_json::json;

use aberredanim::animation::{
    Animation, AnimationChildFrameData, AnimationFrame, ChildTimelineMode, MovementPath,
    OnEndDirective, classify_on_end,
};
use aberredanim::animdoc::AnimationDocument;

type SampleTuple = (i32, i32, i32, f32, bool, bool);

fn samples(doc: &AnimationDocument) -> Vec<Vec<SampleTuple>> {
    doc.frames()
        .iter()
        .map(|f| {
            f.children
                .iter()
                .map(|c| (c.child_index, c.dx, c.dy, c.degree, c.visible, c.render_in_front))
                .collect()
        })
        .collect()
}

fn authored_document() -> AnimationDocument {
    AnimationDocument::parse(
        &json!({
            "children": ["sword", "shield"],
            "loop": false,
            "on_end": "idle",
            "movement": [
                [1, 0, true, [[0, 12, -3, 15.0], [1, -4, 2, 0.0, false, false]]],
                [2, -1, false, [200, 100, 50], [[0, 11, -2, 17.5, true, false]]],
                {"dx": 3, "dy": 0, "resort_z": true, "children": [
                    {"child_index": 1, "dx": 5, "dy": 5, "rotation": -90.0, "front": false}
                ]}
            ],
            "hit_geometry": [[0, -20, 10, 20], null, [1, 1, 0, 0]]
        }),
        &[],
    )
}

#[test]
fn child_sample_defaults_to_visible() {
    let doc = AnimationDocument::parse(
        &json!({
            "children": ["spark"],
            "movement": [[0, 0, false, [255, 255, 255], [[0, 12, -3, 15.0]]]]
        }),
        &[],
    );
    assert_eq!(
        doc.frames()[0].children,
        vec![AnimationChildFrameData {
            child_index: 0,
            dx: 12,
            dy: -3,
            degree: 15.0,
            visible: true,
            render_in_front: true,
        }]
    );
}

#[test]
fn written_document_reads_back_identically() {
    let doc = authored_document();
    assert_eq!(doc.frame_count(), 3);
    let reread = AnimationDocument::parse(&doc.to_value(), &[]);
    assert_eq!(samples(&reread), samples(&doc));
    assert_eq!(reread.children, doc.children);

    let deltas: Vec<(i32, i32, bool)> =
        reread.frames().iter().map(|f| (f.dx, f.dy, f.z_resort)).collect();
    assert_eq!(deltas, vec![(1, 0, true), (2, -1, false), (3, 0, true)]);
    assert_eq!(reread.frames()[1].rgb, doc.frames()[1].rgb);
}

#[test]
fn unknown_keys_survive_a_file_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("attack.json");
    let doc = authored_document();
    doc.save_to_file(&path).unwrap();

    let loaded = AnimationDocument::load_from_file(&path).unwrap();
    assert_eq!(loaded.extra.get("on_end"), Some(&json!("idle")));
    assert_eq!(loaded.extra.get("loop"), Some(&json!(false)));
    assert_eq!(samples(&loaded), samples(&doc));
}

#[test]
fn malformed_text_is_an_error_but_odd_shapes_are_not() {
    assert!(AnimationDocument::parse_str("{ not json", &[]).is_err());
    let doc = AnimationDocument::parse_str("[1, 2, 3]", &[]).unwrap();
    assert_eq!(doc.frame_count(), 1);
    assert!(doc.children.is_empty());
}

#[test]
fn on_end_classification_ignores_case() {
    let cases = [
        ("default", OnEndDirective::Default),
        ("", OnEndDirective::Default),
        ("Kill", OnEndDirective::Kill),
        ("LOCK", OnEndDirective::Lock),
        ("Reverse", OnEndDirective::Reverse),
        ("Idle", OnEndDirective::Animation("Idle".to_string())),
    ];
    for (text, expected) in cases {
        assert_eq!(classify_on_end(text), expected, "{text:?}");
    }
}

#[test]
fn child_names_keep_timelines_in_sync() {
    let mut anim = Animation::new("swing");
    anim.set_movement_paths(vec![MovementPath::new(
        (0..4).map(|i| AnimationFrame::with_delta(i, 0)).collect(),
    )]);

    for names in [
        vec!["sword"],
        vec!["sword", "shield", "cape"],
        vec!["cape", "", "cape", "sword"],
        vec![],
    ] {
        anim.set_child_names(&names);
        let expected = names
            .iter()
            .filter(|n| !n.is_empty())
            .fold(Vec::<&str>::new(), |mut acc, n| {
                if !acc.contains(n) {
                    acc.push(*n);
                }
                acc
            });
        assert_eq!(anim.child_assets().len(), expected.len());
        assert_eq!(anim.child_timelines().len(), expected.len());
        for timeline in anim.child_timelines() {
            assert_eq!(timeline.mode, ChildTimelineMode::Static);
            assert_eq!(timeline.frames.len(), anim.frame_count());
        }
    }
}

#[test]
fn document_applies_to_animation_and_back() {
    let doc = authored_document();
    let mut anim = Animation::new("attack");
    doc.apply_to(&mut anim);
    assert_eq!(anim.frame_count(), 3);
    assert_eq!(anim.child_assets(), &["sword".to_string(), "shield".to_string()]);
    assert_eq!(anim.child_timelines()[0].frames.len(), 3);
    assert!(!anim.child_timelines()[1].frames[0].render_in_front);

    let captured = AnimationDocument::from_animation(&anim);
    assert_eq!(samples(&captured), samples(&doc));
    assert_eq!(captured.frames()[0].hit_geometry, doc.frames()[0].hit_geometry);
}
