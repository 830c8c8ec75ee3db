//! Loader integration tests against a real directory tree, with a headless
//! texture backend.

use std::path::{Path, PathBuf};

use aberredanim::loader::assetinfo::{asset_dir, load_asset_tree};
use aberredanim::loader::{TextureLoader, load_asset_info};
use aberredanim::resources::animationstore::AnimationStore;
use aberredanim::resources::texturestore::{TextureEntry, TextureId, TextureStore};

/// Treats every existing file as a 16x32 image and records flips.
#[derive(Default)]
struct HeadlessLoader {
    loaded: Vec<PathBuf>,
    flips: usize,
}

impl TextureLoader for HeadlessLoader {
    fn load_png(&mut self, store: &mut TextureStore, path: &Path, _smooth: bool) -> Option<TextureId> {
        if !path.is_file() {
            return None;
        }
        self.loaded.push(path.to_path_buf());
        let mut entry = TextureEntry::headless(16, 32);
        entry.source = Some(path.to_path_buf());
        Some(store.insert(entry))
    }

    fn render_flipped(
        &mut self,
        store: &mut TextureStore,
        source: TextureId,
        _flip_h: bool,
        _flip_v: bool,
        _smooth: bool,
    ) -> Option<TextureId> {
        let (w, h) = store.size(source)?;
        self.flips += 1;
        Some(store.insert_headless(w, h))
    }
}

fn touch(path: PathBuf) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

fn write_info(root: &Path, asset: &str, body: &str) {
    let dir = asset_dir(root, asset);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("info.json"), body).unwrap();
}

const LAMP: &str = r#"{
    "scale_variants": [1.0, 0.5],
    "default_animation": "glow",
    "animations": {
        "glow": {
            "children": ["flame"],
            "movement": [[1, 0, true, [[0, 4, -2, 10.0]]], [2, 0]]
        },
        "glow_left": {
            "source": {"kind": "animation", "name": "glow"},
            "flipped_source": true,
            "flip_movement_horizontal": true,
            "loop": false
        }
    }
}"#;

fn lamp_tree(root: &Path) {
    write_info(root, "lamp", LAMP);
    let glow = asset_dir(root, "lamp").join("animations").join("glow");
    touch(glow.join("scale_100").join("normal").join("0.png"));
    touch(glow.join("scale_100").join("normal").join("1.png"));
    touch(glow.join("scale_50").join("normal").join("0.png"));
}

#[test]
fn missing_variant_is_reported_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    lamp_tree(tmp.path());
    let mut loader = HeadlessLoader::default();
    let mut store = TextureStore::new();

    let (info, load) = load_asset_info(tmp.path(), "lamp", &mut loader, &mut store).unwrap();
    // The gap is reported for the folder load and again for its mirror.
    assert!(!load.is_complete());
    assert_eq!(load.missing.len(), 2);
    assert!(load.has(0, 0) && load.has(1, 0) && load.has(0, 1));
    assert!(!load.has(1, 1));
    assert_eq!(loader.loaded.len(), 3);

    let glow = info.animation("glow").unwrap();
    assert_eq!(glow.frame_count(), 2);
    for frame in glow.frames() {
        assert_eq!(frame.variants.len(), 2);
    }
    assert!(glow.frames()[0].variants[1].base.is_some());
}

#[test]
fn derived_animation_mirrors_frames_movement_and_children() {
    let tmp = tempfile::tempdir().unwrap();
    lamp_tree(tmp.path());
    let mut loader = HeadlessLoader::default();
    let mut store = TextureStore::new();

    let (info, _) = load_asset_info(tmp.path(), "lamp", &mut loader, &mut store).unwrap();
    let left = info.animation("glow_left").unwrap();
    assert_eq!(left.frame_count(), 2);
    assert!(!left.looped);
    assert!(loader.flips >= 3);

    let deltas: Vec<i32> = left.frames().iter().map(|f| f.dx).collect();
    assert_eq!(deltas, vec![-1, -2]);
    assert_eq!(left.child_assets(), &["flame".to_string()]);
    assert_eq!(left.frames()[0].children[0].dx, -4);
    assert_eq!(left.frames()[0].children[0].dy, -2);

    let source = info.animation("glow").unwrap();
    assert_ne!(
        left.frames()[0].base_texture(0),
        source.frames()[0].base_texture(0)
    );
}

#[test]
fn asset_tree_loads_children_and_survives_missing_ones() {
    let tmp = tempfile::tempdir().unwrap();
    lamp_tree(tmp.path());
    write_info(tmp.path(), "flame", r#"{"animations": {"default": {}}}"#);
    let flame = asset_dir(tmp.path(), "flame").join("animations").join("default");
    touch(flame.join("scale_100").join("normal").join("0.png"));

    let mut loader = HeadlessLoader::default();
    let mut store = TextureStore::new();
    let mut animations = AnimationStore::default();
    load_asset_tree(tmp.path(), "lamp", &mut loader, &mut store, &mut animations).unwrap();
    assert!(animations.get("lamp").is_some());
    let flame = animations.animation("flame", "default").unwrap();
    assert_eq!(flame.frame_count(), 1);

    let before = store.len();
    assert!(animations.remove("flame", &mut store));
    assert!(store.len() < before);
}

#[test]
fn unreadable_definition_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_info(tmp.path(), "broken", "{ nope");
    let mut loader = HeadlessLoader::default();
    let mut store = TextureStore::new();
    assert!(load_asset_info(tmp.path(), "broken", &mut loader, &mut store).is_err());
    assert!(load_asset_info(tmp.path(), "absent", &mut loader, &mut store).is_err());
}
