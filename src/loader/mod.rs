//! Animation loading.
//!
//! Fills animation frame caches from the pre-rendered PNG layout on disk,
//! derives animations from other animations (flip, reverse), and reads the
//! per-asset-type definition (`info.json`).
//!
//! GPU work goes through the [`TextureLoader`] trait so the bookkeeping here
//! can run headless. [`raylibloader::RaylibTextureLoader`] is the real
//! implementation.
//!
//! # Related
//!
//! - [`crate::resources::texturestore::TextureStore`] – owner of every loaded texture
//! - [`crate::animdoc`] – per-animation JSON payloads read by [`assetinfo`]

pub mod assetinfo;
pub mod cloner;
pub mod frames;
pub mod raylibloader;

use std::path::Path;

use crate::error::AnimError;
use crate::resources::texturestore::{TextureId, TextureStore};

pub use assetinfo::{AssetInfo, LightSource, load_asset_info};
pub use cloner::{CloneOptions, copy_from};
pub use frames::{clear_texture_cache, rebuild_animation, rebuild_frame};

/// Texture backend used by the loader and the cloner.
pub trait TextureLoader {
    /// Load a PNG into `store`. `None` when the file is missing or
    /// unreadable.
    fn load_png(&mut self, store: &mut TextureStore, path: &Path, smooth: bool)
    -> Option<TextureId>;

    /// Store a copy of `source` drawn with the given flips.
    fn render_flipped(
        &mut self,
        store: &mut TextureStore,
        source: TextureId,
        flip_h: bool,
        flip_v: bool,
        smooth: bool,
    ) -> Option<TextureId>;
}

/// Outcome of loading one scale variant of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantLoad {
    pub frame: usize,
    pub variant: usize,
    /// Scale step as a percentage (the `scale_{p}` folder).
    pub percent: i32,
}

/// What a load managed to do.
///
/// A variant whose base texture is missing is left out and its error is
/// recorded; the animation stays usable with the variants that loaded.
#[derive(Debug, Default)]
pub struct PartialLoad {
    pub loaded: Vec<VariantLoad>,
    pub missing: Vec<AnimError>,
}

impl PartialLoad {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn merge(&mut self, other: PartialLoad) {
        self.loaded.extend(other.loaded);
        self.missing.extend(other.missing);
    }

    /// Whether `variant` of `frame` loaded.
    pub fn has(&self, frame: usize, variant: usize) -> bool {
        self.loaded
            .iter()
            .any(|l| l.frame == frame && l.variant == variant)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Headless texture loader for tests.

    use std::path::{Path, PathBuf};

    use rustc_hash::FxHashSet;

    use super::TextureLoader;
    use crate::resources::texturestore::{TextureEntry, TextureId, TextureStore};

    /// Pretends that every path in `present` is a 16x32 PNG.
    #[derive(Default)]
    pub struct FakeTextureLoader {
        pub present: FxHashSet<PathBuf>,
        pub smooth_requests: Vec<bool>,
        pub flips: Vec<(TextureId, bool, bool)>,
    }

    impl FakeTextureLoader {
        pub fn with_files<I, P>(files: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                present: files.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }
    }

    impl TextureLoader for FakeTextureLoader {
        fn load_png(
            &mut self,
            store: &mut TextureStore,
            path: &Path,
            smooth: bool,
        ) -> Option<TextureId> {
            self.smooth_requests.push(smooth);
            if !self.present.contains(path) {
                return None;
            }
            let mut entry = TextureEntry::headless(16, 32);
            entry.source = Some(path.to_path_buf());
            Some(store.insert(entry))
        }

        fn render_flipped(
            &mut self,
            store: &mut TextureStore,
            source: TextureId,
            flip_h: bool,
            flip_v: bool,
            _smooth: bool,
        ) -> Option<TextureId> {
            let (w, h) = store.size(source)?;
            self.flips.push((source, flip_h, flip_v));
            Some(store.insert_headless(w, h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_load_merge() {
        let mut a = PartialLoad::default();
        a.loaded.push(VariantLoad {
            frame: 0,
            variant: 0,
            percent: 100,
        });
        let mut b = PartialLoad::default();
        b.missing.push(AnimError::MissingTexture {
            path: "x.png".into(),
        });
        assert!(a.is_complete());
        a.merge(b);
        assert!(!a.is_complete());
        assert!(a.has(0, 0));
        assert!(!a.has(0, 1));
    }
}
