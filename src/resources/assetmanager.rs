//! Asset manager resource.
//!
//! Loads an asset directory once and keeps the results:
//!
//! ```text
//! <dir>/objects.txt                 definitions, see crate::assetgrammar
//! <dir>/<asset>/<asset>_<i>.png     frames, contiguous from i = 0
//! ```
//!
//! For each declared asset, frames are scanned in order until the loader
//! reports a missing file. That first miss fixes the asset's frame count and
//! is not an error. Everything is built into fresh containers and only
//! committed when the whole directory loaded, so a failed load leaves the
//! manager exactly as it was.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use rustc_hash::FxHashSet;

use crate::assetgrammar::{self, AssetDefinition};
use crate::error::{AssetError, LookupError};
use crate::resources::animationstore::{AnimationCatalog, AnimationSet};
use crate::resources::framestore::{Frame, FrameId, FrameLoader, FrameStore};

/// Name of the definition file inside an asset directory.
pub const DEFINITION_FILE: &str = "objects.txt";

/// Path of frame `index` of `asset` inside `asset_dir`.
pub fn frame_path(asset_dir: &Path, asset: &str, index: usize) -> PathBuf {
    asset_dir.join(asset).join(format!("{asset}_{index}.png"))
}

/// Owner of all frames and the animation catalog built from them.
pub struct AssetManager<F> {
    frames: FrameStore<F>,
    catalog: Option<AnimationCatalog>,
}

impl<F> Default for AssetManager<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> AssetManager<F> {
    pub fn new() -> Self {
        Self {
            frames: FrameStore::new(),
            catalog: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    /// Read `<asset_dir>/objects.txt` and load every frame it needs.
    ///
    /// Fails with [`AssetError::AlreadyLoaded`] without touching anything if
    /// this manager already holds a catalog.
    pub fn load_assets<L>(
        &mut self,
        loader: &mut L,
        asset_dir: impl AsRef<Path>,
    ) -> Result<(), AssetError>
    where
        L: FrameLoader<Frame = F>,
    {
        let asset_dir = asset_dir.as_ref();
        if self.is_loaded() {
            warn!("assets already loaded, ignoring {}", asset_dir.display());
            return Err(AssetError::AlreadyLoaded);
        }

        let path = asset_dir.join(DEFINITION_FILE);
        let source = std::fs::read_to_string(&path).map_err(|source| {
            error!("could not read {}: {}", path.display(), source);
            AssetError::DefinitionRead {
                path: path.clone(),
                source,
            }
        })?;
        let definition = assetgrammar::parse(&source).inspect_err(|e| {
            error!("syntax error in {}: {}", path.display(), e);
        })?;

        self.load_definition(loader, asset_dir, &definition)
    }

    /// Load frames for an already parsed definition.
    pub fn load_definition<L>(
        &mut self,
        loader: &mut L,
        asset_dir: &Path,
        definition: &AssetDefinition,
    ) -> Result<(), AssetError>
    where
        L: FrameLoader<Frame = F>,
    {
        if self.is_loaded() {
            return Err(AssetError::AlreadyLoaded);
        }

        let mut frames = FrameStore::new();
        let mut catalog = AnimationCatalog::new();
        let mut seen = FxHashSet::default();

        for decl in &definition.assets {
            if !seen.insert(decl.name.as_str()) {
                error!("asset '{}' declared twice", decl.name);
                return Err(AssetError::DuplicateAsset(decl.name.clone()));
            }

            let ids = scan_frames(loader, &mut frames, asset_dir, &decl.name);
            info!(
                "loaded {} frames for '{}' (scale {})",
                ids.len(),
                decl.name,
                decl.effective_scale()
            );
            if ids.is_empty() && !decl.sequences.is_empty() {
                warn!("asset '{}' has sequences but no frames", decl.name);
            }

            let set = AnimationSet::from_decl(decl, &ids).inspect_err(|e| error!("{e}"))?;
            catalog.insert(set)?;
        }

        info!(
            "asset catalog ready: {} assets, {} frames",
            catalog.len(),
            frames.len()
        );
        self.frames = frames;
        self.catalog = Some(catalog);
        Ok(())
    }

    /// The loaded catalog, or [`LookupError::NotReady`].
    pub fn catalog(&self) -> Result<&AnimationCatalog, LookupError> {
        self.catalog.as_ref().ok_or(LookupError::NotReady)
    }

    /// Look up the sequences of one asset.
    pub fn animation_set(&self, asset: &str) -> Result<&Arc<AnimationSet>, LookupError> {
        self.catalog()?.get(asset)
    }

    pub fn frames(&self) -> &FrameStore<F> {
        &self.frames
    }
}

impl<F: Frame> AssetManager<F> {
    /// Natural size of frame `step` of a sequence.
    pub fn frame_size(
        &self,
        asset: &str,
        sequence: &str,
        step: usize,
    ) -> Result<(i32, i32), LookupError> {
        let seq = self.animation_set(asset)?.sequence(sequence)?;
        seq.frame(step)
            .and_then(|f| self.frames.frame_size(f.frame))
            .ok_or_else(|| LookupError::UnknownFrame {
                sequence: sequence.to_string(),
                frame: step,
            })
    }
}

fn scan_frames<L: FrameLoader>(
    loader: &mut L,
    store: &mut FrameStore<L::Frame>,
    asset_dir: &Path,
    asset: &str,
) -> Vec<FrameId> {
    let mut ids = Vec::new();
    loop {
        let path = frame_path(asset_dir, asset, ids.len());
        match loader.load_frame(&path) {
            Some(frame) => ids.push(store.insert(frame)),
            None => {
                debug!("no frame at {}, {} frames total", path.display(), ids.len());
                break;
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Fake(i32, i32);

    impl Frame for Fake {
        fn size(&self) -> (i32, i32) {
            (self.0, self.1)
        }
    }

    /// Serves frames from an in-memory table keyed by path.
    struct TableLoader(FxHashMap<PathBuf, Fake>);

    impl TableLoader {
        fn with(dir: &Path, asset: &str, sizes: &[(i32, i32)]) -> Self {
            let mut t = TableLoader(FxHashMap::default());
            t.add(dir, asset, sizes);
            t
        }
        fn add(&mut self, dir: &Path, asset: &str, sizes: &[(i32, i32)]) {
            for (i, (w, h)) in sizes.iter().enumerate() {
                self.0.insert(frame_path(dir, asset, i), Fake(*w, *h));
            }
        }
    }

    impl FrameLoader for TableLoader {
        type Frame = Fake;
        fn load_frame(&mut self, path: &Path) -> Option<Fake> {
            self.0.get(path).copied()
        }
    }

    fn dir() -> PathBuf {
        PathBuf::from("assets")
    }

    #[test]
    fn frame_path_follows_naming_convention() {
        assert_eq!(
            frame_path(Path::new("res"), "apc", 4),
            Path::new("res").join("apc").join("apc_4.png")
        );
    }

    #[test]
    fn scanning_stops_at_first_missing_frame() {
        let mut loader = TableLoader::with(&dir(), "x", &[(8, 8), (8, 8), (8, 8)]);
        // A stray frame after the gap is never reached.
        loader
            .0
            .insert(frame_path(&dir(), "x", 4), Fake(1, 1));
        let def = assetgrammar::parse("x: { a(10) = [0, 1, 2] }").unwrap();

        let mut assets = AssetManager::new();
        assets.load_definition(&mut loader, &dir(), &def).unwrap();
        assert_eq!(assets.animation_set("x").unwrap().frame_count(), 3);
        assert_eq!(assets.frames().len(), 3);
    }

    #[test]
    fn reference_past_frame_count_fails_and_leaves_manager_unloaded() {
        let mut loader = TableLoader::with(&dir(), "x", &[(8, 8), (8, 8), (8, 8)]);
        let def = assetgrammar::parse("x: { a(10) = [3] }").unwrap();

        let mut assets = AssetManager::new();
        let err = assets.load_definition(&mut loader, &dir(), &def).unwrap_err();
        assert!(matches!(err, AssetError::FrameIndexOutOfRange { index: 3, .. }));
        assert!(!assets.is_loaded());
        assert!(assets.frames().is_empty());
        assert_eq!(assets.animation_set("x").unwrap_err(), LookupError::NotReady);
    }

    #[test]
    fn second_load_is_rejected() {
        let mut loader = TableLoader::with(&dir(), "x", &[(8, 8)]);
        let def = assetgrammar::parse("x: { a(10) = [0] }").unwrap();

        let mut assets = AssetManager::new();
        assets.load_definition(&mut loader, &dir(), &def).unwrap();
        let err = assets.load_definition(&mut loader, &dir(), &def).unwrap_err();
        assert!(matches!(err, AssetError::AlreadyLoaded));
        assert_eq!(assets.frames().len(), 1);
    }

    #[test]
    fn duplicate_asset_does_not_scan_twice() {
        let mut loader = TableLoader::with(&dir(), "x", &[(8, 8)]);
        let def = assetgrammar::parse("x: { } x: { }").unwrap();
        let mut assets = AssetManager::new();
        let err = assets.load_definition(&mut loader, &dir(), &def).unwrap_err();
        assert!(matches!(err, AssetError::DuplicateAsset(_)));
    }

    #[test]
    fn frame_size_resolves_through_sequence() {
        let mut loader = TableLoader::with(&dir(), "x", &[(8, 8), (16, 4)]);
        loader.add(&dir(), "y", &[(2, 2)]);
        let def = assetgrammar::parse("x: { a(10) = [1, 0] } y: { b(5) = [0] }").unwrap();
        let mut assets = AssetManager::new();
        assets.load_definition(&mut loader, &dir(), &def).unwrap();

        assert_eq!(assets.frame_size("x", "a", 0), Ok((16, 4)));
        assert_eq!(assets.frame_size("x", "a", 1), Ok((8, 8)));
        assert_eq!(assets.frame_size("y", "b", 0), Ok((2, 2)));
        assert!(assets.frame_size("x", "a", 2).is_err());
        assert!(assets.frame_size("x", "zzz", 0).is_err());
    }

    #[test]
    fn missing_definition_file_is_reported() {
        let mut loader = TableLoader(FxHashMap::default());
        let mut assets: AssetManager<Fake> = AssetManager::new();
        let err = assets
            .load_assets(&mut loader, "/nonexistent/tilesprite/assets")
            .unwrap_err();
        assert!(matches!(err, AssetError::DefinitionRead { .. }));
        assert!(!assets.is_loaded());
    }
}
