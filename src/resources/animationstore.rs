//! Animation catalog.
//!
//! The catalog maps asset names to [`AnimationSet`]s, and each set maps
//! sequence names to [`AnimationSequence`]s. Sequences reference frames by
//! [`FrameId`] into the [`FrameStore`](crate::resources::framestore::FrameStore)
//! filled during the same load, so the catalog itself holds no image data.
//!
//! The catalog is built once by
//! [`AssetManager::load_assets`](crate::resources::assetmanager::AssetManager::load_assets)
//! and never mutated afterwards. Sets are kept behind [`Arc`] so live
//! animations can hold on to the set they play from.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::assetgrammar::{AssetDecl, AssetDefinition, FrameRef, SequenceDecl};
use crate::error::{AssetError, LookupError};
use crate::resources::framestore::FrameId;

/// One step of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SequenceFrame {
    pub frame: FrameId,
    /// Position of the frame in its asset's frame list (`<asset>_<index>.png`).
    pub index: usize,
    /// Pixel offset applied when this step is drawn.
    pub offset: (i32, i32),
}

/// A named, timed list of frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSequence {
    frames: Vec<SequenceFrame>,
    interval_ms: f64,
    scale: f64,
}

impl AnimationSequence {
    pub fn new(frames: Vec<SequenceFrame>, interval_ms: f64, scale: f64) -> Self {
        Self {
            frames,
            interval_ms,
            scale,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time each frame stays on screen, in milliseconds.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Base scale inherited from the asset declaration.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn frame(&self, index: usize) -> Option<&SequenceFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[SequenceFrame] {
        &self.frames
    }
}

/// All sequences declared under one asset name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSet {
    name: String,
    scale: f64,
    frame_count: usize,
    sequences: FxHashMap<String, AnimationSequence>,
}

impl AnimationSet {
    /// Build a set from its declaration and the frames loaded for the asset.
    ///
    /// `frames[i]` must be the id of `<asset>_<i>.png`. Every index used by
    /// a sequence is checked against `frames.len()`.
    pub fn from_decl(decl: &AssetDecl, frames: &[FrameId]) -> Result<Self, AssetError> {
        let scale = decl.effective_scale();
        let mut sequences =
            FxHashMap::with_capacity_and_hasher(decl.sequences.len(), Default::default());

        for seq in &decl.sequences {
            if sequences.contains_key(&seq.name) {
                return Err(AssetError::DuplicateSequence {
                    asset: decl.name.clone(),
                    sequence: seq.name.clone(),
                });
            }
            let steps = seq
                .frames
                .iter()
                .map(|r| {
                    let frame =
                        frames
                            .get(r.index)
                            .copied()
                            .ok_or_else(|| AssetError::FrameIndexOutOfRange {
                                asset: decl.name.clone(),
                                sequence: seq.name.clone(),
                                index: r.index,
                                frame_count: frames.len(),
                            })?;
                    Ok(SequenceFrame {
                        frame,
                        index: r.index,
                        offset: r.resolved_offset(),
                    })
                })
                .collect::<Result<Vec<_>, AssetError>>()?;

            log::debug!(
                "sequence {}::{} has {} frames at {} ms",
                decl.name,
                seq.name,
                steps.len(),
                seq.interval_ms
            );
            sequences.insert(
                seq.name.clone(),
                AnimationSequence::new(steps, seq.interval_ms, scale),
            );
        }

        Ok(Self {
            name: decl.name.clone(),
            scale,
            frame_count: frames.len(),
            sequences,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of frame files found for the asset.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn sequence(&self, name: &str) -> Result<&AnimationSequence, LookupError> {
        self.sequences
            .get(name)
            .ok_or_else(|| LookupError::UnknownSequence {
                asset: self.name.clone(),
                sequence: name.to_string(),
            })
    }

    pub fn sequence_length(&self, name: &str) -> Result<usize, LookupError> {
        self.sequence(name).map(AnimationSequence::len)
    }

    pub fn sequence_interval(&self, name: &str) -> Result<f64, LookupError> {
        self.sequence(name).map(AnimationSequence::interval_ms)
    }

    pub fn has_sequence(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    /// Declaration that reproduces this set. Sequences are sorted by name.
    pub fn to_decl(&self) -> AssetDecl {
        let mut names: Vec<&String> = self.sequences.keys().collect();
        names.sort();
        let sequences = names
            .into_iter()
            .map(|name| {
                let seq = &self.sequences[name];
                SequenceDecl {
                    name: name.clone(),
                    interval_ms: seq.interval_ms,
                    frames: seq
                        .frames
                        .iter()
                        .map(|f| FrameRef {
                            index: f.index,
                            offset: (f.offset != (0, 0)).then_some(f.offset),
                        })
                        .collect(),
                }
            })
            .collect();
        AssetDecl {
            name: self.name.clone(),
            scale: Some(self.scale),
            sequences,
        }
    }
}

/// Every [`AnimationSet`] keyed by asset name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnimationCatalog {
    sets: FxHashMap<String, Arc<AnimationSet>>,
}

impl AnimationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set. Asset names are unique.
    pub fn insert(&mut self, set: AnimationSet) -> Result<(), AssetError> {
        if self.sets.contains_key(set.name()) {
            return Err(AssetError::DuplicateAsset(set.name().to_string()));
        }
        self.sets.insert(set.name().to_string(), Arc::new(set));
        Ok(())
    }

    pub fn get(&self, asset: &str) -> Result<&Arc<AnimationSet>, LookupError> {
        self.sets
            .get(asset)
            .ok_or_else(|| LookupError::UnknownAsset(asset.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<AnimationSet>)> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Definition that reproduces this catalog. Assets are sorted by name.
    pub fn to_definition(&self) -> AssetDefinition {
        let mut sets: Vec<&Arc<AnimationSet>> = self.sets.values().collect();
        sets.sort_by(|a, b| a.name().cmp(b.name()));
        AssetDefinition {
            assets: sets.into_iter().map(|s| s.to_decl()).collect(),
        }
    }
}
