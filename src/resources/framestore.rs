//! Frame store resource.
//!
//! Owns every loaded frame image. Frames are addressed by a [`FrameId`]
//! assigned at insertion from a counter that only grows, so an id handed out
//! once keeps resolving to the same frame for as long as the store lives,
//! regardless of how many frames are inserted afterwards. Sequences in the
//! [`AnimationCatalog`](crate::resources::animationstore::AnimationCatalog)
//! refer to frames only through these ids.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Stable key of a frame inside a [`FrameStore`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameId(u64);

impl FrameId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A decoded image that knows its natural size in pixels.
pub trait Frame {
    fn size(&self) -> (i32, i32);
}

/// Source of frames: "load image at path, or fail".
///
/// Returning `None` is not an error. During asset loading it marks the end
/// of an asset's numbered frame files.
pub trait FrameLoader {
    type Frame: Frame;

    fn load_frame(&mut self, path: &Path) -> Option<Self::Frame>;
}

/// Map of frame ids to loaded frames.
pub struct FrameStore<F> {
    frames: FxHashMap<FrameId, F>,
    next_key: u64,
}

impl<F> Default for FrameStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FrameStore<F> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            frames: FxHashMap::default(),
            next_key: 0,
        }
    }

    /// Take ownership of a frame and return its key.
    pub fn insert(&mut self, frame: F) -> FrameId {
        let id = FrameId(self.next_key);
        self.next_key += 1;
        self.frames.insert(id, frame);
        id
    }

    pub fn get(&self, id: FrameId) -> Option<&F> {
        self.frames.get(&id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<F: Frame> FrameStore<F> {
    /// Natural size of a stored frame.
    pub fn frame_size(&self, id: FrameId) -> Option<(i32, i32)> {
        self.get(id).map(Frame::size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(i32);

    impl Frame for Dummy {
        fn size(&self) -> (i32, i32) {
            (self.0, self.0 * 2)
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut store = FrameStore::new();
        let a = store.insert(Dummy(1));
        let b = store.insert(Dummy(2));
        assert!(a < b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn earlier_ids_survive_growth() {
        let mut store = FrameStore::new();
        let first = store.insert(Dummy(7));
        for i in 0..1000 {
            store.insert(Dummy(i));
        }
        assert_eq!(store.frame_size(first), Some((7, 14)));
    }

    #[test]
    fn unknown_id_is_none() {
        let mut other = FrameStore::new();
        let id = other.insert(Dummy(1));
        other.insert(Dummy(1));
        let store: FrameStore<Dummy> = FrameStore::new();
        assert!(store.get(id).is_none());
        assert!(store.is_empty());
    }
}
