use std::sync::Arc;

use bevy_ecs::prelude::Component;

use crate::error::LookupError;
use crate::resources::animationstore::{AnimationSequence, AnimationSet, SequenceFrame};

/// Playback cursor over one sequence of an [`AnimationSet`].
///
/// Length and interval are cached when a sequence is activated. Time is
/// accumulated in `elapsed_ms` and every full interval advances the frame
/// by one, wrapping at the end of the sequence.
#[derive(Debug, Clone, Component)]
pub struct Animation {
    set: Arc<AnimationSet>,
    sequence: String,
    pub frame_index: usize,
    length: usize,
    interval_ms: f64,
    pub elapsed_ms: f64,
}

impl Animation {
    pub fn new(set: Arc<AnimationSet>, sequence: impl Into<String>) -> Result<Self, LookupError> {
        let sequence = sequence.into();
        let (length, interval_ms) = {
            let seq = set.sequence(&sequence)?;
            (seq.len(), seq.interval_ms())
        };
        Ok(Self {
            set,
            sequence,
            frame_index: 0,
            length,
            interval_ms,
            elapsed_ms: 0.0,
        })
    }

    /// Make another sequence of the same set active.
    ///
    /// The new interval applies right away; frame and accumulated time start
    /// over. On error the current sequence keeps playing.
    pub fn switch_to(&mut self, sequence: &str) -> Result<(), LookupError> {
        let seq = self.set.sequence(sequence)?;
        self.length = seq.len();
        self.interval_ms = seq.interval_ms();
        self.sequence = sequence.to_string();
        self.frame_index = 0;
        self.elapsed_ms = 0.0;
        Ok(())
    }

    /// Add elapsed time and step the frame for every full interval.
    ///
    /// Returns how many steps were taken. Sequences with a non-positive
    /// interval hold their first frame. Non-finite or non-positive deltas are
    /// ignored. The catch-up is computed in one go, so a huge delta costs the
    /// same as a small one.
    pub fn advance(&mut self, delta_ms: f64) -> usize {
        let running = self.length > 0 && self.interval_ms > 0.0;
        if !running || !delta_ms.is_finite() || delta_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms < self.interval_ms {
            return 0;
        }
        let steps = (self.elapsed_ms / self.interval_ms).floor();
        self.elapsed_ms %= self.interval_ms;
        let wrapped = (steps % self.length as f64) as usize;
        self.frame_index = (self.frame_index + wrapped) % self.length;
        steps as usize
    }

    pub fn set(&self) -> &Arc<AnimationSet> {
        &self.set
    }

    pub fn sequence_name(&self) -> &str {
        &self.sequence
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn sequence(&self) -> Option<&AnimationSequence> {
        self.set.sequence(&self.sequence).ok()
    }

    /// The sequence step that should be on screen now.
    pub fn current_frame(&self) -> Option<&SequenceFrame> {
        self.sequence()?.frame(self.frame_index)
    }

    /// A cursor over the same sequence, back at its first frame.
    pub fn restarted(&self) -> Self {
        Self {
            frame_index: 0,
            elapsed_ms: 0.0,
            ..self.clone()
        }
    }
}
