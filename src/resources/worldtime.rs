//! Animation clock.
//!
//! One [`WorldTime`] lives in each scheduler's world. The caller reports
//! real elapsed milliseconds; the clock scales them and exposes the result
//! as the delta every animation advances by during the current tick.

use bevy_ecs::prelude::Resource;

/// Scaled time, in milliseconds.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Sum of every scaled delta so far.
    pub elapsed_ms: f64,
    /// Scaled delta of the current tick.
    pub delta_ms: f64,
    /// Multiplier applied to reported time. `0.0` pauses playback.
    pub time_scale: f64,
}

impl Default for WorldTime {
    fn default() -> Self {
        Self {
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            time_scale: 1.0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Start a new tick of `real_ms` unscaled milliseconds.
    ///
    /// Time never runs backwards: negative, NaN or infinite inputs produce a
    /// zero delta. Returns the scaled delta.
    pub fn advance(&mut self, real_ms: f64) -> f64 {
        let scaled = real_ms * self.time_scale;
        self.delta_ms = if scaled.is_finite() && scaled > 0.0 {
            scaled
        } else {
            0.0
        };
        self.elapsed_ms += self.delta_ms;
        self.delta_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_scales_and_accumulates() {
        let mut time = WorldTime::default().with_time_scale(0.5);
        assert_eq!(time.advance(40.0), 20.0);
        assert_eq!(time.advance(10.0), 5.0);
        assert_eq!(time.elapsed_ms, 25.0);
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut time = WorldTime::default();
        time.advance(16.0);
        assert_eq!(time.advance(-100.0), 0.0);
        assert_eq!(time.advance(f64::NAN), 0.0);
        assert_eq!(time.elapsed_ms, 16.0);
        time.time_scale = -1.0;
        assert_eq!(time.advance(16.0), 0.0);
    }

    #[test]
    fn infinite_delta_is_dropped() {
        let mut time = WorldTime::default();
        assert_eq!(time.advance(f64::INFINITY), 0.0);
        time.time_scale = f64::MAX;
        assert_eq!(time.advance(10.0), 0.0);
        assert_eq!(time.elapsed_ms, 0.0);
    }
}
