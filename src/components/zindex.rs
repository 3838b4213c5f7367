//! Z-index component for render ordering.
//!
//! The [`ZIndex`] component controls the drawing order of animations.
//! Entities with higher z-index values are drawn on top of those with lower
//! values. [`SpawnOrder`] breaks ties so equal layers draw in the same order
//! on every pass.

use bevy_ecs::prelude::Component;

/// Rendering order hint for 2D drawing.
///
/// Higher values are drawn later (on top).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);

/// Registration counter value, assigned once per animation.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnOrder(pub u64);
