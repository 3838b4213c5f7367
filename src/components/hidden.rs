use bevy_ecs::prelude::Component;

/// Marker for animations that keep advancing but are skipped when compositing.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Hidden;
