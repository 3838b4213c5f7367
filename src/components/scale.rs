use bevy_ecs::prelude::Component;

/// Uniform scale multiplied into a sequence's own scale when drawing.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct Scale(pub f64);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}
