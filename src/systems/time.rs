//! Clock step run before the animation schedule.
//!
//! The scheduler calls [`update_world_time`] directly rather than through a
//! system so the delta is in place before any system reads it.
use bevy_ecs::prelude::*;
use log::trace;

use crate::resources::worldtime::WorldTime;

/// Feed `dt_ms` real milliseconds into the world's [`WorldTime`].
///
/// Does nothing if the world has no clock.
pub fn update_world_time(world: &mut World, dt_ms: f64) {
    let Some(mut time) = world.get_resource_mut::<WorldTime>() else {
        return;
    };
    let scaled = time.advance(dt_ms);
    trace!("tick {dt_ms} ms -> {scaled} ms (elapsed {})", time.elapsed_ms);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_the_world_clock() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(2.0));
        update_world_time(&mut world, 8.0);
        let time = world.resource::<WorldTime>();
        assert_eq!((time.delta_ms, time.elapsed_ms), (16.0, 16.0));
    }

    #[test]
    fn world_without_clock_is_left_alone() {
        let mut world = World::new();
        update_world_time(&mut world, 8.0);
        assert!(world.get_resource::<WorldTime>().is_none());
    }
}
