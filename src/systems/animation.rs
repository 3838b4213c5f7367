//! Animation system.
//!
//! [`advance_animations`] is the only place frame indices change over time.
//! Each [`Animation`] accumulates the tick's delta and steps once per full
//! interval of its active sequence. Nothing is drawn here; see
//! [`crate::systems::render`] for that.
//!
//! # Related
//!
//! - [`crate::components::animation::Animation`] – per-entity playback state
//! - [`crate::resources::worldtime::WorldTime`] – the delta being applied

use bevy_ecs::prelude::*;

use crate::components::animation::Animation;
use crate::resources::worldtime::WorldTime;

/// Advance every animation by the current [`WorldTime`] delta.
pub fn advance_animations(mut query: Query<&mut Animation>, time: Res<WorldTime>) {
    if time.delta_ms <= 0.0 {
        return;
    }
    for mut anim in query.iter_mut() {
        anim.advance(time.delta_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::assetgrammar::parse;
    use crate::resources::animationstore::AnimationSet;
    use crate::resources::framestore::FrameStore;
    use crate::systems::time::update_world_time;

    fn run(world: &mut World, dt_ms: f64) {
        update_world_time(world, dt_ms);
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_animations);
        schedule.run(world);
    }

    fn set() -> Arc<AnimationSet> {
        let def = parse("a: { fast(10) = [0, 1] slow(40) = [0, 1, 2] }").unwrap();
        let mut store = FrameStore::new();
        let ids: Vec<_> = (0..3).map(|_| store.insert(())).collect();
        Arc::new(AnimationSet::from_decl(&def.assets[0], &ids).unwrap())
    }

    #[test]
    fn each_animation_uses_its_own_interval() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let fast = world.spawn(Animation::new(set(), "fast").unwrap()).id();
        let slow = world.spawn(Animation::new(set(), "slow").unwrap()).id();

        run(&mut world, 10.0);
        assert_eq!(world.get::<Animation>(fast).unwrap().frame_index, 1);
        assert_eq!(world.get::<Animation>(slow).unwrap().frame_index, 0);

        run(&mut world, 30.0);
        assert_eq!(world.get::<Animation>(fast).unwrap().frame_index, 0);
        assert_eq!(world.get::<Animation>(slow).unwrap().frame_index, 1);
    }

    #[test]
    fn time_scale_slows_playback() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(0.5));
        let e = world.spawn(Animation::new(set(), "fast").unwrap()).id();

        run(&mut world, 10.0);
        assert_eq!(world.get::<Animation>(e).unwrap().frame_index, 0);
        run(&mut world, 10.0);
        assert_eq!(world.get::<Animation>(e).unwrap().frame_index, 1);
        assert_eq!(world.resource::<WorldTime>().elapsed_ms, 10.0);
    }
}
