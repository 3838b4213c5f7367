//! Animation scheduler.
//!
//! [`AnimationScheduler`] is the registry of live animations. Every
//! animation is an entity in a private ECS world holding an
//! [`Animation`], [`MapPosition`], [`ZIndex`], [`Scale`] and [`SpawnOrder`].
//!
//! The main loop drives it with two calls per frame:
//! 1. [`tick`](AnimationScheduler::tick) advances all animations by the
//!    elapsed milliseconds
//! 2. [`composite`](AnimationScheduler::composite) draws them in z order
//!
//! Both run on the caller's thread, so frame indices are never read and
//! written concurrently. Several schedulers can coexist; handles only mean
//! something to the scheduler that issued them.
//!
//! A [`SpriteHandle`] owns its animation. Dropping it queues the entity on a
//! channel back to the scheduler, which despawns everything queued at the
//! start of the next `tick` or `composite`.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::debug;

use crate::components::animation::Animation;
use crate::components::hidden::Hidden;
use crate::components::mapposition::MapPosition;
use crate::components::scale::Scale;
use crate::components::zindex::{SpawnOrder, ZIndex};
use crate::error::LookupError;
use crate::resources::animationstore::AnimationSet;
use crate::resources::camera2d::Camera;
use crate::resources::framestore::{Frame, FrameStore};
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::advance_animations;
use crate::systems::render::{Canvas, composite_pass, scaled_size};
use crate::systems::time::update_world_time;

/// Owning reference to one registered animation.
///
/// Not `Clone`: use [`AnimationScheduler::spawn`] to get an independent
/// copy. [`AnimationScheduler::deregister`] removes the animation right away;
/// dropping the handle removes it on the scheduler's next pass.
#[derive(Debug)]
#[must_use = "dropping the handle removes its animation"]
pub struct SpriteHandle {
    entity: Entity,
    release: Option<Sender<Entity>>,
}

impl SpriteHandle {
    fn issued_by(&self, released_tx: &Sender<Entity>) -> bool {
        self.release
            .as_ref()
            .is_some_and(|tx| tx.same_channel(released_tx))
    }
}

impl PartialEq for SpriteHandle {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl Eq for SpriteHandle {}

impl Hash for SpriteHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
    }
}

impl Drop for SpriteHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.release.take() {
            // The scheduler may already be gone.
            let _ = tx.send(self.entity);
        }
    }
}

/// Where and how a new animation is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub z_layer: i32,
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            z_layer: 0,
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_z(mut self, z_layer: i32) -> Self {
        self.z_layer = z_layer;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Registry and driver of live animations.
pub struct AnimationScheduler {
    world: World,
    update: Schedule,
    next_order: u64,
    live: usize,
    released_tx: Sender<Entity>,
    released_rx: Receiver<Entity>,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationScheduler {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let mut update = Schedule::default();
        update.add_systems(advance_animations);
        let (released_tx, released_rx) = crossbeam_channel::unbounded();
        Self {
            world,
            update,
            next_order: 0,
            live: 0,
            released_tx,
            released_rx,
        }
    }

    /// Start playing `sequence` of `set` at `placement`.
    pub fn register(
        &mut self,
        set: Arc<AnimationSet>,
        sequence: &str,
        placement: Placement,
    ) -> Result<SpriteHandle, LookupError> {
        let animation = Animation::new(set, sequence)?;
        Ok(self.insert(animation, placement))
    }

    /// Register a copy of `source` with the same sequence and placement.
    ///
    /// The copy has its own timing and starts at the first frame.
    pub fn spawn(&mut self, source: &SpriteHandle) -> Result<SpriteHandle, LookupError> {
        if !source.issued_by(&self.released_tx) {
            return Err(LookupError::UnknownInstance);
        }
        let entity = self.world.get_entity(source.entity).ok();
        let (animation, placement) = entity
            .and_then(|e| {
                let anim = e.get::<Animation>()?;
                let pos = e.get::<MapPosition>()?;
                let z = e.get::<ZIndex>()?;
                let scale = e.get::<Scale>()?;
                Some((
                    anim.restarted(),
                    Placement {
                        x: pos.x,
                        y: pos.y,
                        z_layer: z.0,
                        scale: scale.0,
                    },
                ))
            })
            .ok_or(LookupError::UnknownInstance)?;
        Ok(self.insert(animation, placement))
    }

    fn insert(&mut self, animation: Animation, placement: Placement) -> SpriteHandle {
        let order = SpawnOrder(self.next_order);
        self.next_order += 1;
        debug!(
            "register {}::{} at ({}, {}) z={}",
            animation.set().name(),
            animation.sequence_name(),
            placement.x,
            placement.y,
            placement.z_layer
        );
        let entity = self
            .world
            .spawn((
                animation,
                MapPosition::new(placement.x, placement.y),
                ZIndex(placement.z_layer),
                Scale(placement.scale),
                order,
            ))
            .id();
        self.live += 1;
        SpriteHandle {
            entity,
            release: Some(self.released_tx.clone()),
        }
    }

    /// Remove an animation. Returns false if it was not registered here.
    pub fn deregister(&mut self, mut handle: SpriteHandle) -> bool {
        if !handle.issued_by(&self.released_tx) {
            return false;
        }
        handle.release = None;
        self.despawn(handle.entity)
    }

    fn despawn(&mut self, entity: Entity) -> bool {
        match self.world.get_entity_mut(entity) {
            Ok(entity) => {
                entity.despawn();
                self.live -= 1;
                true
            }
            Err(_) => false,
        }
    }

    /// Despawn the animations of every handle dropped since the last pass.
    fn flush_released(&mut self) {
        let released: Vec<Entity> = self.released_rx.try_iter().collect();
        for entity in released {
            debug!("release dropped sprite {entity:?}");
            self.despawn(entity);
        }
    }

    pub fn contains(&self, handle: &SpriteHandle) -> bool {
        handle.issued_by(&self.released_tx) && self.world.get::<Animation>(handle.entity).is_some()
    }

    /// Number of registered animations whose handles are still alive.
    pub fn len(&self) -> usize {
        self.live.saturating_sub(self.released_rx.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance every animation by `delta_ms` milliseconds.
    pub fn tick(&mut self, delta_ms: f64) {
        self.flush_released();
        update_world_time(&mut self.world, delta_ms);
        self.update.run(&mut self.world);
    }

    /// Total milliseconds ticked so far.
    pub fn elapsed_ms(&self) -> f64 {
        self.world.resource::<WorldTime>().elapsed_ms
    }

    pub fn set_time_scale(&mut self, time_scale: f64) {
        self.world.resource_mut::<WorldTime>().time_scale = time_scale;
    }

    /// Draw every visible animation through `canvas`, lowest z-layer first.
    pub fn composite<F, C>(&mut self, camera: &Camera, frames: &FrameStore<F>, canvas: &mut C) -> usize
    where
        F: Frame,
        C: Canvas<F>,
    {
        self.flush_released();
        composite_pass(&mut self.world, camera, frames, canvas)
    }

    pub fn animation(&self, handle: &SpriteHandle) -> Result<&Animation, LookupError> {
        self.component::<Animation>(handle)
    }

    pub fn frame_index(&self, handle: &SpriteHandle) -> Result<usize, LookupError> {
        self.animation(handle).map(|a| a.frame_index)
    }

    pub fn sequence_name(&self, handle: &SpriteHandle) -> Result<&str, LookupError> {
        self.animation(handle).map(Animation::sequence_name)
    }

    /// Switch to another sequence of the same asset, from its first frame.
    pub fn set_sequence(&mut self, handle: &SpriteHandle, sequence: &str) -> Result<(), LookupError> {
        self.component_mut::<Animation>(handle)?.switch_to(sequence)
    }

    pub fn position(&self, handle: &SpriteHandle) -> Result<(i32, i32), LookupError> {
        self.component::<MapPosition>(handle).map(|p| (p.x, p.y))
    }

    pub fn set_position(&mut self, handle: &SpriteHandle, x: i32, y: i32) -> Result<(), LookupError> {
        *self.component_mut::<MapPosition>(handle)? = MapPosition::new(x, y);
        Ok(())
    }

    /// Shift by a relative amount and return the new position.
    pub fn move_by(&mut self, handle: &SpriteHandle, dx: i32, dy: i32) -> Result<(i32, i32), LookupError> {
        let mut pos = self.component_mut::<MapPosition>(handle)?;
        pos.x += dx;
        pos.y += dy;
        Ok((pos.x, pos.y))
    }

    pub fn z_layer(&self, handle: &SpriteHandle) -> Result<i32, LookupError> {
        self.component::<ZIndex>(handle).map(|z| z.0)
    }

    pub fn set_z_layer(&mut self, handle: &SpriteHandle, z_layer: i32) -> Result<(), LookupError> {
        self.component_mut::<ZIndex>(handle)?.0 = z_layer;
        Ok(())
    }

    pub fn scale(&self, handle: &SpriteHandle) -> Result<f64, LookupError> {
        self.component::<Scale>(handle).map(|s| s.0)
    }

    pub fn set_scale(&mut self, handle: &SpriteHandle, scale: f64) -> Result<(), LookupError> {
        self.component_mut::<Scale>(handle)?.0 = scale;
        Ok(())
    }

    pub fn is_hidden(&self, handle: &SpriteHandle) -> Result<bool, LookupError> {
        self.animation(handle)?;
        Ok(self.world.get::<Hidden>(handle.entity).is_some())
    }

    /// Hidden animations keep advancing but are not composited.
    pub fn set_hidden(&mut self, handle: &SpriteHandle, hidden: bool) -> Result<(), LookupError> {
        self.animation(handle)?;
        let mut entity = self
            .world
            .get_entity_mut(handle.entity)
            .map_err(|_| LookupError::UnknownInstance)?;
        if hidden {
            entity.insert(Hidden);
        } else {
            entity.remove::<Hidden>();
        }
        Ok(())
    }

    /// Size of the current frame after sequence and instance scale.
    pub fn scaled_size<F: Frame>(
        &self,
        handle: &SpriteHandle,
        frames: &FrameStore<F>,
    ) -> Result<(i32, i32), LookupError> {
        let anim = self.animation(handle)?;
        let scale = self.scale(handle)?;
        let seq = anim.sequence().ok_or_else(|| LookupError::UnknownSequence {
            asset: anim.set().name().to_string(),
            sequence: anim.sequence_name().to_string(),
        })?;
        let natural = seq
            .frame(anim.frame_index)
            .and_then(|f| frames.frame_size(f.frame))
            .ok_or_else(|| LookupError::UnknownFrame {
                sequence: anim.sequence_name().to_string(),
                frame: anim.frame_index,
            })?;
        Ok(scaled_size(natural, seq.scale() * scale))
    }

    fn component<T: Component>(&self, handle: &SpriteHandle) -> Result<&T, LookupError> {
        if !handle.issued_by(&self.released_tx) {
            return Err(LookupError::UnknownInstance);
        }
        self.world
            .get::<T>(handle.entity)
            .ok_or(LookupError::UnknownInstance)
    }

    fn component_mut<T: Component<Mutability = bevy_ecs::component::Mutable>>(
        &mut self,
        handle: &SpriteHandle,
    ) -> Result<Mut<'_, T>, LookupError> {
        if !handle.issued_by(&self.released_tx) {
            return Err(LookupError::UnknownInstance);
        }
        self.world
            .get_mut::<T>(handle.entity)
            .ok_or(LookupError::UnknownInstance)
    }
}
