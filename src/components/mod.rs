//! ECS components for animations.
//!
//! Every animation registered with the
//! [`AnimationScheduler`](crate::scheduler::AnimationScheduler) is an entity
//! carrying these components.
//!
//! Submodules overview:
//! - [`animation`] – playback cursor over one sequence
//! - [`hidden`] – marker that skips an animation when compositing
//! - [`mapposition`] – world-space position
//! - [`scale`] – uniform scale factor
//! - [`zindex`] – rendering order and registration order

pub mod animation;
pub mod hidden;
pub mod mapposition;
pub mod scale;
pub mod zindex;
