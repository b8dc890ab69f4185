//! Scene orchestrator: assembles camera, surface, scene and controller from a
//! configuration, then drives them through a throttled animation loop.
//!
//! # Invariants
//! - Callbacks run in registration order, once per rendered frame, before the render.
//! - A callback added during a frame first runs on the next rendered frame.
//! - After a resize is processed, camera aspect and surface size match the viewport.
//! - The controller updates every iteration; callbacks and render only when a frame is due.

pub mod animation;
pub mod clock;
mod error;
pub mod headless;
pub mod host;
mod runner;
pub mod surface;
pub mod throttle;
mod world;

pub use animation::{
    AnimationError, AnimationFrame, AnimationId, AnimationRegistry, AnimationReport, AnimationResult,
    Stage,
};
pub use clock::{Clock, ManualTime, MonotonicTime, TimeSource};
pub use error::WorldError;
pub use headless::{HeadlessHost, ManualScheduler};
pub use host::{FrameCallback, FrameRequest, FrameScheduler, Host, HostError, ResizeListener};
pub use runner::WorldHandle;
pub use throttle::FrameThrottle;
pub use world::{FrameOutcome, FrameStats, World};
