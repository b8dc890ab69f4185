//! wgpu backend for [`RenderSurface`](wavescape_render::RenderSurface).
//!
//! # Invariants
//! - The surface never mutates the scene; it flattens it into a draw list per frame.
//! - The swapchain is always configured at `size * pixel_ratio` device pixels.

mod gpu;
mod shaders;

pub use gpu::{GpuContext, WgpuSurface};
pub use wgpu;
