//! Scene content built on the orchestrator's [`Stage`](wavescape_kernel::Stage):
//! drawable nodes plus the per-frame callbacks that move them.

mod fence;
mod points;
mod wave;
mod waves;

pub use fence::{Fence, FenceOptions};
pub use points::linear_points;
pub use wave::Wave;
pub use waves::{wave_angle, wave_height, Waves, FENCE_COLOR, FENCE_OPACITY, WAVE_COLOR, WAVE_LENGTH, WAVE_STEP};
