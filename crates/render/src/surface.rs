use crate::camera::PerspectiveCamera;
use crate::scene::SceneGraph;
use wavescape_common::Viewport;

/// Errors a surface can report while drawing a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost; it will be reconfigured on the next frame")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Shadow map filtering quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowFilter {
    Basic,
    Pcf,
    PcfSoft,
}

/// Shadow mapping configuration of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMap {
    pub enabled: bool,
    pub filter: ShadowFilter,
}

impl ShadowMap {
    /// Enabled with soft percentage-closer filtering.
    pub const fn soft() -> Self {
        Self {
            enabled: true,
            filter: ShadowFilter::PcfSoft,
        }
    }
}

impl Default for ShadowMap {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: ShadowFilter::Pcf,
        }
    }
}

/// A drawing target bound to one host container.
///
/// The orchestrator owns exactly one surface and is the only caller of
/// [`set_size`](RenderSurface::set_size); after a resize is processed the
/// surface size equals the viewport.
pub trait RenderSurface {
    fn set_pixel_ratio(&mut self, ratio: f64);

    fn pixel_ratio(&self) -> f64;

    /// Resize to `size` logical pixels; the backing store becomes
    /// `size * pixel_ratio` device pixels.
    fn set_size(&mut self, size: Viewport);

    /// Current size in logical pixels.
    fn size(&self) -> Viewport;

    fn set_shadow_map(&mut self, shadow_map: ShadowMap);

    fn shadow_map(&self) -> ShadowMap;

    /// Draw one frame of `scene` as seen from `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError>;

    /// Size of the backing store in device pixels.
    fn physical_size(&self) -> Viewport {
        let size = self.size();
        let ratio = self.pixel_ratio();
        Viewport::new(
            (f64::from(size.width) * ratio).round() as u32,
            (f64::from(size.height) * ratio).round() as u32,
        )
    }
}
