use crate::error::WorldError;
use crate::host::Host;
use wavescape_common::RendererSettings;
use wavescape_render::{RenderSurface, ShadowMap};

/// Create the rendering surface and mount it in its container.
///
/// The surface is sized to the host viewport at the display pixel ratio with
/// soft shadow mapping on. A missing container fails the whole build.
pub fn build_surface<H: Host>(settings: &RendererSettings, host: &mut H) -> Result<H::Surface, WorldError> {
    let mut surface = host.create_surface(settings.antialias)?;
    surface.set_pixel_ratio(host.device_pixel_ratio());
    surface.set_size(host.viewport());
    surface.set_shadow_map(ShadowMap::soft());
    host.mount_surface(&settings.container_id, &surface)?;
    tracing::debug!(
        "surface mounted in #{} at {} @{}x",
        settings.container_id,
        surface.size(),
        surface.pixel_ratio()
    );
    Ok(surface)
}
