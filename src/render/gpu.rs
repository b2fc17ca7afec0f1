use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

/// Highest pixel density the surface will render at. Backdrop rendering is
/// decorative; above 2x the extra fragments cost real battery for no visible
/// gain.
const MAX_PIXEL_RATIO: f64 = 2.0;

/// Minimal GPU context wrapper:
/// - Owns `wgpu::Instance`, `wgpu::Adapter`, `wgpu::Device`, `wgpu::Queue`
/// - Owns the window `Surface` and the current `SurfaceConfiguration`
///
/// This is the shared foundation for the backdrop renderer. Creation is the
/// one startup precondition that can fail (no adapter, no surface); callers
/// treat that as "backdrop unavailable" and skip the whole animation setup.
pub struct Gpu {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    /// The surface is tied to the window.
    pub surface: wgpu::Surface<'static>,
    pub surface_format: wgpu::TextureFormat,

    pub size: winit::dpi::PhysicalSize<u32>,
    pub config: wgpu::SurfaceConfiguration,

    /// Factor (<= 1.0) applied to incoming physical sizes to honor
    /// `MAX_PIXEL_RATIO` on very dense displays.
    density_scale: f64,
}

impl Gpu {
    /// Create a GPU context for the given window.
    ///
    /// Notes:
    /// - Chooses the first surface format from surface capabilities.
    /// - Configures the surface immediately, capped at 2x pixel density.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: None,
                ..Default::default()
            })
            .await
            .context("wgpu: failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .context("wgpu: failed to request device")?;

        let scale_factor = window.scale_factor();
        let density_scale = (MAX_PIXEL_RATIO / scale_factor).min(1.0);
        let size = scale_physical(window.inner_size(), density_scale);

        // Create a 'static surface by cloning the Arc<Window>.
        // This is safe because the surface must not outlive the window; we
        // keep the window alive elsewhere in the app state.
        let surface = instance
            .create_surface(window)
            .context("wgpu: failed to create surface")?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .first()
            .copied()
            .context("wgpu: surface reported no supported formats")?;

        let config = Self::make_surface_config(size, surface_format);

        surface.configure(&device, &config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_format,
            size,
            config,
            density_scale,
        })
    }

    /// Reconfigure the surface for a new (physical) window size.
    ///
    /// You should call this on `WindowEvent::Resized`.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        let new_size = scale_physical(new_size, self.density_scale);

        // Avoid configuring 0-sized surfaces; winit can report 0 during minimize.
        if new_size.width == 0 || new_size.height == 0 {
            self.size = new_size;
            self.config.width = 0;
            self.config.height = 0;
            return;
        }

        self.size = new_size;
        self.config = Self::make_surface_config(new_size, self.surface_format);
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-apply the current surface configuration.
    ///
    /// Used after transient surface errors (`Outdated`/`Lost`) where the size
    /// has not changed but the swapchain needs rebuilding.
    pub fn reconfigure(&self) {
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Acquire the next frame from the surface.
    ///
    /// Returns the surface texture and its view in the SRGB view format.
    ///
    /// Surface acquisition can fail transiently (e.g. during resize) with
    /// `wgpu::SurfaceError`; we return it explicitly so callers can decide
    /// whether to reconfigure, skip the frame, or give up.
    pub fn acquire_frame(
        &self,
    ) -> Result<(wgpu::SurfaceTexture, wgpu::TextureView), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;

        // Use SRGB view for correct color-space when the surface supports it.
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.surface_format.add_srgb_suffix()),
                ..Default::default()
            });

        Ok((surface_texture, view))
    }

    fn make_surface_config(
        size: winit::dpi::PhysicalSize<u32>,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            // We render into SRGB view format for correct gamma.
            view_formats: vec![surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: size.width,
            height: size.height,
            desired_maximum_frame_latency: 2,
            // One tick per display refresh; the animation derives everything
            // from elapsed time, so missed frames are harmless.
            present_mode: wgpu::PresentMode::AutoVsync,
        }
    }
}

fn scale_physical(
    size: winit::dpi::PhysicalSize<u32>,
    factor: f64,
) -> winit::dpi::PhysicalSize<u32> {
    if factor >= 1.0 {
        return size;
    }
    winit::dpi::PhysicalSize::new(
        (size.width as f64 * factor).round() as u32,
        (size.height as f64 * factor).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_scale_leaves_standard_displays_alone() {
        let size = winit::dpi::PhysicalSize::new(1920, 1080);
        assert_eq!(scale_physical(size, 1.0), size);
    }

    #[test]
    fn density_scale_caps_dense_displays() {
        // A 3x display gets scaled down to an effective 2x.
        let factor = MAX_PIXEL_RATIO / 3.0;
        let scaled = scale_physical(winit::dpi::PhysicalSize::new(3000, 1500), factor);
        assert_eq!(scaled, winit::dpi::PhysicalSize::new(2000, 1000));
    }
}
