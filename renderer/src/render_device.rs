use anyhow::{Context, Result, bail};
use log::info;

use subpix_text::geometry::SizePx;

/// Per channel coverage is blended with a second fragment output.
const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::DUAL_SOURCE_BLENDING;

/// The device and queue text is rendered with, and the surface format they render to.
#[derive(Debug, Clone)]
pub struct RenderDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub alpha_mode: wgpu::CompositeAlphaMode,
}

impl RenderDevice {
    pub async fn for_surface(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<Self> {
        let adapter = request_adapter(instance, surface).await?;
        info!("Adapter: {:?}", adapter.get_info());

        let capabilities = surface.get_capabilities(&adapter);
        // Coverage is blended linearly, so no srgb.
        let surface_format = capabilities
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or(capabilities.formats.first())
            .copied()
            .context("Surface is incompatible with the adapter")?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        info!("Surface: {surface_format:?}, {alpha_mode:?}");

        let (device, queue) = request_device(&adapter).await?;

        Ok(Self {
            device,
            queue,
            surface_format,
            alpha_mode,
        })
    }

    /// Fails if the device can't create an atlas texture of `size`.
    pub fn check_atlas_size(&self, size: SizePx) -> Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if size.width > max || size.height > max {
            bail!(
                "Atlas of {}x{} exceeds the maximum texture size of {max}",
                size.width,
                size.height
            );
        }
        Ok(())
    }
}

async fn request_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
) -> Result<wgpu::Adapter> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::None,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .context("No GPU adapter can present to the surface")?;

    if !adapter.features().contains(REQUIRED_FEATURES) {
        bail!("GPU adapter lacks {REQUIRED_FEATURES:?}");
    }

    Ok(adapter)
}

async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Subpixel Text Device"),
            required_features: REQUIRED_FEATURES,
            required_limits: adapter.limits(),
            memory_hints: Default::default(),
            trace: Default::default(),
        })
        .await
        .context("Requesting device")
}
