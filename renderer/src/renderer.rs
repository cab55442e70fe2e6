use std::result;

use log::warn;
use wgpu::{PresentMode, StoreOp, SurfaceTexture};

use crate::{RenderDevice, SubpixelTextRenderer};

const DESIRED_MAXIMUM_FRAME_LATENCY: u32 = 1;

/// Owns the surface and renders text into it.
#[derive(Debug)]
pub struct Renderer {
    pub device: RenderDevice,
    surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl Renderer {
    /// Creates a new renderer and configures the surface.
    pub fn new(
        device: RenderDevice,
        surface: wgpu::Surface<'static>,
        initial_size: (u32, u32),
    ) -> Self {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: device.surface_format,
            width: initial_size.0.max(1),
            height: initial_size.1.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode: device.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: DESIRED_MAXIMUM_FRAME_LATENCY,
        };

        let renderer = Self {
            device,
            surface,
            surface_config,
        };
        renderer.reconfigure_surface();
        renderer
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Zero sizes, as reported for minimized windows, are ignored.
    pub fn resize(&mut self, (width, height): (u32, u32)) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure_surface();
    }

    pub fn reconfigure_surface(&self) {
        self.surface.configure(&self.device.device, &self.surface_config);
    }

    /// In any VSync mode, this blocks until the current frame is presented.
    pub fn get_current_texture(&mut self) -> result::Result<SurfaceTexture, wgpu::SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(e) => {
                // Try to reconfigure and re-acquire once when the surface is lost.
                warn!("Surface error: {e:?}, retrying...");
                self.reconfigure_surface();
                self.surface.get_current_texture()
            }
        }
    }

    /// Clears to `background` and draws the prepared text.
    #[tracing::instrument(skip_all)]
    pub fn render_and_present(
        &self,
        text_renderer: &SubpixelTextRenderer,
        background: [f32; 3],
        surface_texture: SurfaceTexture,
    ) {
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.device
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        {
            let [r, g, b] = background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as _,
                            g: g as _,
                            b: b as _,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            text_renderer.render(&mut pass);
        }

        self.device.queue.submit([encoder.finish()]);
        surface_texture.present();
    }
}
