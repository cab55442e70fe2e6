use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use subpix_renderer::{AtlasTexture, RenderDevice, Renderer, SubpixelTextRenderer};
use subpix_text::{
    FrameBatches, append_text,
    config::TextConfig,
    font::{FontBackend, SwashFont},
    glyph::{AtlasAllocator, GlyphAtlas},
};

/// Renders the configured text into a single window until it is closed.
pub struct TextWindowApplication {
    config: TextConfig,
    font: SwashFont,
    window: Option<TextWindow>,
    /// The first fatal error, ends the event loop.
    error: Option<anyhow::Error>,
}

struct TextWindow {
    window: Arc<Window>,
    renderer: Renderer,
    atlas: GlyphAtlas<AtlasTexture, Box<dyn AtlasAllocator>>,
    text_renderer: SubpixelTextRenderer,
    frame: FrameBatches,
}

impl TextWindowApplication {
    pub fn new(config: TextConfig, font: SwashFont) -> Self {
        Self {
            config,
            font,
            window: None,
            error: None,
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:?}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<TextWindow> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("Creating surface")?;
        let device = futures::executor::block_on(RenderDevice::for_surface(&instance, &surface))?;

        let allocator = self.config.atlas.create_allocator()?;
        device.check_atlas_size(self.config.atlas.size())?;
        let atlas_texture = AtlasTexture::new(&device.device, &device.queue, self.config.atlas.size());
        let text_renderer =
            SubpixelTextRenderer::new(&device.device, device.surface_format, &atlas_texture);
        let atlas = GlyphAtlas::new(atlas_texture, allocator);

        let size = window.inner_size();
        let renderer = Renderer::new(device, surface, (size.width, size.height));

        Ok(TextWindow {
            window,
            renderer,
            atlas,
            text_renderer,
            frame: FrameBatches::new(self.config.batch_capacity),
        })
    }

    #[tracing::instrument(skip_all)]
    fn redraw(&mut self) -> Result<()> {
        let Some(window) = &mut self.window else {
            return Ok(());
        };
        let config = &self.config;
        let font_scale = self.font.scale_for_em_to_pixels(config.font_size_px());

        window.frame.clear();
        append_text(
            &mut self.font,
            &mut window.atlas,
            &mut window.frame,
            config.text.as_bytes(),
            config.origin(),
            font_scale,
            config.text_color,
        )?;
        debug!("Atlas: {:?}", window.atlas.stats());

        let renderer = &mut window.renderer;
        window.text_renderer.prepare(
            &renderer.device.device,
            &renderer.device.queue,
            renderer.surface_size(),
            config.coverage_adjustment,
            window.frame.batches(),
        );

        let surface_texture = match renderer.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => match SurfaceErrorAction::for_error(&e) {
                SurfaceErrorAction::Fail => {
                    return Err(anyhow!("Acquiring the surface texture failed: {e:?}"));
                }
                SurfaceErrorAction::RedrawLater => {
                    warn!("Skipping frame: {e:?}");
                    window.window.request_redraw();
                    return Ok(());
                }
            },
        };

        renderer.render_and_present(&window.text_renderer, config.background, surface_texture);
        Ok(())
    }
}

/// What to do when no surface texture can be acquired, even after reconfiguring the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SurfaceErrorAction {
    Fail,
    /// Skip this frame and request another one, so the window does not stay blank.
    RedrawLater,
}

impl SurfaceErrorAction {
    fn for_error(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::OutOfMemory => Self::Fail,
            _ => Self::RedrawLater,
        }
    }
}

impl ApplicationHandler for TextWindowApplication {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // As recommended, wait for the resumed event before creating any window.
        if self.window.is_some() {
            return;
        }

        match self.create_window(event_loop) {
            Ok(window) => {
                info!("Window created: {:?}", window.window.inner_size());
                window.window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = &mut self.window {
                    window.renderer.resize((size.width, size.height));
                    window.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }
}
