use std::sync::Arc;

use anyhow::Context as _;
use lumen_core::context::default_instance;
use lumen_core::GpuContext;
use lumen_renderer::{Renderer, ShaderLibrary};
use winit::window::Window;

use crate::builder::AppConfig;

/// Window surface, the GPU context it was created against, and the
/// renderer drawing into it.
pub struct GraphicsState {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub context: GpuContext,
    pub renderer: Renderer,
}

impl GraphicsState {
    pub async fn new(window: Arc<Window>, app: &AppConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = default_instance();
        let surface = instance
            .create_surface(window.clone())
            .context("creating window surface")?;
        let context = GpuContext::new_with_instance(instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&context.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let present_mode = if app.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &config);

        let shaders = ShaderLibrary::with_builtins(app.shader_dir.clone())?;
        let staging = app.staging(context.uniform_offset_alignment());
        let renderer = Renderer::new(
            &context,
            format,
            config.width,
            config.height,
            shaders,
            staging,
        )?;

        Ok(Self {
            window,
            surface,
            config,
            context,
            renderer,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Zero sizes (minimised window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.context.device, &self.config);
        self.renderer.resize(width, height);
    }

    /// Next swap-chain image.  `Ok(None)` means skip this frame: the surface
    /// was lost or outdated and has been reconfigured, or acquisition timed
    /// out.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, wgpu::SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::info!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.context.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface acquire timed out");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
