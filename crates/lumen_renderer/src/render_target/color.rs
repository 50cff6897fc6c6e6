/// Off-screen colour attachment for rendering without a window.
///
/// Carries `COPY_SRC` so a finished frame can be read back.
use crate::resources::texture::{self, RenderTextureDesc};

pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl ColorTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let (texture, view) = Self::make(device, width, height, format);
        Self {
            texture,
            view,
            format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (t, v) = Self::make(device, width, height, self.format);
        self.texture = t;
        self.view = v;
    }

    fn make(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let tex = texture::create_render_texture(
            device,
            &RenderTextureDesc {
                label: "Off-screen Color",
                width,
                height,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
            },
        );
        let view = texture::default_view(&tex);
        (tex, view)
    }
}
