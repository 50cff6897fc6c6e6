/// The depth attachment of the scene pass.
///
/// Tracks its own size so the executor can re-create it lazily whenever the
/// colour view it is paired with changes size.
use crate::resources::texture::{self, RenderTextureDesc};

pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = Self::make(device, width, height);
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Re-creates the texture if `(width, height)` differs from the current
    /// size.  Returns `true` when it did.
    pub fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        let (t, v) = Self::make(device, width, height);
        self.texture = t;
        self.view = v;
        self.width = width;
        self.height = height;
        log::debug!("depth target resized to {width}x{height}");
        true
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn make(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let tex = texture::create_render_texture(
            device,
            &RenderTextureDesc {
                label: "Depth Texture",
                width,
                height,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            },
        );
        let view = texture::default_view(&tex);
        (tex, view)
    }
}
