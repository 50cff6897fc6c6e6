//! GPU resource registry.
//!
//! [`GpuResources`] owns every mesh buffer, texture and sampler and hands out
//! plain ids for them.  Creation failures surface as [`RenderError`] so the
//! app can abort at startup.

pub mod buffer;
pub mod texture;

use std::path::Path;
use std::sync::Arc;

use lumen_core::{Color, GpuContext};

use crate::error::RenderError;
use crate::geometry::{GeometryBuffer, MeshData};
use crate::handle::{MeshId, SamplerId, TextureId};
use crate::shader::TextureKind;

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub kind: TextureKind,
}

pub struct GpuResources {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    samplers: Vec<wgpu::Sampler>,
}

impl GpuResources {
    pub fn new(ctx: &GpuContext) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            meshes: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
        }
    }

    // ── Meshes ──────────────────────────────────────────────────────────────

    /// Uploads `data` into immutable vertex / index buffers.
    pub fn upload_mesh(
        &mut self,
        name: &str,
        data: &MeshData,
    ) -> Result<Arc<GeometryBuffer>, RenderError> {
        data.validate().map_err(|reason| RenderError::InvalidMesh {
            name: name.to_owned(),
            reason,
        })?;

        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buffer: buffer::create_vertex(&self.device, &format!("{name} VB"), &data.vertices),
            index_buffer: buffer::create_index(&self.device, &format!("{name} IB"), &data.indices),
            index_count: data.indices.len() as u32,
        });
        log::debug!(
            "uploaded mesh `{name}` as {id:?}: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );
        Ok(Arc::new(GeometryBuffer::new(
            id,
            data.vertices.len() as u32,
            data.indices.len() as u32,
        )))
    }

    pub fn mesh(&self, id: MeshId) -> Result<&GpuMesh, RenderError> {
        self.meshes.get(id.index()).ok_or(RenderError::UnknownMesh(id))
    }

    // ── Textures ────────────────────────────────────────────────────────────

    /// Uploads one RGBA8 image.
    pub fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureId, RenderError> {
        let texture = texture::create_rgba_texture(
            &self.device,
            &self.queue,
            label,
            (width, height, 1),
            pixels,
        )?;
        let view = texture::default_view(&texture);
        Ok(self.push_texture(texture, view, TextureKind::D2))
    }

    pub fn load_texture(&mut self, path: &Path) -> Result<TextureId, RenderError> {
        let img = texture::load_rgba(path)?;
        let label = path.display().to_string();
        log::info!("loaded texture {label} ({}x{})", img.width(), img.height());
        self.create_texture(&label, img.width(), img.height(), img.as_raw())
    }

    pub fn checker_texture(
        &mut self,
        label: &str,
        size: u32,
        cells: u32,
        a: Color,
        b: Color,
    ) -> Result<TextureId, RenderError> {
        let pixels = texture::checker_pixels(size, cells, a, b);
        self.create_texture(label, size, size, &pixels)
    }

    /// 1×1 texture of `color`, for materials that only want their tint.
    pub fn solid_texture(&mut self, label: &str, color: Color) -> Result<TextureId, RenderError> {
        self.create_texture(label, 1, 1, &texture::rgba8(color))
    }

    /// Cubemap from six square RGBA8 faces in `+X, -X, +Y, -Y, +Z, -Z`
    /// order.
    pub fn create_cubemap(
        &mut self,
        label: &str,
        size: u32,
        faces: &[Vec<u8>; 6],
    ) -> Result<TextureId, RenderError> {
        let pixels = faces.concat();
        let texture =
            texture::create_rgba_texture(&self.device, &self.queue, label, (size, size, 6), &pixels)?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Ok(self.push_texture(texture, view, TextureKind::Cube))
    }

    /// Cubemap from six image files, same face order as
    /// [`GpuResources::create_cubemap`].
    pub fn load_cubemap<P: AsRef<Path>>(&mut self, paths: &[P; 6]) -> Result<TextureId, RenderError> {
        let mut size = None;
        let mut faces: [Vec<u8>; 6] = Default::default();
        for (face, path) in faces.iter_mut().zip(paths) {
            let path = path.as_ref();
            let img = texture::load_rgba(path)?;
            let (w, h) = img.dimensions();
            if w != h || size.is_some_and(|s| s != w) {
                return Err(RenderError::InvalidTexture {
                    name: path.display().to_string(),
                    reason: format!("cube face is {w}x{h}, faces must be equal squares"),
                });
            }
            size = Some(w);
            *face = img.into_raw();
        }
        self.create_cubemap("Sky Cubemap", size.unwrap_or(0), &faces)
    }

    fn push_texture(
        &mut self,
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        kind: TextureKind,
    ) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(GpuTexture {
            texture,
            view,
            kind,
        });
        id
    }

    pub fn texture(&self, id: TextureId) -> Result<&GpuTexture, RenderError> {
        self.textures
            .get(id.index())
            .ok_or(RenderError::UnknownTexture(id))
    }

    // ── Samplers ────────────────────────────────────────────────────────────

    pub fn create_sampler(&mut self, desc: &wgpu::SamplerDescriptor<'_>) -> SamplerId {
        self.push_sampler(self.device.create_sampler(desc))
    }

    pub fn anisotropic_sampler(&mut self) -> SamplerId {
        self.push_sampler(texture::anisotropic_wrap_sampler(
            &self.device,
            "Anisotropic Wrap",
        ))
    }

    fn push_sampler(&mut self, sampler: wgpu::Sampler) -> SamplerId {
        let id = SamplerId(self.samplers.len() as u32);
        self.samplers.push(sampler);
        id
    }

    pub fn sampler(&self, id: SamplerId) -> Result<&wgpu::Sampler, RenderError> {
        self.samplers
            .get(id.index())
            .ok_or(RenderError::UnknownSampler(id))
    }

    #[inline]
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }
}
