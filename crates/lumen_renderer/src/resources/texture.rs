/// Helpers for creating `wgpu::Texture` objects with common descriptor
/// patterns, plus the CPU-side pixel generators the registry uploads.
use std::path::Path;

use lumen_core::Color;
use wgpu::util::DeviceExt;

use crate::error::RenderError;

/// Colour textures are sampled as sRGB.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Descriptor for a 2-D render-attachment texture.
pub struct RenderTextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

/// Creates a single-sampled 2-D attachment from a [`RenderTextureDesc`].
pub fn create_render_texture(device: &wgpu::Device, desc: &RenderTextureDesc<'_>) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(desc.label),
        size: wgpu::Extent3d {
            width: desc.width.max(1),
            height: desc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format,
        usage: desc.usage,
        view_formats: &[],
    })
}

/// Creates a default `TextureView` for a texture (all mips, all layers).
#[inline]
pub fn default_view(texture: &wgpu::Texture) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Uploads `layers` square or rectangular RGBA8 images stacked layer-major.
pub fn create_rgba_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    (width, height, layers): (u32, u32, u32),
    pixels: &[u8],
) -> Result<wgpu::Texture, RenderError> {
    let expected = width as usize * height as usize * layers as usize * 4;
    if width == 0 || height == 0 || pixels.len() != expected {
        return Err(RenderError::InvalidTexture {
            name: label.to_owned(),
            reason: format!(
                "{} bytes of pixel data for {width}x{height}x{layers} RGBA8",
                pixels.len()
            ),
        });
    }
    Ok(device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        pixels,
    ))
}

/// Decodes a PNG / JPEG file into RGBA8.
pub fn load_rgba(path: &Path) -> Result<image::RgbaImage, RenderError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| RenderError::Image {
            path: path.to_owned(),
            source,
        })
}

#[inline]
pub fn rgba8(color: Color) -> [u8; 4] {
    color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// `size`×`size` checkerboard of `cells`×`cells` squares, starting with `a`
/// in the top-left corner.
pub fn checker_pixels(size: u32, cells: u32, a: Color, b: Color) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let (a, b) = (rgba8(a), rgba8(b));
    let mut out = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let even = (x / cell + y / cell) % 2 == 0;
            out.extend_from_slice(if even { &a } else { &b });
        }
    }
    out
}

/// Anisotropic, trilinear, repeating sampler.
pub fn anisotropic_wrap_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: 16,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates_cells() {
        let px = checker_pixels(4, 2, Color::WHITE, Color::BLACK);
        assert_eq!(px.len(), 4 * 4 * 4);
        let at = |x: usize, y: usize| &px[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(0, 0), &[255, 255, 255, 255]);
        assert_eq!(at(1, 1), &[255, 255, 255, 255]);
        assert_eq!(at(2, 0), &[0, 0, 0, 255]);
        assert_eq!(at(0, 3), &[0, 0, 0, 255]);
        assert_eq!(at(3, 3), &[255, 255, 255, 255]);
    }

    #[test]
    fn rgba8_clamps_and_rounds() {
        assert_eq!(rgba8(Color::rgba(0.5, 1.5, -0.2, 1.0)), [128, 255, 0, 255]);
    }
}
