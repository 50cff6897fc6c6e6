// Renders one frame of a small lit scene without a window and writes it to
// `frame.png`.  Exercises the whole path: staging, recording, pipelines,
// material groups and the forward pass.

use anyhow::Context;
use glam::Vec3;
use lumen_core::{Camera, Color, GpuContext, Lens, Light, Time};
use lumen_renderer::render_target::ColorTarget;
use lumen_renderer::{
    primitives, Entity, Material, OverlayQueue, Renderer, SceneContext, ShaderLibrary,
    StagingConfig, ENTITY_PAYLOADS,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn main() -> anyhow::Result<()> {
    pollster::block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let ctx = GpuContext::new().await?;
    let shaders = ShaderLibrary::with_builtins(None)?;
    let lit = shaders.id("lit").context("built-in lit shader missing")?;
    let staging = StagingConfig::sized_for(4, &ENTITY_PAYLOADS, ctx.uniform_offset_alignment(), 3);
    let mut renderer = Renderer::new(&ctx, FORMAT, WIDTH, HEIGHT, shaders, staging)?;

    let white = renderer.resources.solid_texture("white", Color::WHITE)?;
    let sampler = renderer.resources.anisotropic_sampler();
    let cube = renderer.resources.upload_mesh("cube", &primitives::cube())?;
    let sphere = renderer.resources.upload_mesh("sphere", &primitives::sphere(32, 16))?;

    let aspect = WIDTH as f32 / HEIGHT as f32;
    let camera = Camera::looking_at(Vec3::new(0.0, 1.5, 5.0), Vec3::ZERO, aspect, Lens::default());
    let mut scene = SceneContext::new(camera);
    scene.lights.set(
        0,
        Light::directional(Vec3::new(-0.4, -1.0, -0.3), Vec3::ONE, 1.0),
    )?;

    for (i, (mesh, tint)) in [(cube, Color::RED), (sphere, Color::BLUE)].into_iter().enumerate() {
        let mut material = Material::new(format!("m{i}"), lit, tint);
        material.add_texture(0, white)?;
        material.add_sampler(0, sampler)?;
        let material = material.into_shared();
        scene.add_material(material.clone());
        let mut entity = Entity::new(mesh, material);
        entity.transform.set_position(Vec3::new(i as f32 * 2.0 - 1.0, 0.0, 0.0));
        scene.spawn(entity);
    }

    let target = ColorTarget::new(&ctx.device, WIDTH, HEIGHT, FORMAT);
    let stats = renderer.render(
        &mut scene,
        &mut OverlayQueue::new(),
        &Time::fixed(0, 0.0),
        &target.view,
        None,
    )?;
    println!("{stats:?}");

    // bytes per row must be a multiple of COPY_BYTES_PER_ROW_ALIGNMENT
    let unpadded = 4 * WIDTH;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let bytes_per_row = unpadded.div_ceil(align) * align;

    let readback = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: bytes_per_row as u64 * HEIGHT as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Readback") });
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &readback,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
    );
    ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| {});
    ctx.device.poll(wgpu::Maintain::Wait);
    let data = slice.get_mapped_range();

    let mut pixels = Vec::with_capacity((unpadded * HEIGHT) as usize);
    for row in 0..HEIGHT as usize {
        let start = row * bytes_per_row as usize;
        pixels.extend_from_slice(&data[start..start + unpadded as usize]);
    }
    image::save_buffer("frame.png", &pixels, WIDTH, HEIGHT, image::ColorType::Rgba8)?;
    println!("wrote frame.png");
    Ok(())
}
