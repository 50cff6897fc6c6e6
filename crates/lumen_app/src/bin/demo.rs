//! Sample scene: seven primitives in three materials, five lights, two
//! cameras and a sky box.
//!
//! Keys: `1` / `2` switch camera, `T` cycles the first material's tint,
//! `U` / `O` scale / scroll the checker UVs, `L` toggles the spot lights,
//! `C` recolours the key light, `M` logs mesh statistics, `Esc` quits.
//! WASD / Space / Q and left-drag move the active camera.
//!
//! Usage: `lumen-demo [config.toml]` (defaults to `lumen.toml` if present).

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use lumen_app::{
    App, AppConfig, AppContext, Camera, Color, KeyCode, Lens, Light, LumenApp, OverlayEdit,
    SceneContext, SetupContext, Vec2, Vec3,
};
use lumen_renderer::{primitives, Entity, GeometryBuffer, Material, MeshData, Sky, SkyGradient};

const SKY_FACE_SIZE: u32 = 128;
const KEY_LIGHT: usize = 0;
const SPOT_LIGHTS: [usize; 2] = [3, 4];
const SPOT_INTENSITY: f32 = 3.0;

const TINTS: [Color; 4] = [
    Color::WHITE,
    Color::rgb(1.0, 0.45, 0.35),
    Color::rgb(0.4, 0.9, 0.5),
    Color::rgb(0.45, 0.6, 1.0),
];
const KEY_COLORS: [Vec3; 3] = [
    Vec3::new(1.0, 0.96, 0.9),
    Vec3::new(1.0, 0.7, 0.45),
    Vec3::new(0.6, 0.75, 1.0),
];

#[derive(Default)]
struct Demo {
    /// Overlay indices of the three materials.
    materials: [usize; 3],
    tint: usize,
    key_color: usize,
    uv_scale: f32,
    uv_offset: f32,
    spots_on: bool,
}

impl Demo {
    fn new() -> Self {
        Self {
            uv_scale: 1.0,
            spots_on: true,
            ..Default::default()
        }
    }
}

fn meshes() -> [(&'static str, MeshData); 7] {
    [
        ("cube", primitives::cube()),
        ("quad", primitives::quad()),
        ("double quad", primitives::double_sided_quad()),
        ("sphere", primitives::sphere(32, 16)),
        ("cylinder", primitives::cylinder(32)),
        ("cone", primitives::cone(32)),
        ("torus", primitives::torus(0.35, 0.15, 32, 16)),
    ]
}

impl LumenApp for Demo {
    fn setup(&mut self, ctx: &mut SetupContext) -> anyhow::Result<SceneContext> {
        let aspect = ctx.aspect();
        let resources = &mut ctx.renderer.resources;
        let shaders = &ctx.renderer.shaders;
        let lit = shaders.id("lit").context("lit shader pair missing")?;
        let sky_pair = shaders.id("sky").context("sky shader pair missing")?;

        // ── Textures and samplers ───────────────────────────────────────────
        let checker = resources.checker_texture(
            "checker",
            256,
            8,
            Color::rgb(0.9, 0.9, 0.9),
            Color::rgb(0.2, 0.2, 0.25),
        )?;
        let white = resources.solid_texture("white", Color::WHITE)?;
        let sampler = resources.anisotropic_sampler();
        let sky_sampler = resources.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sky Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let cubemap = match &ctx.config.sky_faces {
            Some(paths) => resources.load_cubemap(paths)?,
            None => resources.create_cubemap(
                "gradient sky",
                SKY_FACE_SIZE,
                &SkyGradient::default().faces(SKY_FACE_SIZE),
            )?,
        };

        // ── Cameras ─────────────────────────────────────────────────────────
        let front = Camera::looking_at(
            Vec3::new(0.0, 2.5, 9.0),
            Vec3::new(0.0, 0.0, -1.0),
            aspect,
            Lens::default(),
        );
        let mut scene = SceneContext::new(front);
        scene.add_camera(Camera::looking_at(
            Vec3::new(8.0, 7.0, 4.0),
            Vec3::new(0.0, 0.0, -1.0),
            aspect,
            Lens::default(),
        ));

        // ── Materials ───────────────────────────────────────────────────────
        let mut painted = Material::new("painted", lit, TINTS[0]);
        painted.add_texture(0, white)?;
        painted.add_sampler(0, sampler)?;
        painted.set_roughness(0.8);

        let mut checkered = Material::new("checkered", lit, Color::WHITE);
        checkered.add_texture(0, checker)?;
        checkered.add_sampler(0, sampler)?;
        checkered.set_roughness(0.5);

        let mut metal = Material::new("metal", lit, Color::rgb(0.85, 0.8, 0.7));
        metal.add_texture(0, white)?;
        metal.add_sampler(0, sampler)?;
        metal.set_roughness(0.15);
        metal.set_metal(true);

        let materials = [
            painted.into_shared(),
            checkered.into_shared(),
            metal.into_shared(),
        ];
        for (i, material) in materials.iter().enumerate() {
            self.materials[i] = scene.add_material(material.clone());
        }

        // ── Entities: one row per material, one column per primitive ───────
        let mut uploaded: Vec<Arc<GeometryBuffer>> = Vec::new();
        for (name, data) in meshes() {
            let buffer = resources.upload_mesh(name, &data)?;
            uploaded.push(scene.add_mesh(name, buffer));
        }

        for (row, material) in materials.iter().enumerate() {
            for (col, mesh) in uploaded.iter().enumerate() {
                let mut entity = Entity::new(mesh.clone(), material.clone());
                entity.transform.set_position(Vec3::new(
                    col as f32 * 1.6 - 4.8,
                    0.0,
                    -(row as f32) * 1.8,
                ));
                scene.spawn(entity);
            }
        }

        // ── Lights ──────────────────────────────────────────────────────────
        scene.lights.set(
            KEY_LIGHT,
            Light::directional(Vec3::new(-0.4, -1.0, -0.5), KEY_COLORS[0], 0.9).with_specular(),
        )?;
        scene.lights.set(
            1,
            Light::directional(Vec3::new(0.7, -0.3, 0.4), Vec3::new(0.5, 0.6, 0.8), 0.35),
        )?;
        scene.lights.set(
            2,
            Light::directional(Vec3::new(0.0, 0.5, 1.0), Vec3::ONE, 0.15),
        )?;
        for (i, (x, color)) in [(-3.0, Vec3::new(1.0, 0.5, 0.3)), (3.0, Vec3::new(0.3, 0.6, 1.0))]
            .into_iter()
            .enumerate()
        {
            let position = Vec3::new(x, 4.0, 1.0);
            scene.lights.set(
                SPOT_LIGHTS[i],
                Light::spot(
                    position,
                    Vec3::new(0.0, 0.0, -1.8) - position,
                    12.0,
                    (0.3, 0.5),
                    color,
                    SPOT_INTENSITY,
                ),
            )?;
        }

        // ── Sky ─────────────────────────────────────────────────────────────
        let sky_mesh = resources.upload_mesh("sky", &primitives::cube())?;
        scene.sky = Some(Sky {
            mesh: sky_mesh,
            shaders: sky_pair,
            cubemap,
            sampler: sky_sampler,
        });

        let draws = scene.draw_count();
        anyhow::ensure!(
            draws <= ctx.config.max_draws_per_frame as usize,
            "scene records {draws} draws per frame but max_draws_per_frame is {}",
            ctx.config.max_draws_per_frame
        );
        Ok(scene)
    }

    fn update(&mut self, ctx: &mut AppContext) {
        let input = &*ctx.input;
        let mut edits = Vec::new();

        if input.just_pressed(KeyCode::Escape) {
            ctx.request_exit();
            return;
        }
        if input.just_pressed(KeyCode::Digit1) {
            edits.push(OverlayEdit::ActiveCamera(0));
        }
        if input.just_pressed(KeyCode::Digit2) {
            edits.push(OverlayEdit::ActiveCamera(1));
        }
        if input.just_pressed(KeyCode::KeyT) {
            self.tint = (self.tint + 1) % TINTS.len();
            edits.push(OverlayEdit::MaterialTint {
                material: self.materials[0],
                tint: TINTS[self.tint],
            });
        }
        if input.just_pressed(KeyCode::KeyU) {
            self.uv_scale = if self.uv_scale >= 4.0 { 1.0 } else { self.uv_scale * 2.0 };
            edits.push(OverlayEdit::MaterialUvScale {
                material: self.materials[1],
                scale: Vec2::splat(self.uv_scale),
            });
        }
        if input.just_pressed(KeyCode::KeyO) {
            self.uv_offset = (self.uv_offset + 0.125) % 1.0;
            edits.push(OverlayEdit::MaterialUvOffset {
                material: self.materials[1],
                offset: Vec2::new(self.uv_offset, 0.0),
            });
        }
        if input.just_pressed(KeyCode::KeyL) {
            self.spots_on = !self.spots_on;
            let intensity = if self.spots_on { SPOT_INTENSITY } else { 0.0 };
            for light in SPOT_LIGHTS {
                edits.push(OverlayEdit::LightIntensity { light, intensity });
            }
        }
        if input.just_pressed(KeyCode::KeyC) {
            self.key_color = (self.key_color + 1) % KEY_COLORS.len();
            edits.push(OverlayEdit::LightColor {
                light: KEY_LIGHT,
                color: KEY_COLORS[self.key_color],
            });
        }
        if input.just_pressed(KeyCode::KeyM) {
            for mesh in ctx.scene.mesh_stats() {
                log::info!(
                    "{:>12}: {:>5} vertices {:>6} indices {:>5} triangles",
                    mesh.name,
                    mesh.vertices,
                    mesh.indices,
                    mesh.triangles
                );
            }
        }
        for edit in edits {
            ctx.edit(edit);
        }

        let spin = Vec3::new(0.0, 0.6 * ctx.time.delta, 0.0);
        for entity in &mut ctx.scene.entities {
            entity.transform.rotate(spin);
        }
    }

    fn on_resize(&mut self, new_size: (u32, u32), _ctx: &mut AppContext) {
        log::debug!("demo resized to {}x{}", new_size.0, new_size.1);
    }
}

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path))?,
        None if Path::new("lumen.toml").is_file() => AppConfig::load(Path::new("lumen.toml"))?,
        None => AppConfig {
            title: "Lumen demo".to_string(),
            max_draws_per_frame: 22,
            ..Default::default()
        },
    };
    App::new(Demo::new()).with_config(config).run()
}
