//! Shader pairs and the slots they read.
//!
//! A shader pair is one WGSL module with a vertex and a fragment entry point,
//! plus a [`ShaderLayout`] naming every constant slot (with its byte size),
//! texture slot and sampler slot the module declares.  The layout is what
//! lets the executor reject a draw whose bindings do not match the shader.
//!
//! Sources are looked up as `<dir>/<name>.wgsl` first and fall back to the
//! built-in copies embedded from `assets/shaders`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lumen_core::CapacityError;

use crate::error::RenderError;
use crate::handle::ShaderPairId;
use crate::material::{MAX_SAMPLER_SLOTS, MAX_TEXTURE_SLOTS};
use crate::payload::{PixelData, SkyVertexData, VertexData};
use crate::staging::{ShaderStage, StagingError, CONSTANT_ALIGNMENT, MAX_CONSTANT_SLOTS};

pub const LIT_WGSL: &str = include_str!("../../../assets/shaders/lit.wgsl");
pub const SKY_WGSL: &str = include_str!("../../../assets/shaders/sky.wgsl");

/// Embedded source for a built-in shader name.
pub fn builtin_source(name: &str) -> Option<&'static str> {
    match name {
        "lit" => Some(LIT_WGSL),
        "sky" => Some(SKY_WGSL),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D2,
    Cube,
}

impl TextureKind {
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            TextureKind::D2 => wgpu::TextureViewDimension::D2,
            TextureKind::Cube => wgpu::TextureViewDimension::Cube,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDecl {
    pub stage: ShaderStage,
    pub slot: u32,
    /// Bytes the shader reads from the slot.
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDecl {
    pub slot: u32,
    pub kind: TextureKind,
}

/// Fixed-function state baked into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    pub cull: Option<wgpu::Face>,
    pub depth_compare: wgpu::CompareFunction,
    pub depth_write: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull: Some(wgpu::Face::Back),
            depth_compare: wgpu::CompareFunction::Less,
            depth_write: true,
        }
    }
}

impl RasterState {
    /// Inside-out cube at the far plane.
    pub const SKY: RasterState = RasterState {
        cull: Some(wgpu::Face::Front),
        depth_compare: wgpu::CompareFunction::LessEqual,
        depth_write: false,
    };
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderLayout {
    pub constants: Vec<ConstantDecl>,
    pub textures: Vec<TextureDecl>,
    pub samplers: Vec<u32>,
    pub raster: RasterState,
}

impl ShaderLayout {
    /// Layout of the built-in `lit` shader.
    pub fn lit() -> Self {
        Self::default()
            .with_constant(ShaderStage::Vertex, 0, std::mem::size_of::<VertexData>() as u64)
            .with_constant(ShaderStage::Pixel, 0, std::mem::size_of::<PixelData>() as u64)
            .with_texture(0, TextureKind::D2)
            .with_sampler(0)
    }

    /// Layout of the built-in `sky` shader.
    pub fn sky() -> Self {
        Self::default()
            .with_constant(
                ShaderStage::Vertex,
                0,
                std::mem::size_of::<SkyVertexData>() as u64,
            )
            .with_texture(0, TextureKind::Cube)
            .with_sampler(0)
            .with_raster(RasterState::SKY)
    }

    pub fn with_constant(mut self, stage: ShaderStage, slot: u32, size: u64) -> Self {
        self.constants.push(ConstantDecl { stage, slot, size });
        self
    }

    pub fn with_texture(mut self, slot: u32, kind: TextureKind) -> Self {
        self.textures.push(TextureDecl { slot, kind });
        self
    }

    pub fn with_sampler(mut self, slot: u32) -> Self {
        self.samplers.push(slot);
        self
    }

    pub fn with_raster(mut self, raster: RasterState) -> Self {
        self.raster = raster;
        self
    }

    fn validate(&self) -> Result<(), RenderError> {
        for decl in &self.constants {
            if decl.slot >= MAX_CONSTANT_SLOTS {
                return Err(StagingError::SlotOutOfRange { slot: decl.slot }.into());
            }
            if decl.size == 0 || decl.size % CONSTANT_ALIGNMENT != 0 {
                return Err(StagingError::Unpadded {
                    len: decl.size as usize,
                }
                .into());
            }
        }
        for tex in &self.textures {
            CapacityError::check("texture slot", tex.slot as usize, MAX_TEXTURE_SLOTS)?;
        }
        for &slot in &self.samplers {
            CapacityError::check("sampler slot", slot as usize, MAX_SAMPLER_SLOTS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ShaderPairDesc {
    pub name: String,
    pub source: String,
    pub vertex_entry: String,
    pub pixel_entry: String,
    pub layout: ShaderLayout,
}

impl ShaderPairDesc {
    pub fn constant(&self, stage: ShaderStage, slot: u32) -> Option<&ConstantDecl> {
        self.layout
            .constants
            .iter()
            .find(|c| c.stage == stage && c.slot == slot)
    }
}

/// Named shader pairs, loaded once at startup and addressed by
/// [`ShaderPairId`] afterwards.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    dir: Option<PathBuf>,
    pairs: Vec<ShaderPairDesc>,
    by_name: HashMap<String, ShaderPairId>,
}

impl ShaderLibrary {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            ..Default::default()
        }
    }

    /// Library with the built-in `lit` and `sky` pairs already loaded.
    pub fn with_builtins(dir: Option<PathBuf>) -> Result<Self, RenderError> {
        let mut lib = Self::new(dir);
        lib.load("lit", ShaderLayout::lit())?;
        lib.load("sky", ShaderLayout::sky())?;
        Ok(lib)
    }

    /// Loads `name` with `vs_main` / `fs_main` entry points.  Loading a name
    /// twice returns the first id.
    pub fn load(&mut self, name: &str, layout: ShaderLayout) -> Result<ShaderPairId, RenderError> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        layout.validate()?;
        let source = self.read_source(name)?;

        let id = ShaderPairId(self.pairs.len() as u32);
        self.pairs.push(ShaderPairDesc {
            name: name.to_owned(),
            source,
            vertex_entry: "vs_main".to_owned(),
            pixel_entry: "fs_main".to_owned(),
            layout,
        });
        self.by_name.insert(name.to_owned(), id);
        log::info!("loaded shader pair `{name}` as {id:?}");
        Ok(id)
    }

    fn read_source(&self, name: &str) -> Result<String, RenderError> {
        if let Some(path) = self.dir.as_deref().map(|d| source_path(d, name)) {
            if path.is_file() {
                return std::fs::read_to_string(&path)
                    .map_err(|source| RenderError::ShaderIo { path, source });
            }
        }
        builtin_source(name)
            .map(str::to_owned)
            .ok_or_else(|| RenderError::ShaderNotFound(name.to_owned()))
    }

    pub fn get(&self, id: ShaderPairId) -> Result<&ShaderPairDesc, RenderError> {
        self.pairs
            .get(id.index())
            .ok_or(RenderError::UnknownShaderPair(id))
    }

    pub fn id(&self, name: &str) -> Option<ShaderPairId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShaderPairId, &ShaderPairDesc)> {
        self.pairs
            .iter()
            .enumerate()
            .map(|(i, p)| (ShaderPairId(i as u32), p))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn source_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.wgsl"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::MAX_LIGHTS;

    #[test]
    fn builtins_load_without_a_directory() {
        let lib = ShaderLibrary::with_builtins(None).unwrap();
        let lit = lib.get(lib.id("lit").unwrap()).unwrap();
        assert!(lit.source.contains("@vertex"));
        assert!(lit.source.contains("@fragment"));
        assert_eq!(
            lit.constant(ShaderStage::Pixel, 0).map(|c| c.size),
            Some(std::mem::size_of::<PixelData>() as u64)
        );
        let sky = lib.get(lib.id("sky").unwrap()).unwrap();
        assert_eq!(sky.layout.raster, RasterState::SKY);
        assert_eq!(sky.layout.textures[0].kind, TextureKind::Cube);
    }

    #[test]
    fn lit_source_declares_the_light_array_length() {
        assert!(LIT_WGSL.contains(&format!("array<Light, {MAX_LIGHTS}>")));
        assert!(LIT_WGSL.contains("@group(2) @binding(128)"));
    }

    #[test]
    fn directory_overrides_builtin() {
        let dir = std::env::temp_dir().join(format!("lumen-shaders-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("lit.wgsl"), "// custom\n").unwrap();

        let mut lib = ShaderLibrary::new(Some(dir.clone()));
        let id = lib.load("lit", ShaderLayout::lit()).unwrap();
        assert_eq!(lib.get(id).unwrap().source, "// custom\n");
        // falls back for names the directory does not have
        assert!(lib.load("sky", ShaderLayout::sky()).is_ok());
        assert_eq!(lib.load("lit", ShaderLayout::lit()).unwrap(), id);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_names_and_bad_layouts_fail() {
        let mut lib = ShaderLibrary::new(None);
        assert!(matches!(
            lib.load("toon", ShaderLayout::default()),
            Err(RenderError::ShaderNotFound(name)) if name == "toon"
        ));
        let bad = ShaderLayout::default().with_constant(ShaderStage::Vertex, 0, 100);
        assert!(matches!(
            lib.load("lit", bad),
            Err(RenderError::Staging(StagingError::Unpadded { len: 100 }))
        ));
        let bad = ShaderLayout::default().with_sampler(16);
        assert!(matches!(lib.load("lit", bad), Err(RenderError::Capacity(_))));
        assert!(lib.is_empty());
        assert!(matches!(
            lib.get(ShaderPairId(3)),
            Err(RenderError::UnknownShaderPair(ShaderPairId(3)))
        ));
    }
}
