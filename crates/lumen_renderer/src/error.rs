use std::path::PathBuf;

use lumen_core::CapacityError;
use thiserror::Error;

use crate::handle::{MeshId, SamplerId, ShaderPairId, TextureId};
use crate::staging::{ShaderStage, StagingError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    // ── Shaders ──────────────────────────────────────────────────────────────
    #[error("shader `{0}` not found in the shader directory or the built-in set")]
    ShaderNotFound(String),

    #[error("failed to read shader {path}: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown shader pair {0:?}")]
    UnknownShaderPair(ShaderPairId),

    // ── Binding validation ───────────────────────────────────────────────────
    #[error("draw issued before any shader pair was set")]
    NoShaders,

    #[error("shader `{shader}` reads {stage:?} constant slot {slot} but nothing is bound there")]
    UnboundConstant {
        shader: String,
        stage: ShaderStage,
        slot: u32,
    },

    #[error(
        "shader `{shader}` expects {expected} bytes at {stage:?} constant slot {slot}, \
         the bound region holds {actual}"
    )]
    LayoutMismatch {
        shader: String,
        stage: ShaderStage,
        slot: u32,
        expected: u64,
        actual: u64,
    },

    #[error("shader `{shader}` samples texture slot {slot} but nothing is bound there")]
    UnboundTexture { shader: String, slot: u32 },

    #[error("shader `{shader}` uses sampler slot {slot} but nothing is bound there")]
    UnboundSampler { shader: String, slot: u32 },

    #[error("{0} issued while the render targets are unbound")]
    TargetsUnbound(&'static str),

    #[error("constant region bound before the persistent constant groups")]
    PersistentConstantsUnbound,

    #[error("{0} issued outside an open scene pass")]
    InvalidCommandOrder(&'static str),

    // ── Resources ────────────────────────────────────────────────────────────
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshId),

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    #[error("unknown sampler {0:?}")]
    UnknownSampler(SamplerId),

    #[error("texture {id:?} has the wrong dimension for shader `{shader}` slot {slot}")]
    TextureKindMismatch {
        id: TextureId,
        shader: String,
        slot: u32,
    },

    #[error("invalid mesh `{name}`: {reason}")]
    InvalidMesh { name: String, reason: String },

    #[error("invalid texture `{name}`: {reason}")]
    InvalidTexture { name: String, reason: String },

    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
