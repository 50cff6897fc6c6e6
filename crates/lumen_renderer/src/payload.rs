//! Constant payloads in the exact byte layout the WGSL shaders declare.
//!
//! Every struct is `repr(C)`, padded to 16 bytes and checked at compile time
//! against the size the shader-side declaration produces.  Field order must
//! stay identical to `assets/shaders/lit.wgsl` / `sky.wgsl`.

use glam::{Mat4, Vec3};
use lumen_core::{Light, LightArray, MAX_LIGHTS};

use crate::frame::CameraPacket;
use crate::material::Material;

/// Vertex-stage constants of the lit shader (slot 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexData {
    pub world: Mat4,
    pub world_inverse_transpose: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Pixel-stage constants of the lit shader (slot 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PixelData {
    pub tint: [f32; 4],
    pub uv_scale: [f32; 2],
    pub uv_offset: [f32; 2],
    /// Eye position in world space, for view-dependent terms.
    pub camera_position: [f32; 3],
    /// Seconds since startup.
    pub elapsed: f32,
    pub ambient: [f32; 3],
    pub roughness: f32,
    pub lights: [Light; MAX_LIGHTS],
}

/// Vertex-stage constants of the sky shader (slot 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyVertexData {
    /// View matrix with its translation removed.
    pub view: Mat4,
    pub projection: Mat4,
}

const _: () = assert!(std::mem::size_of::<VertexData>() == 256);
const _: () = assert!(std::mem::size_of::<PixelData>() == 384);
const _: () = assert!(std::mem::size_of::<SkyVertexData>() == 128);

/// Numeric state shared by every draw of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameConstants {
    pub camera: CameraPacket,
    pub elapsed: f32,
    pub ambient: Vec3,
    pub lights: LightArray,
}

impl VertexData {
    pub fn new(world: Mat4, world_inverse_transpose: Mat4, camera: &CameraPacket) -> Self {
        Self {
            world,
            world_inverse_transpose,
            view: camera.view,
            projection: camera.projection,
        }
    }
}

impl PixelData {
    pub fn new(material: &Material, frame: &FrameConstants) -> Self {
        Self {
            tint: material.tint().to_array(),
            uv_scale: material.uv_scale().to_array(),
            uv_offset: material.uv_offset().to_array(),
            camera_position: frame.camera.position.to_array(),
            elapsed: frame.elapsed,
            ambient: frame.ambient.to_array(),
            roughness: material.roughness(),
            lights: *frame.lights.as_array(),
        }
    }
}

impl SkyVertexData {
    pub fn new(camera: &CameraPacket) -> Self {
        let mut view = camera.view;
        view.w_axis = glam::Vec4::W;
        Self {
            view,
            projection: camera.projection,
        }
    }
}
