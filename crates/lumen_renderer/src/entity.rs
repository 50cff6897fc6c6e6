//! One drawable object: a transform, a shared material and a shared mesh.

use std::rc::Rc;
use std::sync::Arc;

use lumen_core::Transform;

use crate::error::RenderError;
use crate::frame::FrameRecorder;
use crate::geometry::GeometryBuffer;
use crate::material::SharedMaterial;
use crate::payload::{FrameConstants, PixelData, VertexData};
use crate::staging::ShaderStage;

pub struct Entity {
    pub transform: Transform,
    mesh: Arc<GeometryBuffer>,
    material: SharedMaterial,
}

impl Entity {
    pub fn new(mesh: Arc<GeometryBuffer>, material: SharedMaterial) -> Self {
        Self {
            transform: Transform::default(),
            mesh,
            material,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<GeometryBuffer> {
        &self.mesh
    }

    #[inline]
    pub fn material(&self) -> &SharedMaterial {
        &self.material
    }

    pub fn set_material(&mut self, material: SharedMaterial) {
        self.material = material;
    }

    /// `true` if both entities draw with the same material instance.
    pub fn shares_material_with(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.material, &other.material)
    }

    /// Records this entity's draw: shader pair, material resources, freshly
    /// staged vertex and pixel constants (slot 0 of each stage), then the
    /// indexed draw.
    pub fn draw(
        &mut self,
        rec: &mut FrameRecorder<'_>,
        frame: &FrameConstants,
    ) -> Result<(), RenderError> {
        let material = self.material.borrow();
        rec.set_shaders(material.shaders());
        material.bind_textures_and_samplers(rec.plan_mut());

        let vertex = VertexData::new(
            self.transform.world_matrix(),
            self.transform.world_inverse_transpose_matrix(),
            &frame.camera,
        );
        rec.stage(&vertex, ShaderStage::Vertex, 0)?;
        rec.stage(&PixelData::new(&material, frame), ShaderStage::Pixel, 0)?;

        self.mesh.draw(rec.plan_mut());
        Ok(())
    }
}
