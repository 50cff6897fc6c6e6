//! The scene context handed to the orchestrator every frame.
//!
//! Owns the entity list, the shared materials and meshes, the cameras, the
//! lights and the optional sky.  Built once at setup; there is no global
//! scene state.

use std::sync::Arc;

use glam::Vec3;
use lumen_core::{Camera, CapacityError, Color, LightArray};

use crate::entity::Entity;
use crate::geometry::GeometryBuffer;
use crate::material::SharedMaterial;
use crate::overlay::MeshStats;
use crate::sky::Sky;

pub struct SceneContext {
    pub entities: Vec<Entity>,
    materials: Vec<SharedMaterial>,
    meshes: Vec<(String, Arc<GeometryBuffer>)>,
    cameras: Vec<Camera>,
    active_camera: usize,

    pub lights: LightArray,
    pub ambient: Vec3,
    pub clear_color: Color,
    pub sky: Option<Sky>,
}

impl SceneContext {
    /// Scene with `camera` as its first, active camera.
    pub fn new(camera: Camera) -> Self {
        Self {
            entities: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            cameras: vec![camera],
            active_camera: 0,
            lights: LightArray::default(),
            ambient: Vec3::splat(0.1),
            clear_color: Color::CORNFLOWER,
            sky: None,
        }
    }

    // ── Contents ────────────────────────────────────────────────────────────

    pub fn spawn(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Registers `material` for overlay editing and returns its index.
    pub fn add_material(&mut self, material: SharedMaterial) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn material(&self, index: usize) -> Result<&SharedMaterial, CapacityError> {
        let i = CapacityError::check("material", index, self.materials.len())?;
        Ok(&self.materials[i])
    }

    pub fn materials(&self) -> &[SharedMaterial] {
        &self.materials
    }

    /// Registers a named mesh for the overlay's statistics.
    pub fn add_mesh(&mut self, name: &str, mesh: Arc<GeometryBuffer>) -> Arc<GeometryBuffer> {
        self.meshes.push((name.to_owned(), Arc::clone(&mesh)));
        mesh
    }

    pub fn mesh(&self, name: &str) -> Option<&Arc<GeometryBuffer>> {
        self.meshes.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }

    pub fn mesh_stats(&self) -> Vec<MeshStats> {
        self.meshes
            .iter()
            .map(|(name, mesh)| MeshStats::new(name, mesh))
            .collect()
    }

    /// Draws recorded per frame: one per entity plus the sky.
    pub fn draw_count(&self) -> usize {
        self.entities.len() + usize::from(self.sky.is_some())
    }

    // ── Cameras ─────────────────────────────────────────────────────────────

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    pub fn set_active_camera(&mut self, index: usize) -> Result<(), CapacityError> {
        self.active_camera = CapacityError::check("camera", index, self.cameras.len())?;
        log::info!("active camera: {index}");
        Ok(())
    }

    #[inline]
    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    /// Rebuilds every camera's projection for a new window aspect ratio.
    pub fn resize(&mut self, aspect: f32) {
        for camera in &mut self.cameras {
            camera.update_projection(aspect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{MeshId, ShaderPairId};
    use crate::material::Material;
    use crate::overlay::{OverlayEdit, OverlayQueue};
    use lumen_core::{Lens, Light};

    fn scene() -> SceneContext {
        let mut scene = SceneContext::new(Camera::new(Vec3::Z * 5.0, 16.0 / 9.0, Lens::default()));
        scene.add_camera(Camera::new(Vec3::X * 5.0, 16.0 / 9.0, Lens::default()));
        let mesh = scene.add_mesh("cube", Arc::new(GeometryBuffer::new(MeshId(0), 24, 36)));
        let material = Material::new("red", ShaderPairId(0), Color::RED).into_shared();
        scene.add_material(material.clone());
        scene.spawn(Entity::new(mesh, material));
        scene
    }

    #[test]
    fn resize_updates_every_camera() {
        let mut scene = scene();
        let before: Vec<f32> = scene.cameras().iter().map(|c| c.projection().x_axis.x).collect();
        scene.resize(4.0 / 3.0);
        for (camera, old) in scene.cameras().iter().zip(before) {
            assert_ne!(camera.projection().x_axis.x, old);
            assert_eq!(camera.aspect(), 4.0 / 3.0);
        }
    }

    #[test]
    fn active_camera_is_bounds_checked() {
        let mut scene = scene();
        assert!(scene.set_active_camera(1).is_ok());
        assert_eq!(scene.active_camera().position(), Vec3::X * 5.0);
        assert!(scene.set_active_camera(2).is_err());
        assert_eq!(scene.active_camera_index(), 1);
    }

    #[test]
    fn mesh_stats_report_counts() {
        let scene = scene();
        assert_eq!(
            scene.mesh_stats(),
            vec![MeshStats {
                name: "cube".into(),
                vertices: 24,
                indices: 36,
                triangles: 12,
            }]
        );
        assert_eq!(scene.draw_count(), 1);
    }

    #[test]
    fn overlay_edits_reach_shared_state() {
        let mut scene = scene();
        let mut queue = OverlayQueue::new();
        queue.push(OverlayEdit::MaterialTint {
            material: 0,
            tint: Color::BLUE,
        });
        queue.push(OverlayEdit::LightIntensity {
            light: 4,
            intensity: 3.0,
        });
        queue.push(OverlayEdit::ActiveCamera(1));
        assert_eq!(queue.apply(&mut scene), Ok(3));
        assert!(queue.is_empty());

        assert_eq!(scene.entities[0].material().borrow().tint(), Color::BLUE);
        assert_eq!(scene.lights.get(4).map(|l| l.intensity), Ok(3.0));
        assert_eq!(scene.active_camera_index(), 1);
    }

    #[test]
    fn bad_overlay_index_fails_and_clears_queue() {
        let mut scene = scene();
        scene.lights.set(0, Light::default()).unwrap();
        let mut queue = OverlayQueue::new();
        queue.push(OverlayEdit::LightColor {
            light: 7,
            color: Vec3::ONE,
        });
        queue.push(OverlayEdit::ActiveCamera(1));
        let err = queue.apply(&mut scene).unwrap_err();
        assert_eq!(err.index, 7);
        assert!(queue.is_empty());
        assert_eq!(scene.active_camera_index(), 0);
    }
}
