use glam::{Mat4, Vec3};
use lumen_core::Camera;

/// Snapshot of the active camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPacket {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl From<&Camera> for CameraPacket {
    fn from(camera: &Camera) -> Self {
        Self {
            view: *camera.view(),
            projection: *camera.projection(),
            position: camera.position(),
        }
    }
}
