pub mod mesh;
pub mod primitives;
pub mod vertex;

pub use mesh::{GeometryBuffer, MeshData};
pub use vertex::Vertex;
