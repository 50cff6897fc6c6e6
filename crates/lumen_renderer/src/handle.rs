//! Plain ids for GPU-resident resources.
//!
//! CPU-side types (geometry buffers, materials, the sky, recorded frame
//! commands) refer to GPU objects only through these ids; the
//! [`crate::resources::GpuResources`] registry resolves them at execution.

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

resource_id!(
    /// Immutable vertex / index buffer pair.
    MeshId
);
resource_id!(
    /// 2-D texture or cubemap view.
    TextureId
);
resource_id!(SamplerId);
resource_id!(
    /// Entry in the [`crate::shader::ShaderLibrary`].
    ShaderPairId
);
