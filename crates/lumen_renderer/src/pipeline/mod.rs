pub mod forward;
pub mod layout;

pub use forward::ForwardPipeline;
pub use layout::BindingLayouts;

use std::collections::HashMap;

use crate::error::RenderError;
use crate::handle::ShaderPairId;
use crate::shader::ShaderLibrary;

/// Forward pipelines compiled on first use, one per shader pair.
#[derive(Default)]
pub struct PipelineCache {
    pipelines: HashMap<ShaderPairId, ForwardPipeline>,
}

impl PipelineCache {
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        layouts: &BindingLayouts,
        shaders: &ShaderLibrary,
        id: ShaderPairId,
        format: wgpu::TextureFormat,
    ) -> Result<&ForwardPipeline, RenderError> {
        if !self.pipelines.contains_key(&id) {
            let desc = shaders.get(id)?;
            self.pipelines
                .insert(id, ForwardPipeline::new(device, layouts, desc, format));
        }
        self.pipelines
            .get(&id)
            .ok_or(RenderError::UnknownShaderPair(id))
    }

    pub fn get(&self, id: ShaderPairId) -> Result<&ForwardPipeline, RenderError> {
        self.pipelines
            .get(&id)
            .ok_or(RenderError::UnknownShaderPair(id))
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
