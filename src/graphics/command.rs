//! Commands recorded by the [`DeviceContext`](super::device_context::DeviceContext).

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{Format, ResourceId},
        overlay::OverlayFrame,
        viewport::Viewport,
    },
};

/// Constant buffer slots 0..3 map to the view, projection and per-frame blocks.
pub const CONSTANT_BUFFER_SLOTS: u32 = 3;
/// One texture and one sampler, both at slot 0.
pub const SHADER_RESOURCE_SLOTS: u32 = 1;
pub const SAMPLER_SLOTS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Unbinds everything and resets the pipeline state.
    ClearState,
    SetRenderTargets {
        render_target: Option<ResourceId>,
        depth_stencil: Option<ResourceId>,
    },
    ClearRenderTarget {
        view: ResourceId,
        color: [f32; 4],
    },
    ClearDepthStencil {
        view: ResourceId,
        depth: f32,
        stencil: u8,
    },
    SetViewport(Viewport),
    SetShaderProgram(ResourceId),
    SetVertexBuffer {
        slot: u32,
        buffer: ResourceId,
        stride: u32,
        offset: u32,
    },
    SetIndexBuffer {
        buffer: ResourceId,
        format: Format,
        offset: u32,
    },
    SetPrimitiveTopology(PrimitiveTopology),
    SetConstantBuffer {
        stage: ShaderStage,
        slot: u32,
        buffer: ResourceId,
    },
    SetShaderResource {
        slot: u32,
        texture: ResourceId,
    },
    SetSampler {
        slot: u32,
        sampler: ResourceId,
    },
    UpdateBuffer {
        buffer: ResourceId,
        data: Vec<u8>,
    },
    DrawIndexed {
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    },
    DrawOverlay(Box<OverlayFrame>),
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(self, Command::DrawIndexed { .. } | Command::DrawOverlay(_))
    }

    /// Every resource the command reads or writes.
    pub fn resources(&self) -> Vec<ResourceId> {
        match self {
            Command::ClearState
            | Command::SetViewport(_)
            | Command::SetPrimitiveTopology(_)
            | Command::DrawIndexed { .. } => Vec::new(),
            Command::SetRenderTargets {
                render_target,
                depth_stencil,
            } => render_target.iter().chain(depth_stencil).copied().collect(),
            Command::ClearRenderTarget { view, .. } | Command::ClearDepthStencil { view, .. } => {
                vec![*view]
            }
            Command::SetShaderProgram(id) => vec![*id],
            Command::SetVertexBuffer { buffer, .. }
            | Command::SetIndexBuffer { buffer, .. }
            | Command::SetConstantBuffer { buffer, .. }
            | Command::UpdateBuffer { buffer, .. } => vec![*buffer],
            Command::SetShaderResource { texture, .. } => vec![*texture],
            Command::SetSampler { sampler, .. } => vec![*sampler],
            Command::DrawOverlay(frame) => frame.draws.iter().map(|d| d.texture).collect(),
        }
    }

    /// Rejects bindings outside the slots the shader declares.
    pub fn check_slots(&self) -> Result<()> {
        let (what, slot, limit) = match self {
            Command::SetConstantBuffer { slot, .. } => ("constant buffer", *slot, CONSTANT_BUFFER_SLOTS),
            Command::SetShaderResource { slot, .. } => ("shader resource", *slot, SHADER_RESOURCE_SLOTS),
            Command::SetSampler { slot, .. } => ("sampler", *slot, SAMPLER_SLOTS),
            Command::SetVertexBuffer { slot, .. } => ("vertex buffer", *slot, 1),
            _ => return Ok(()),
        };
        if slot >= limit {
            return Err(GraphicsError::UnsupportedSlot { what, slot });
        }
        Ok(())
    }
}
