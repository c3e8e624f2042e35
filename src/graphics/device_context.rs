//! Immediate context: records binding, update and draw calls in submission
//! order and hands them to the backend on [`DeviceContext::flush`].

use crate::{
    error::Result,
    graphics::{
        backend::{Format, ResourceId},
        command::{Command, PrimitiveTopology, ShaderStage},
        device::GraphicsDevice,
        overlay::OverlayFrame,
        viewport::Viewport,
    },
};

#[derive(Debug, Default)]
pub struct DeviceContext {
    commands: Vec<Command>,
}

impl DeviceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last flush.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of draw calls recorded since the last flush.
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    pub fn clear_state(&mut self) {
        self.commands.push(Command::ClearState);
    }

    pub fn set_render_targets(
        &mut self,
        render_target: Option<ResourceId>,
        depth_stencil: Option<ResourceId>,
    ) {
        self.commands.push(Command::SetRenderTargets {
            render_target,
            depth_stencil,
        });
    }

    pub fn clear_render_target_view(&mut self, view: ResourceId, color: [f32; 4]) {
        self.commands.push(Command::ClearRenderTarget { view, color });
    }

    pub fn clear_depth_stencil_view(&mut self, view: ResourceId, depth: f32, stencil: u8) {
        self.commands.push(Command::ClearDepthStencil {
            view,
            depth,
            stencil,
        });
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(Command::SetViewport(viewport));
    }

    pub fn set_shader_program(&mut self, program: ResourceId) {
        self.commands.push(Command::SetShaderProgram(program));
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: ResourceId, stride: u32, offset: u32) {
        self.commands.push(Command::SetVertexBuffer {
            slot,
            buffer,
            stride,
            offset,
        });
    }

    pub fn set_index_buffer(&mut self, buffer: ResourceId, format: Format, offset: u32) {
        self.commands.push(Command::SetIndexBuffer {
            buffer,
            format,
            offset,
        });
    }

    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.commands.push(Command::SetPrimitiveTopology(topology));
    }

    pub fn set_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: ResourceId) {
        self.commands.push(Command::SetConstantBuffer {
            stage,
            slot,
            buffer,
        });
    }

    pub fn set_shader_resource(&mut self, slot: u32, texture: ResourceId) {
        self.commands.push(Command::SetShaderResource { slot, texture });
    }

    pub fn set_sampler(&mut self, slot: u32, sampler: ResourceId) {
        self.commands.push(Command::SetSampler { slot, sampler });
    }

    /// Replaces the whole content of `buffer` with `data`.
    pub fn update_subresource(&mut self, buffer: ResourceId, data: &[u8]) {
        self.commands.push(Command::UpdateBuffer {
            buffer,
            data: data.to_vec(),
        });
    }

    pub fn draw_indexed(&mut self, index_count: u32, start_index: u32, base_vertex: i32) {
        self.commands.push(Command::DrawIndexed {
            index_count,
            start_index,
            base_vertex,
        });
    }

    pub fn draw_overlay(&mut self, frame: OverlayFrame) {
        self.commands.push(Command::DrawOverlay(Box::new(frame)));
    }

    /// Submits everything recorded so far. The recording is emptied even if
    /// the backend rejects it.
    pub fn flush(&mut self, device: &mut GraphicsDevice) -> Result<()> {
        let commands = std::mem::take(&mut self.commands);
        if commands.is_empty() {
            return Ok(());
        }
        device.execute(&commands)
    }
}
