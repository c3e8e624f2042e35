use crate::{
    error::Result,
    graphics::{
        backend::{Format, ResourceId},
        depth_stencil_view::DepthStencilView,
        device::GraphicsDevice,
        device_context::DeviceContext,
        texture::Texture,
    },
};

#[derive(Debug, PartialEq, Eq)]
pub struct RenderTargetView {
    id: ResourceId,
}

impl RenderTargetView {
    pub fn init(device: &mut GraphicsDevice, back_buffer: &Texture, format: Format) -> Result<Self> {
        let id = device.create_render_target_view(back_buffer.id(), format)?;
        Ok(Self { id })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Binds this view with `depth_stencil` as the output targets and clears
    /// both: color to `clear_color`, depth to 1 and stencil to 0.
    pub fn render(&self, ctx: &mut DeviceContext, depth_stencil: &DepthStencilView, clear_color: [f32; 4]) {
        ctx.set_render_targets(Some(self.id), Some(depth_stencil.id()));
        ctx.clear_render_target_view(self.id, clear_color);
        ctx.clear_depth_stencil_view(depth_stencil.id(), 1.0, 0);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }
}
