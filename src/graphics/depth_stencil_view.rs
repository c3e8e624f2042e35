use crate::{
    error::Result,
    graphics::{
        backend::{Format, ResourceId},
        device::GraphicsDevice,
        device_context::DeviceContext,
        texture::Texture,
    },
};

#[derive(Debug, PartialEq, Eq)]
pub struct DepthStencilView {
    id: ResourceId,
}

impl DepthStencilView {
    pub fn init(device: &mut GraphicsDevice, depth_stencil: &Texture, format: Format) -> Result<Self> {
        let id = device.create_depth_stencil_view(depth_stencil.id(), format)?;
        Ok(Self { id })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Clears depth to 1 and stencil to 0.
    pub fn render(&self, ctx: &mut DeviceContext) {
        ctx.clear_depth_stencil_view(self.id, 1.0, 0);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }
}
