use crate::{
    error::Result,
    graphics::{
        backend::{ResourceId, SamplerDesc},
        device::GraphicsDevice,
        device_context::DeviceContext,
    },
};

/// Trilinear, wrapping sampler used for every textured mesh.
#[derive(Debug, PartialEq, Eq)]
pub struct SamplerState {
    id: ResourceId,
}

impl SamplerState {
    pub fn init(device: &mut GraphicsDevice) -> Result<Self> {
        Self::with_desc(device, &SamplerDesc::default())
    }

    pub fn with_desc(device: &mut GraphicsDevice, desc: &SamplerDesc) -> Result<Self> {
        let id = device.create_sampler_state(desc)?;
        Ok(Self { id })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn render(&self, ctx: &mut DeviceContext, start_slot: u32) {
        ctx.set_sampler(start_slot, self.id);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }
}
