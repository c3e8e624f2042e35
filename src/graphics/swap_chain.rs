use crate::{
    error::Result,
    graphics::{device::GraphicsDevice, device_context::DeviceContext, texture::Texture},
};

/// Presentation surface of the window.
///
/// The swap chain itself holds no reference to its back buffer; callers get
/// one from [`SwapChain::get_buffer`] and must destroy it (and every view of
/// it) before [`SwapChain::resize_buffers`].
#[derive(Debug)]
pub struct SwapChain {
    width: u32,
    height: u32,
}

impl SwapChain {
    /// Creates the swap chain and returns it with its first back buffer.
    pub fn init(device: &mut GraphicsDevice, width: u32, height: u32) -> Result<(Self, Texture)> {
        device.create_swap_chain(width, height)?;
        log::info!("SwapChain: created {width}x{height}");
        let swap_chain = Self { width, height };
        let back_buffer = swap_chain.get_buffer(device)?;
        Ok((swap_chain, back_buffer))
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fetches the current back buffer.
    pub fn get_buffer(&self, device: &mut GraphicsDevice) -> Result<Texture> {
        let id = device.acquire_back_buffer()?;
        Ok(Texture::back_buffer(id, self.width, self.height))
    }

    pub fn resize_buffers(&mut self, device: &mut GraphicsDevice, width: u32, height: u32) -> Result<()> {
        device.resize_swap_chain(width, height).inspect_err(|err| {
            log::error!("SwapChain::resize_buffers: {err}");
        })?;
        log::debug!("SwapChain: resized to {width}x{height}");
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Submits the recorded frame and presents it.
    pub fn present(&self, ctx: &mut DeviceContext, device: &mut GraphicsDevice) -> Result<()> {
        ctx.flush(device)?;
        device.present()
    }
}
