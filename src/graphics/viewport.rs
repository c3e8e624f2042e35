use crate::{
    error::{GraphicsError, Result},
    graphics::device_context::DeviceContext,
};

/// Rasterizer viewport covering the whole render target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn init(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            log::error!("Viewport::init: width or height is zero ({width}x{height})");
            return Err(GraphicsError::InvalidDimensions { width, height });
        }
        Ok(Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        })
    }

    pub fn render(&self, ctx: &mut DeviceContext) {
        ctx.set_viewport(*self);
    }
}
