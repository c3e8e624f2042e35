//! Backend-neutral geometry for 2D overlays such as the inspector UI.

use std::ops::Range;

use crate::graphics::backend::ResourceId;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<OverlayVertex>() == 20);

/// One clipped, textured draw inside an [`OverlayFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDraw {
    /// `[min_x, min_y, max_x, max_y]` in display coordinates.
    pub clip_rect: [f32; 4],
    pub indices: Range<u32>,
    pub base_vertex: i32,
    pub texture: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayFrame {
    pub display_pos: [f32; 2],
    pub display_size: [f32; 2],
    pub vertices: Vec<OverlayVertex>,
    pub indices: Vec<u16>,
    pub draws: Vec<OverlayDraw>,
}

impl OverlayFrame {
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Clip rectangle converted to a scissor rectangle of a `width`x`height`
    /// target, or `None` when nothing of it is visible.
    pub fn scissor(&self, draw: &OverlayDraw, width: u32, height: u32) -> Option<[u32; 4]> {
        let [min_x, min_y, max_x, max_y] = draw.clip_rect;
        let min_x = (min_x - self.display_pos[0]).max(0.0);
        let min_y = (min_y - self.display_pos[1]).max(0.0);
        let max_x = (max_x - self.display_pos[0]).min(width as f32);
        let max_y = (max_y - self.display_pos[1]).min(height as f32);
        if max_x <= min_x || max_y <= min_y {
            return None;
        }
        Some([
            min_x as u32,
            min_y as u32,
            (max_x - min_x) as u32,
            (max_y - min_y) as u32,
        ])
    }
}
