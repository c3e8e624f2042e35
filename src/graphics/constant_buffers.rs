//! CPU mirrors of the shader's uniform blocks.
//!
//! These must stay byte-identical to the structs declared in
//! `assets/shaders/engine.wgsl`. Matrices are stored column by column.

/// Camera view, bound to slot 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CBNeverChanges {
    pub view: [[f32; 4]; 4],
}

/// Projection, bound to slot 1. Rewritten whenever the window is resized.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CBChangeOnResize {
    pub projection: [[f32; 4]; 4],
}

/// Per-actor world matrix and tint, bound to slot 2.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CBChangesEveryFrame {
    pub world: [[f32; 4]; 4],
    pub mesh_color: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<CBNeverChanges>() == 64);
const _: () = assert!(std::mem::size_of::<CBChangeOnResize>() == 64);
const _: () = assert!(std::mem::size_of::<CBChangesEveryFrame>() == 80);

impl Default for CBNeverChanges {
    fn default() -> Self {
        Self {
            view: to_shader_matrix(cgmath::SquareMatrix::identity()),
        }
    }
}

impl Default for CBChangeOnResize {
    fn default() -> Self {
        Self {
            projection: to_shader_matrix(cgmath::SquareMatrix::identity()),
        }
    }
}

impl Default for CBChangesEveryFrame {
    fn default() -> Self {
        Self {
            world: to_shader_matrix(cgmath::SquareMatrix::identity()),
            mesh_color: [0.7, 0.7, 0.7, 1.0],
        }
    }
}

/// Column-major array layout of `m`, as WGSL `mat4x4<f32>` reads it.
pub fn to_shader_matrix(m: cgmath::Matrix4<f32>) -> [[f32; 4]; 4] {
    m.into()
}
