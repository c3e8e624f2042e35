//! CPU-side geometry of one mesh.

/// One vertex as the engine shader reads it: `POSITION` then `TEXCOORD`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimpleVertex {
    pub pos: [f32; 3],
    pub tex: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<SimpleVertex>() == 20);

impl SimpleVertex {
    pub fn new(pos: [f32; 3], tex: [f32; 2]) -> Self {
        Self { pos, tex }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshComponent {
    pub name: String,
    pub vertices: Vec<SimpleVertex>,
    pub indices: Vec<u32>,
}

impl MeshComponent {
    pub fn new(name: impl Into<String>, vertices: Vec<SimpleVertex>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn num_vertex(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_index(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}
