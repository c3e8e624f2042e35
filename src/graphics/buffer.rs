//! Vertex, index and constant buffers.

use crate::{
    ecs::mesh_component::{MeshComponent, SimpleVertex},
    error::{GraphicsError, Result},
    graphics::{
        backend::{BufferDesc, BufferKind, Format, ResourceId},
        command::ShaderStage,
        device::GraphicsDevice,
        device_context::DeviceContext,
    },
};

#[derive(Debug, PartialEq, Eq)]
pub struct Buffer {
    id: ResourceId,
    kind: BufferKind,
    stride: u32,
    offset: u32,
    byte_width: u64,
}

impl Buffer {
    /// Creates a vertex or index buffer holding `mesh`'s geometry.
    pub fn from_mesh(device: &mut GraphicsDevice, mesh: &MeshComponent, kind: BufferKind) -> Result<Self> {
        let (label, stride, bytes): (_, u32, &[u8]) = match kind {
            BufferKind::Vertex => (
                format!("{} vertex buffer", mesh.name),
                std::mem::size_of::<SimpleVertex>() as u32,
                bytemuck::cast_slice(&mesh.vertices),
            ),
            BufferKind::Index => (
                format!("{} index buffer", mesh.name),
                std::mem::size_of::<u32>() as u32,
                bytemuck::cast_slice(&mesh.indices),
            ),
            BufferKind::Constant => {
                return Err(GraphicsError::Backend(format!(
                    "mesh {} cannot be uploaded as a constant buffer",
                    mesh.name
                )));
            }
        };
        if bytes.is_empty() {
            log::error!("Buffer::from_mesh: {label} has no data");
            return Err(GraphicsError::EmptyBuffer(label));
        }
        let desc = BufferDesc {
            label,
            kind,
            byte_width: bytes.len() as u64,
            stride,
        };
        let id = device.create_buffer(&desc, Some(bytes))?;
        Ok(Self {
            id,
            kind,
            stride,
            offset: 0,
            byte_width: desc.byte_width,
        })
    }

    /// Creates an uninitialised constant buffer of `byte_width` bytes.
    pub fn constant(device: &mut GraphicsDevice, label: &str, byte_width: u64) -> Result<Self> {
        if byte_width == 0 {
            return Err(GraphicsError::EmptyBuffer(label.to_string()));
        }
        let desc = BufferDesc {
            label: label.to_string(),
            kind: BufferKind::Constant,
            byte_width,
            stride: 0,
        };
        let id = device.create_buffer(&desc, None)?;
        Ok(Self {
            id,
            kind: BufferKind::Constant,
            stride: 0,
            offset: 0,
            byte_width,
        })
    }

    /// Constant buffer sized for `T`.
    pub fn constant_for<T: bytemuck::Pod>(device: &mut GraphicsDevice, label: &str) -> Result<Self> {
        Self::constant(device, label, std::mem::size_of::<T>() as u64)
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Number of vertices or indices held, zero for constant buffers.
    pub fn element_count(&self) -> u32 {
        if self.stride == 0 {
            return 0;
        }
        (self.byte_width / self.stride as u64) as u32
    }

    pub fn index_format(&self) -> Format {
        if self.stride == 2 {
            Format::R16Uint
        } else {
            Format::R32Uint
        }
    }

    /// Records a full overwrite of the buffer with `value`.
    pub fn update<T: bytemuck::Pod>(&self, ctx: &mut DeviceContext, value: &T) -> Result<()> {
        let bytes = bytemuck::bytes_of(value);
        if bytes.len() as u64 > self.byte_width {
            return Err(GraphicsError::BufferTooSmall {
                size: self.byte_width,
                needed: bytes.len() as u64,
            });
        }
        ctx.update_subresource(self.id, bytes);
        Ok(())
    }

    /// Binds the buffer where its kind belongs. Constant buffers always go to
    /// the vertex stage and also to the pixel stage if `set_pixel_shader`.
    pub fn render(&self, ctx: &mut DeviceContext, start_slot: u32, set_pixel_shader: bool) {
        match self.kind {
            BufferKind::Vertex => {
                ctx.set_vertex_buffer(start_slot, self.id, self.stride, self.offset)
            }
            BufferKind::Index => ctx.set_index_buffer(self.id, self.index_format(), self.offset),
            BufferKind::Constant => {
                ctx.set_constant_buffer(ShaderStage::Vertex, start_slot, self.id);
                if set_pixel_shader {
                    ctx.set_constant_buffer(ShaderStage::Pixel, start_slot, self.id);
                }
            }
        }
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }
}
