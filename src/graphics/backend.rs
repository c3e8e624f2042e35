//! The seam between the immediate-context facade and a native graphics API.
//!
//! Every resource the facade creates is identified by a [`ResourceId`]
//! allocated by [`GraphicsDevice`](super::device::GraphicsDevice). A backend
//! materialises the resource under that id and later replays recorded
//! [`Command`]s against it.

use std::any::Any;

use crate::{
    error::{GraphicsError, Result},
    graphics::{command::Command, input_layout::InputLayout},
};

/// Opaque handle to a resource owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) u32);

impl ResourceId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// What a live [`ResourceId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    BackBuffer,
    RenderTargetView,
    DepthStencilView,
    Sampler,
    ShaderProgram,
}

/// Element and texel formats, named after the DXGI formats the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    D24UnormS8Uint,
    D32Float,
    R32G32B32Float,
    R32G32Float,
    R32Uint,
    R16Uint,
}

impl Format {
    /// Size of one element in bytes.
    pub fn byte_size(self) -> u32 {
        match self {
            Format::R8G8B8A8Unorm
            | Format::R8G8B8A8UnormSrgb
            | Format::D24UnormS8Uint
            | Format::D32Float
            | Format::R32Uint => 4,
            Format::R32G32B32Float => 12,
            Format::R32G32Float => 8,
            Format::R16Uint => 2,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, Format::D24UnormS8Uint | Format::D32Float)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    Constant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferDesc {
    pub label: String,
    pub kind: BufferKind,
    pub byte_width: u64,
    /// Element size for vertex and index buffers, zero for constant buffers.
    pub stride: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    ShaderResource,
    DepthStencil,
    RenderTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub usage: TextureUsage,
    pub sample_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    MinMagMipLinear,
    MinMagMipPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Wrap,
    Clamp,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            filter: Filter::MinMagMipLinear,
            address_u: AddressMode::Wrap,
            address_v: AddressMode::Wrap,
            address_w: AddressMode::Wrap,
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShaderProgramDesc {
    pub label: String,
    pub source: String,
    pub vertex_entry: String,
    pub pixel_entry: String,
    pub input_layout: InputLayout,
}

impl ShaderProgramDesc {
    /// Fails when the source does not declare both entry points.
    pub fn check_entry_points(&self) -> Result<()> {
        for entry in [&self.vertex_entry, &self.pixel_entry] {
            if !self.source.contains(&format!("fn {entry}(")) {
                return Err(GraphicsError::Backend(format!("entry point {entry} not found")));
            }
        }
        Ok(())
    }
}

/// A native graphics API as seen by the facade.
///
/// Creation calls receive the id the device has already allocated; the
/// backend must keep the resource reachable under that id until
/// [`Backend::release`]. Binding state set by [`Backend::execute`] persists
/// across calls until a [`Command::ClearState`] is replayed.
pub trait Backend {
    fn name(&self) -> &'static str;

    fn create_buffer(
        &mut self,
        id: ResourceId,
        desc: &BufferDesc,
        contents: Option<&[u8]>,
    ) -> Result<()>;

    fn create_texture(
        &mut self,
        id: ResourceId,
        desc: &TextureDesc,
        pixels: Option<&[u8]>,
    ) -> Result<()>;

    fn create_render_target_view(
        &mut self,
        id: ResourceId,
        texture: ResourceId,
        format: Format,
    ) -> Result<()>;

    fn create_depth_stencil_view(
        &mut self,
        id: ResourceId,
        texture: ResourceId,
        format: Format,
    ) -> Result<()>;

    fn create_sampler(&mut self, id: ResourceId, desc: &SamplerDesc) -> Result<()>;

    fn create_shader_program(&mut self, id: ResourceId, desc: &ShaderProgramDesc) -> Result<()>;

    fn release(&mut self, id: ResourceId);

    fn create_swap_chain(&mut self, width: u32, height: u32) -> Result<()>;

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()>;

    /// Makes `id` refer to the swap chain's current back buffer.
    fn acquire_back_buffer(&mut self, id: ResourceId) -> Result<()>;

    fn execute(&mut self, commands: &[Command]) -> Result<()>;

    fn present(&mut self) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}
