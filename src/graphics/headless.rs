//! A backend without a GPU. It validates and records everything the facade
//! submits, which makes it the backend of the test suite and of
//! `--headless-frames` runs.

use std::{any::Any, collections::HashMap};

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{
            Backend, BufferDesc, Format, ResourceId, SamplerDesc, ShaderProgramDesc, TextureDesc,
        },
        command::{Command, PrimitiveTopology, ShaderStage},
        viewport::Viewport,
    },
};

/// What the headless backend remembers about a live resource.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessResource {
    Buffer { desc: BufferDesc, contents: Vec<u8> },
    Texture { desc: TextureDesc },
    BackBuffer { width: u32, height: u32 },
    RenderTargetView { texture: ResourceId, format: Format },
    DepthStencilView { texture: ResourceId, format: Format },
    Sampler(SamplerDesc),
    ShaderProgram { label: String },
}

/// Pipeline bindings as they stand after the last replayed command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundState {
    pub render_target: Option<ResourceId>,
    pub depth_stencil: Option<ResourceId>,
    pub viewport: Option<Viewport>,
    pub program: Option<ResourceId>,
    pub vertex_buffer: Option<ResourceId>,
    pub index_buffer: Option<ResourceId>,
    pub topology: Option<PrimitiveTopology>,
    pub vertex_constant_buffers: [Option<ResourceId>; 3],
    pub pixel_constant_buffers: [Option<ResourceId>; 3],
    pub texture: Option<ResourceId>,
    pub sampler: Option<ResourceId>,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    resources: HashMap<ResourceId, HeadlessResource>,
    surface: Option<(u32, u32)>,
    state: BoundState,
    batches: Vec<Vec<Command>>,
    presented: Vec<Vec<Command>>,
    pending: Vec<Command>,
    resizes: Vec<(u32, u32)>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(&self, id: ResourceId) -> Option<&HeadlessResource> {
        self.resources.get(&id)
    }

    pub fn live_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.resources.keys().copied()
    }

    /// Current bytes of a buffer, including replayed updates.
    pub fn buffer_contents(&self, id: ResourceId) -> Option<&[u8]> {
        match self.resources.get(&id)? {
            HeadlessResource::Buffer { contents, .. } => Some(contents),
            _ => None,
        }
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface
    }

    pub fn state(&self) -> &BoundState {
        &self.state
    }

    /// Every batch handed to [`Backend::execute`], oldest first.
    pub fn batches(&self) -> &[Vec<Command>] {
        &self.batches
    }

    /// Commands of every presented frame, oldest first.
    pub fn frames(&self) -> &[Vec<Command>] {
        &self.presented
    }

    pub fn present_count(&self) -> usize {
        self.presented.len()
    }

    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    fn insert(&mut self, id: ResourceId, resource: HeadlessResource) -> Result<()> {
        if self.resources.insert(id, resource).is_some() {
            return Err(GraphicsError::Backend(format!("{id:?} created twice")));
        }
        Ok(())
    }

    fn require_texture(&self, texture: ResourceId) -> Result<()> {
        match self.resources.get(&texture) {
            Some(HeadlessResource::Texture { .. } | HeadlessResource::BackBuffer { .. }) => Ok(()),
            _ => Err(GraphicsError::UnknownResource(texture)),
        }
    }

    fn replay(&mut self, command: &Command) -> Result<()> {
        command.check_slots()?;
        for id in command.resources() {
            if !self.resources.contains_key(&id) {
                return Err(GraphicsError::UnknownResource(id));
            }
        }
        let state = &mut self.state;
        match command {
            Command::ClearState => *state = BoundState::default(),
            Command::SetRenderTargets {
                render_target,
                depth_stencil,
            } => {
                state.render_target = *render_target;
                state.depth_stencil = *depth_stencil;
            }
            Command::SetViewport(viewport) => state.viewport = Some(*viewport),
            Command::SetShaderProgram(id) => state.program = Some(*id),
            Command::SetVertexBuffer { buffer, .. } => state.vertex_buffer = Some(*buffer),
            Command::SetIndexBuffer { buffer, .. } => state.index_buffer = Some(*buffer),
            Command::SetPrimitiveTopology(topology) => state.topology = Some(*topology),
            Command::SetConstantBuffer {
                stage,
                slot,
                buffer,
            } => {
                let slots = match stage {
                    ShaderStage::Vertex => &mut state.vertex_constant_buffers,
                    ShaderStage::Pixel => &mut state.pixel_constant_buffers,
                };
                slots[*slot as usize] = Some(*buffer);
            }
            Command::SetShaderResource { texture, .. } => state.texture = Some(*texture),
            Command::SetSampler { sampler, .. } => state.sampler = Some(*sampler),
            Command::UpdateBuffer { buffer, data } => {
                if let Some(HeadlessResource::Buffer { desc, contents }) =
                    self.resources.get_mut(buffer)
                {
                    if data.len() as u64 > desc.byte_width {
                        return Err(GraphicsError::BufferTooSmall {
                            size: desc.byte_width,
                            needed: data.len() as u64,
                        });
                    }
                    contents[..data.len()].copy_from_slice(data);
                }
            }
            Command::DrawIndexed { .. } => {
                if state.program.is_none() || state.index_buffer.is_none() {
                    return Err(GraphicsError::Backend(
                        "draw without a shader program or index buffer".into(),
                    ));
                }
            }
            Command::ClearRenderTarget { .. }
            | Command::ClearDepthStencil { .. }
            | Command::DrawOverlay(_) => {}
        }
        Ok(())
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_buffer(&mut self, id: ResourceId, desc: &BufferDesc, contents: Option<&[u8]>) -> Result<()> {
        let mut bytes = vec![0; desc.byte_width as usize];
        if let Some(contents) = contents {
            bytes[..contents.len()].copy_from_slice(contents);
        }
        self.insert(
            id,
            HeadlessResource::Buffer {
                desc: desc.clone(),
                contents: bytes,
            },
        )
    }

    fn create_texture(&mut self, id: ResourceId, desc: &TextureDesc, _pixels: Option<&[u8]>) -> Result<()> {
        self.insert(id, HeadlessResource::Texture { desc: desc.clone() })
    }

    fn create_render_target_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        self.require_texture(texture)?;
        self.insert(id, HeadlessResource::RenderTargetView { texture, format })
    }

    fn create_depth_stencil_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        self.require_texture(texture)?;
        if !format.is_depth() {
            return Err(GraphicsError::Backend(format!("{format:?} is not a depth format")));
        }
        self.insert(id, HeadlessResource::DepthStencilView { texture, format })
    }

    fn create_sampler(&mut self, id: ResourceId, desc: &SamplerDesc) -> Result<()> {
        self.insert(id, HeadlessResource::Sampler(*desc))
    }

    fn create_shader_program(&mut self, id: ResourceId, desc: &ShaderProgramDesc) -> Result<()> {
        desc.check_entry_points()?;
        self.insert(
            id,
            HeadlessResource::ShaderProgram {
                label: desc.label.clone(),
            },
        )
    }

    fn release(&mut self, id: ResourceId) {
        self.resources.remove(&id);
    }

    fn create_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface = Some((width, height));
        Ok(())
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface = Some((width, height));
        self.resizes.push((width, height));
        Ok(())
    }

    fn acquire_back_buffer(&mut self, id: ResourceId) -> Result<()> {
        let (width, height) = self.surface.ok_or(GraphicsError::NoSwapChain)?;
        self.insert(id, HeadlessResource::BackBuffer { width, height })
    }

    fn execute(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.replay(command)?;
        }
        self.pending.extend_from_slice(commands);
        self.batches.push(commands.to_vec());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presented.push(std::mem::take(&mut self.pending));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
