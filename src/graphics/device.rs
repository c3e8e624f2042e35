//! Resource factory on top of a [`Backend`].
//!
//! The device hands out [`ResourceId`]s and keeps a ledger of live
//! resources. The ledger is what enforces the swap chain contract: the back
//! buffer cannot be resized while it, or a view created from it, is alive.

use std::collections::HashMap;

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{
            Backend, BufferDesc, Format, ResourceId, ResourceKind, SamplerDesc,
            ShaderProgramDesc, TextureDesc,
        },
        command::Command,
    },
};

#[derive(Debug, Clone)]
struct LiveResource {
    kind: ResourceKind,
    parent: Option<ResourceId>,
    label: String,
}

pub struct GraphicsDevice {
    backend: Box<dyn Backend>,
    next_id: u32,
    live: HashMap<ResourceId, LiveResource>,
    swap_chain: Option<(u32, u32)>,
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("backend", &self.backend.name())
            .field("live", &self.live.len())
            .field("swap_chain", &self.swap_chain)
            .finish()
    }
}

impl GraphicsDevice {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        log::info!("GraphicsDevice: using the {} backend", backend.name());
        Self {
            backend,
            next_id: 1,
            live: HashMap::new(),
            swap_chain: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The concrete backend, if it is a `B`.
    pub fn backend<B: Backend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_count_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|r| r.kind == kind).count()
    }

    fn reserve(&mut self) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        id
    }

    fn track(&mut self, id: ResourceId, kind: ResourceKind, parent: Option<ResourceId>, label: &str) {
        self.live.insert(
            id,
            LiveResource {
                kind,
                parent,
                label: label.to_string(),
            },
        );
    }

    fn require(&self, id: ResourceId) -> Result<&LiveResource> {
        self.live.get(&id).ok_or(GraphicsError::UnknownResource(id))
    }

    pub fn create_buffer(&mut self, desc: &BufferDesc, contents: Option<&[u8]>) -> Result<ResourceId> {
        if let Some(contents) = contents {
            if contents.len() as u64 > desc.byte_width {
                return Err(GraphicsError::BufferTooSmall {
                    size: desc.byte_width,
                    needed: contents.len() as u64,
                });
            }
        }
        let id = self.reserve();
        self.backend.create_buffer(id, desc, contents)?;
        self.track(id, ResourceKind::Buffer, None, &desc.label);
        Ok(id)
    }

    pub fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<ResourceId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(GraphicsError::InvalidDimensions {
                width: desc.width,
                height: desc.height,
            });
        }
        let id = self.reserve();
        self.backend.create_texture(id, desc, pixels)?;
        self.track(id, ResourceKind::Texture, None, &desc.label);
        Ok(id)
    }

    pub fn create_render_target_view(&mut self, texture: ResourceId, format: Format) -> Result<ResourceId> {
        let label = format!("{} RTV", self.require(texture)?.label);
        let id = self.reserve();
        self.backend.create_render_target_view(id, texture, format)?;
        self.track(id, ResourceKind::RenderTargetView, Some(texture), &label);
        Ok(id)
    }

    pub fn create_depth_stencil_view(&mut self, texture: ResourceId, format: Format) -> Result<ResourceId> {
        let label = format!("{} DSV", self.require(texture)?.label);
        let id = self.reserve();
        self.backend.create_depth_stencil_view(id, texture, format)?;
        self.track(id, ResourceKind::DepthStencilView, Some(texture), &label);
        Ok(id)
    }

    pub fn create_sampler_state(&mut self, desc: &SamplerDesc) -> Result<ResourceId> {
        let id = self.reserve();
        self.backend.create_sampler(id, desc)?;
        self.track(id, ResourceKind::Sampler, None, "sampler");
        Ok(id)
    }

    pub fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<ResourceId> {
        let id = self.reserve();
        self.backend.create_shader_program(id, desc)?;
        self.track(id, ResourceKind::ShaderProgram, None, &desc.label);
        Ok(id)
    }

    pub fn create_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(GraphicsError::InvalidDimensions { width, height });
        }
        self.backend.create_swap_chain(width, height)?;
        self.swap_chain = Some((width, height));
        Ok(())
    }

    pub fn swap_chain_size(&self) -> Option<(u32, u32)> {
        self.swap_chain
    }

    /// Live back buffers plus live views created from them.
    pub fn back_buffer_references(&self) -> usize {
        self.live
            .values()
            .filter(|r| {
                r.kind == ResourceKind::BackBuffer
                    || r.parent
                        .and_then(|p| self.live.get(&p))
                        .is_some_and(|p| p.kind == ResourceKind::BackBuffer)
            })
            .count()
    }

    pub fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        if self.swap_chain.is_none() {
            return Err(GraphicsError::NoSwapChain);
        }
        if width == 0 || height == 0 {
            return Err(GraphicsError::InvalidDimensions { width, height });
        }
        let in_use = self.back_buffer_references();
        if in_use > 0 {
            return Err(GraphicsError::SwapChainBuffersInUse(in_use));
        }
        self.backend.resize_swap_chain(width, height)?;
        self.swap_chain = Some((width, height));
        Ok(())
    }

    pub fn acquire_back_buffer(&mut self) -> Result<ResourceId> {
        if self.swap_chain.is_none() {
            return Err(GraphicsError::NoSwapChain);
        }
        let id = self.reserve();
        self.backend.acquire_back_buffer(id)?;
        self.track(id, ResourceKind::BackBuffer, None, "back buffer");
        Ok(id)
    }

    /// Releases a resource. Releasing an id twice is a no-op.
    pub fn release(&mut self, id: ResourceId) {
        if self.live.remove(&id).is_some() {
            self.backend.release(id);
        } else {
            log::warn!("GraphicsDevice::release: {id:?} is not live");
        }
    }

    pub(crate) fn execute(&mut self, commands: &[Command]) -> Result<()> {
        self.backend.execute(commands)
    }

    pub(crate) fn present(&mut self) -> Result<()> {
        if self.swap_chain.is_none() {
            return Err(GraphicsError::NoSwapChain);
        }
        self.backend.present()
    }
}
