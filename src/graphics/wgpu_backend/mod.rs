//! [`Backend`] on top of wgpu, presenting to a winit window.
//!
//! Resources live in id-keyed maps. Recorded commands are replayed into
//! render passes on [`Backend::execute`]; a new pass starts whenever the
//! output targets change, and clears recorded before the first draw of a
//! pass become its load operations.

mod overlay;
mod pipeline;
mod replay;

use std::{
    any::Any,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{
            Backend, BufferDesc, BufferKind, Format, ResourceId, SamplerDesc, ShaderProgramDesc,
            TextureDesc, TextureUsage,
        },
        command::Command,
    },
};

use self::{
    overlay::OverlayRenderer,
    pipeline::{PipelineKey, create_sampler, engine_bind_group_layout, texture_format, vertex_attributes},
    replay::Bindings,
};

/// Large enough for the biggest uniform block of `engine.wgsl`.
const FALLBACK_UNIFORM_SIZE: u64 = 256;

struct GpuTexture {
    #[allow(unused)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

enum GpuView {
    /// A view of whatever surface texture the current frame renders to.
    BackBuffer,
    Texture {
        view: wgpu::TextureView,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    },
}

struct GpuProgram {
    module: wgpu::ShaderModule,
    vertex_entry: String,
    pixel_entry: String,
    stride: u32,
    attributes: Vec<wgpu::VertexAttribute>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

/// Bound when a draw finds nothing at a binding.
struct Fallbacks {
    uniform: wgpu::Buffer,
    texture: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

pub struct WgpuBackend {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    is_surface_configured: bool,
    frame: Option<(wgpu::SurfaceTexture, wgpu::TextureView)>,

    buffers: HashMap<ResourceId, wgpu::Buffer>,
    textures: HashMap<ResourceId, GpuTexture>,
    back_buffers: HashSet<ResourceId>,
    views: HashMap<ResourceId, GpuView>,
    samplers: HashMap<ResourceId, wgpu::Sampler>,
    programs: HashMap<ResourceId, GpuProgram>,

    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    bind_groups: HashMap<[Option<ResourceId>; 5], wgpu::BindGroup>,
    fallbacks: Fallbacks,
    overlay: OverlayRenderer,
    bindings: Bindings,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("surface_format", &self.config.format)
            .field("size", &(self.config.width, self.config.height))
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        log::info!("WgpuBackend: setting up instance");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GraphicsError::Backend(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GraphicsError::Backend(e.to_string()))?;
        log::info!("WgpuBackend: adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kamogawa device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| GraphicsError::Backend(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| GraphicsError::Backend("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let bind_group_layout = engine_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("engine pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let fallbacks = Fallbacks::new(&device, &queue);
        let overlay = OverlayRenderer::new(&device);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            is_surface_configured: false,
            frame: None,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            back_buffers: HashSet::new(),
            views: HashMap::new(),
            samplers: HashMap::new(),
            programs: HashMap::new(),
            bind_group_layout,
            pipeline_layout,
            bind_groups: HashMap::new(),
            fallbacks,
            overlay,
            bindings: Bindings::default(),
        })
    }

    fn configure(&mut self, width: u32, height: u32) {
        // the surface cannot be reconfigured while a frame is outstanding
        self.frame = None;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.is_surface_configured = true;
    }

    /// View of the surface texture of the frame being recorded, acquired on
    /// first use.
    fn frame_view(&mut self) -> Result<wgpu::TextureView> {
        if !self.is_surface_configured {
            return Err(GraphicsError::NoSwapChain);
        }
        if let Some((_, view)) = &self.frame {
            return Ok(view.clone());
        }
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("WgpuBackend: surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| GraphicsError::Backend(e.to_string()))?
            }
            Err(e) => return Err(GraphicsError::Backend(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some((output, view.clone()));
        Ok(view)
    }

    fn texture_of(&self, id: ResourceId) -> Result<&GpuTexture> {
        self.textures.get(&id).ok_or(GraphicsError::UnknownResource(id))
    }
}

impl Fallbacks {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fallback uniform"),
            size: FALLBACK_UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fallback texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );
        Self {
            uniform,
            texture: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: create_sampler(device, &SamplerDesc::default()),
        }
    }
}

impl Backend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn create_buffer(&mut self, id: ResourceId, desc: &BufferDesc, contents: Option<&[u8]>) -> Result<()> {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Constant => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;
        let buffer = match contents {
            Some(contents) => {
                let mut bytes = contents.to_vec();
                bytes.resize(desc.byte_width as usize, 0);
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&desc.label),
                        contents: &bytes,
                        usage,
                    })
            }
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&desc.label),
                size: desc.byte_width.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
                usage,
                mapped_at_creation: false,
            }),
        };
        self.buffers.insert(id, buffer);
        Ok(())
    }

    fn create_texture(&mut self, id: ResourceId, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<()> {
        let format = texture_format(desc.format)?;
        let usage = match desc.usage {
            TextureUsage::ShaderResource => {
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST
            }
            TextureUsage::DepthStencil => wgpu::TextureUsages::RENDER_ATTACHMENT,
            TextureUsage::RenderTarget => {
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
            }
        };
        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size,
            mip_level_count: 1,
            sample_count: desc.sample_count.max(1),
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        if let Some(pixels) = pixels {
            let bytes_per_row = desc.width * desc.format.byte_size();
            if pixels.len() as u64 != bytes_per_row as u64 * desc.height as u64 {
                return Err(GraphicsError::BufferTooSmall {
                    size: pixels.len() as u64,
                    needed: bytes_per_row as u64 * desc.height as u64,
                });
            }
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(desc.height),
                },
                size,
            );
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                format,
                size: (desc.width, desc.height),
            },
        );
        Ok(())
    }

    fn create_render_target_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        if self.back_buffers.contains(&texture) {
            log::debug!(
                "WgpuBackend: back buffer view requested as {format:?}, using {:?}",
                self.config.format
            );
            self.views.insert(id, GpuView::BackBuffer);
            return Ok(());
        }
        let gpu = self.texture_of(texture)?;
        let view = GpuView::Texture {
            view: gpu.view.clone(),
            format: gpu.format,
            size: gpu.size,
        };
        self.views.insert(id, view);
        Ok(())
    }

    fn create_depth_stencil_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        if !format.is_depth() {
            return Err(GraphicsError::Backend(format!("{format:?} is not a depth format")));
        }
        let gpu = self.texture_of(texture)?;
        let view = GpuView::Texture {
            view: gpu.view.clone(),
            format: gpu.format,
            size: gpu.size,
        };
        self.views.insert(id, view);
        Ok(())
    }

    fn create_sampler(&mut self, id: ResourceId, desc: &SamplerDesc) -> Result<()> {
        let sampler = create_sampler(&self.device, desc);
        self.samplers.insert(id, sampler);
        Ok(())
    }

    fn create_shader_program(&mut self, id: ResourceId, desc: &ShaderProgramDesc) -> Result<()> {
        desc.check_entry_points()?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.as_str().into()),
        });
        let program = GpuProgram {
            module,
            vertex_entry: desc.vertex_entry.clone(),
            pixel_entry: desc.pixel_entry.clone(),
            stride: desc.input_layout.stride(),
            attributes: vertex_attributes(&desc.input_layout)?,
            pipelines: HashMap::new(),
        };
        self.programs.insert(id, program);
        Ok(())
    }

    fn release(&mut self, id: ResourceId) {
        let removed = self.buffers.remove(&id).is_some()
            | self.textures.remove(&id).is_some()
            | self.back_buffers.remove(&id)
            | self.views.remove(&id).is_some()
            | self.samplers.remove(&id).is_some()
            | self.programs.remove(&id).is_some();
        if removed {
            self.bind_groups.retain(|key, _| !key.contains(&Some(id)));
            self.bindings.forget(id);
        }
    }

    fn create_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.configure(width, height);
        log::info!(
            "WgpuBackend: surface configured {width}x{height} as {:?}",
            self.config.format
        );
        Ok(())
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.configure(width, height);
        Ok(())
    }

    fn acquire_back_buffer(&mut self, id: ResourceId) -> Result<()> {
        if !self.is_surface_configured {
            return Err(GraphicsError::NoSwapChain);
        }
        self.back_buffers.insert(id);
        Ok(())
    }

    fn execute(&mut self, commands: &[Command]) -> Result<()> {
        self.replay(commands)
    }

    fn present(&mut self) -> Result<()> {
        match self.frame.take() {
            Some((output, _)) => {
                self.window.pre_present_notify();
                output.present();
            }
            None => log::debug!("WgpuBackend: nothing rendered, skipping present"),
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
