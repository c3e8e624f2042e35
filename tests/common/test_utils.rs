#![allow(dead_code)]

use std::{any::Any, cell::Cell, rc::Rc};

use kamogawa::{
    BaseApp, EngineConfig,
    ecs::mesh_component::{MeshComponent, SimpleVertex},
    error::{GraphicsError, Result},
    graphics::{
        Backend, Format, GraphicsDevice, HeadlessBackend, ResourceId, Texture,
        backend::{BufferDesc, SamplerDesc, ShaderProgramDesc, TextureDesc},
        command::Command,
    },
};

pub fn headless_device() -> GraphicsDevice {
    GraphicsDevice::new(Box::new(HeadlessBackend::new()))
}

/// A device with a swap chain, so frames can be presented.
pub fn presenting_device(width: u32, height: u32) -> GraphicsDevice {
    let mut device = headless_device();
    device.create_swap_chain(width, height).unwrap();
    device
}

pub fn headless(device: &GraphicsDevice) -> &HeadlessBackend {
    device
        .backend::<HeadlessBackend>()
        .expect("device should run on the headless backend")
}

pub fn triangle(name: &str) -> MeshComponent {
    MeshComponent::new(
        name,
        vec![
            SimpleVertex::new([0.0, 0.0, 0.0], [0.0, 1.0]),
            SimpleVertex::new([0.0, 1.0, 0.0], [0.0, 0.0]),
            SimpleVertex::new([1.0, 0.0, 0.0], [1.0, 1.0]),
        ],
        vec![0, 1, 2],
    )
}

/// Eight corners, twelve triangles.
pub fn cube(name: &str) -> MeshComponent {
    let vertices = (0..8)
        .map(|i| {
            let corner = |bit: u32| if i & bit == 0 { -0.5 } else { 0.5 };
            SimpleVertex::new([corner(1), corner(2), corner(4)], [0.0, 0.0])
        })
        .collect();
    let indices = vec![
        0, 2, 3, 0, 3, 1, 4, 5, 7, 4, 7, 6, 0, 4, 6, 0, 6, 2, 1, 3, 7, 1, 7, 5, 2, 6, 7, 2, 7, 3, 0,
        1, 5, 0, 5, 4,
    ];
    MeshComponent::new(name, vertices, indices)
}

pub fn white_texture(device: &mut GraphicsDevice, label: &str) -> Texture {
    Texture::from_rgba(device, label, 1, 1, &[255, 255, 255, 255]).unwrap()
}

/// Index counts of every draw in `commands`, in order.
pub fn draw_sizes(commands: &[Command]) -> Vec<u32> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::DrawIndexed { index_count, .. } => Some(*index_count),
            _ => None,
        })
        .collect()
}

/// Textures bound by `commands`, one entry per draw: the texture bound
/// since the previous draw, if any.
pub fn textures_per_draw(commands: &[Command]) -> Vec<Option<kamogawa::graphics::ResourceId>> {
    let mut bound = None;
    let mut out = Vec::new();
    for command in commands {
        match command {
            Command::SetShaderResource { texture, .. } => bound = Some(*texture),
            Command::DrawIndexed { .. } => out.push(bound.take()),
            _ => {}
        }
    }
    out
}

pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.window.width = 800;
    config.window.height = 600;
    config
}

pub fn headless_app() -> BaseApp {
    BaseApp::init(test_config(), Box::new(HeadlessBackend::new())).unwrap()
}

pub fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-4, "{a} != {b}");
}

pub const SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/engine.wgsl");

pub fn engine_shader(device: &mut GraphicsDevice) -> kamogawa::graphics::ShaderProgram {
    kamogawa::graphics::ShaderProgram::init(
        device,
        SHADER,
        kamogawa::graphics::input_layout::InputLayout::position_texcoord(),
    )
    .unwrap()
}

/// A headless backend whose next `failures` depth-stencil views cannot be
/// created. Downcasts to the wrapped [`HeadlessBackend`].
pub struct FailingDepthViews {
    inner: HeadlessBackend,
    failures: Rc<Cell<u32>>,
}

impl FailingDepthViews {
    pub fn new(failures: Rc<Cell<u32>>) -> Self {
        Self {
            inner: HeadlessBackend::new(),
            failures,
        }
    }
}

impl Backend for FailingDepthViews {
    fn name(&self) -> &'static str {
        "failing depth views"
    }

    fn create_buffer(&mut self, id: ResourceId, desc: &BufferDesc, contents: Option<&[u8]>) -> Result<()> {
        self.inner.create_buffer(id, desc, contents)
    }

    fn create_texture(&mut self, id: ResourceId, desc: &TextureDesc, pixels: Option<&[u8]>) -> Result<()> {
        self.inner.create_texture(id, desc, pixels)
    }

    fn create_render_target_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        self.inner.create_render_target_view(id, texture, format)
    }

    fn create_depth_stencil_view(&mut self, id: ResourceId, texture: ResourceId, format: Format) -> Result<()> {
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(GraphicsError::Backend("out of depth stencil views".into()));
        }
        self.inner.create_depth_stencil_view(id, texture, format)
    }

    fn create_sampler(&mut self, id: ResourceId, desc: &SamplerDesc) -> Result<()> {
        self.inner.create_sampler(id, desc)
    }

    fn create_shader_program(&mut self, id: ResourceId, desc: &ShaderProgramDesc) -> Result<()> {
        self.inner.create_shader_program(id, desc)
    }

    fn release(&mut self, id: ResourceId) {
        self.inner.release(id)
    }

    fn create_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.create_swap_chain(width, height)
    }

    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.resize_swap_chain(width, height)
    }

    fn acquire_back_buffer(&mut self, id: ResourceId) -> Result<()> {
        self.inner.acquire_back_buffer(id)
    }

    fn execute(&mut self, commands: &[Command]) -> Result<()> {
        self.inner.execute(commands)
    }

    fn present(&mut self) -> Result<()> {
        self.inner.present()
    }

    fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }
}
