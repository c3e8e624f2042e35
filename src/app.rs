//! [`BaseApp`] owns the device, the presentation targets, the shared
//! constant buffers, the camera and the actors, and drives them through
//! init, update, render, resize and destroy.

use std::{collections::HashMap, path::Path, rc::Rc};

use anyhow::Context as _;
use cgmath::{Matrix4, Vector3};
use instant::Instant;

use crate::{
    camera::Camera,
    config::{ActorConfig, EngineConfig},
    ecs::actor::Actor,
    graphics::{
        backend::{Backend, Format, TextureUsage},
        buffer::Buffer,
        constant_buffers::{CBChangeOnResize, CBNeverChanges, to_shader_matrix},
        depth_stencil_view::DepthStencilView,
        device::GraphicsDevice,
        device_context::DeviceContext,
        input_layout::{InputElement, InputLayout},
        render_target_view::RenderTargetView,
        shader_program::ShaderProgram,
        swap_chain::SwapChain,
        texture::{ExtensionType, Texture},
        viewport::Viewport,
    },
    input::InputState,
    math::perspective_fov_lh,
    resources::ModelLoader,
    ui::UserInterface,
};

pub const BACK_BUFFER_FORMAT: Format = Format::R8G8B8A8Unorm;
pub const DEPTH_STENCIL_FORMAT: Format = Format::D24UnormS8Uint;

pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 100.0;

/// Constant buffer slots shared by every draw.
pub const VIEW_BUFFER_SLOT: u32 = 0;
pub const PROJECTION_BUFFER_SLOT: u32 = 1;

/// Wall clock time between frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    last: Instant,
    delta: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            delta: 0.0,
        }
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// The back buffer and everything created from it, plus the depth buffer.
/// Torn down and rebuilt as a whole on resize.
#[derive(Debug)]
struct Targets {
    back_buffer: Texture,
    render_target_view: RenderTargetView,
    depth_stencil: Texture,
    depth_stencil_view: DepthStencilView,
}

impl Targets {
    /// On failure everything created so far is released again, the back
    /// buffer included, so the swap chain can still be resized.
    fn create(device: &mut GraphicsDevice, back_buffer: Texture) -> anyhow::Result<Self> {
        let (width, height) = back_buffer.size();
        let render_target_view = match RenderTargetView::init(device, &back_buffer, BACK_BUFFER_FORMAT) {
            Ok(view) => view,
            Err(err) => {
                back_buffer.destroy(device);
                return Err(err).context("cannot create the render target view");
            }
        };
        let depth_stencil = match Texture::render_target(
            device,
            "depth stencil",
            width,
            height,
            DEPTH_STENCIL_FORMAT,
            TextureUsage::DepthStencil,
            1,
        ) {
            Ok(texture) => texture,
            Err(err) => {
                render_target_view.destroy(device);
                back_buffer.destroy(device);
                return Err(err).context("cannot create the depth stencil texture");
            }
        };
        let depth_stencil_view = match DepthStencilView::init(device, &depth_stencil, DEPTH_STENCIL_FORMAT) {
            Ok(view) => view,
            Err(err) => {
                depth_stencil.destroy(device);
                render_target_view.destroy(device);
                back_buffer.destroy(device);
                return Err(err).context("cannot create the depth stencil view");
            }
        };
        Ok(Self {
            back_buffer,
            render_target_view,
            depth_stencil,
            depth_stencil_view,
        })
    }

    fn destroy(self, device: &mut GraphicsDevice) {
        self.render_target_view.destroy(device);
        self.depth_stencil_view.destroy(device);
        self.depth_stencil.destroy(device);
        self.back_buffer.destroy(device);
    }
}

#[derive(Debug)]
pub struct BaseApp {
    config: EngineConfig,
    device: GraphicsDevice,
    ctx: DeviceContext,
    swap_chain: SwapChain,
    targets: Option<Targets>,
    viewport: Viewport,
    shader_program: ShaderProgram,
    cb_never_changes: Buffer,
    cb_change_on_resize: Buffer,
    never_changes: CBNeverChanges,
    change_on_resize: CBChangeOnResize,
    camera: Camera,
    input: InputState,
    timer: FrameTimer,
    ui: Option<UserInterface>,
    actors: Vec<Actor>,
    textures: HashMap<String, Rc<Texture>>,
}

impl BaseApp {
    /// Creates every resource in dependency order and loads the configured
    /// actors.
    pub fn init(config: EngineConfig, backend: Box<dyn Backend>) -> anyhow::Result<Self> {
        let (width, height) = (config.window.width, config.window.height);
        let mut device = GraphicsDevice::new(backend);
        let mut ctx = DeviceContext::new();

        let (swap_chain, back_buffer) =
            SwapChain::init(&mut device, width, height).context("cannot create the swap chain")?;
        let targets = Targets::create(&mut device, back_buffer)?;
        let viewport = Viewport::init(width, height)?;

        let layout = InputLayout::new(vec![
            InputElement::per_vertex("POSITION", Format::R32G32B32Float),
            InputElement::per_vertex("TEXCOORD", Format::R32G32Float),
        ])?;
        let shader_path = config.asset_root.join(&config.shader);
        let shader_program = ShaderProgram::init(&mut device, &shader_path, layout)
            .with_context(|| format!("cannot load shader {}", shader_path.display()))?;

        let cb_never_changes = Buffer::constant_for::<CBNeverChanges>(&mut device, "CBNeverChanges")?;
        let cb_change_on_resize = Buffer::constant_for::<CBChangeOnResize>(&mut device, "CBChangeOnResize")?;

        let camera = Camera::new(
            Vector3::from(config.camera.position),
            Vector3::from(config.camera.target),
        );
        let never_changes = CBNeverChanges {
            view: to_shader_matrix(camera.view_matrix()),
        };
        cb_never_changes.update(&mut ctx, &never_changes)?;
        let change_on_resize = CBChangeOnResize {
            projection: to_shader_matrix(projection(width, height)),
        };
        cb_change_on_resize.update(&mut ctx, &change_on_resize)?;
        // Shared buffers stay bound until the context state is cleared.
        cb_never_changes.render(&mut ctx, VIEW_BUFFER_SLOT, true);
        cb_change_on_resize.render(&mut ctx, PROJECTION_BUFFER_SLOT, true);

        let ui = UserInterface::init(&mut device, width, height).context("cannot create the user interface")?;

        let mut app = Self {
            config,
            device,
            ctx,
            swap_chain,
            targets: Some(targets),
            viewport,
            shader_program,
            cb_never_changes,
            cb_change_on_resize,
            never_changes,
            change_on_resize,
            camera,
            input: InputState::new(),
            timer: FrameTimer::new(),
            ui: Some(ui),
            actors: Vec::new(),
            textures: HashMap::new(),
        };

        for actor in app.config.actors.clone() {
            app.spawn_actor(&actor)
                .with_context(|| format!("cannot create actor {}", actor.name))?;
        }
        log::info!(
            "BaseApp: {} actors, {} live resources on the {} backend",
            app.actors.len(),
            app.device.live_count(),
            app.device.backend_name()
        );
        Ok(app)
    }

    /// Loads a model and its textures into a new actor. Textures with the
    /// same file name are shared between actors.
    ///
    /// Without configured textures each mesh gets its material's texture,
    /// and meshes without one get the default texture, which also closes
    /// the list.
    pub fn spawn_actor(&mut self, desc: &ActorConfig) -> anyhow::Result<&mut Actor> {
        let loader = ModelLoader::new(&self.config.asset_root);
        let model = futures::executor::block_on(loader.load_model(&desc.model))?;

        let texture_names: Vec<Option<String>> = if desc.textures.is_empty() {
            let dir = Path::new(&desc.model).parent().unwrap_or(Path::new(""));
            model
                .texture_names
                .iter()
                .map(|name| {
                    name.as_ref()
                        .map(|name| dir.join(name).to_string_lossy().into_owned())
                })
                .collect()
        } else {
            desc.textures.iter().cloned().map(Some).collect()
        };
        let default_name = self.config.default_texture.clone();
        let default = self.texture(&default_name)?;
        let mut textures = Vec::with_capacity(texture_names.len() + 1);
        for name in &texture_names {
            textures.push(match name {
                Some(name) => self.texture(name)?,
                None => Rc::clone(&default),
            });
        }
        textures.push(default);

        let mut actor = Actor::new(&mut self.device, &desc.name)?;
        if let Err(err) = actor.set_mesh(&mut self.device, model.meshes) {
            actor.destroy(&mut self.device);
            return Err(err.into());
        }
        actor.set_textures(textures);
        actor.transform_mut().set_transform(
            Vector3::from(desc.position),
            Vector3::from(desc.rotation),
            Vector3::from(desc.scale),
        );
        self.actors.push(actor);
        let index = self.actors.len() - 1;
        Ok(&mut self.actors[index])
    }

    fn texture(&mut self, name: &str) -> anyhow::Result<Rc<Texture>> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(Rc::clone(texture));
        }
        let ext = ExtensionType::from_path(name)
            .with_context(|| format!("{name} is not a supported texture format"))?;
        let texture = Rc::new(
            Texture::from_file(&mut self.device, self.config.asset_root.join(name), ext)
                .with_context(|| format!("cannot load texture {name}"))?,
        );
        self.textures.insert(name.to_string(), Rc::clone(&texture));
        Ok(texture)
    }

    /// Advances the clock, moves the camera and records all constant buffer
    /// updates for the frame.
    pub fn update(&mut self) -> anyhow::Result<()> {
        let delta_time = self.timer.tick();
        self.camera
            .move_with_input(&self.input, delta_time, self.config.camera.speed);

        let (width, height) = self.swap_chain.size();
        self.change_on_resize.projection = to_shader_matrix(projection(width, height));

        self.never_changes.view = to_shader_matrix(self.camera.view_matrix());
        self.cb_never_changes.update(&mut self.ctx, &self.never_changes)?;
        self.cb_change_on_resize
            .update(&mut self.ctx, &self.change_on_resize)?;

        for actor in &mut self.actors {
            actor.update(delta_time, &mut self.ctx)?;
        }
        Ok(())
    }

    /// Records the frame and presents it.
    pub fn render(&mut self) -> anyhow::Result<()> {
        let targets = self
            .targets
            .as_ref()
            .context("render targets are not available")?;
        targets.render_target_view.render(
            &mut self.ctx,
            &targets.depth_stencil_view,
            self.config.clear_color,
        );
        self.viewport.render(&mut self.ctx);
        targets.depth_stencil_view.render(&mut self.ctx);
        self.shader_program.render(&mut self.ctx);

        for actor in &self.actors {
            actor.render(&mut self.ctx);
        }

        self.cb_never_changes
            .render(&mut self.ctx, VIEW_BUFFER_SLOT, true);
        self.cb_change_on_resize
            .render(&mut self.ctx, PROJECTION_BUFFER_SLOT, true);

        if let Some(ui) = &mut self.ui {
            ui.render(&mut self.ctx, &mut self.actors, self.timer.delta());
        }

        self.swap_chain
            .present(&mut self.ctx, &mut self.device)
            .context("present failed")
    }

    /// Rebuilds everything sized after the window. Zero sizes (a minimized
    /// window) are ignored.
    pub fn resize_window(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        if width == 0 || height == 0 {
            log::debug!("BaseApp: ignoring resize to {width}x{height}");
            return Ok(());
        }
        if self.swap_chain.size() == (width, height) && self.targets.is_some() {
            return Ok(());
        }
        // Recorded commands may still reference the old targets.
        self.ctx.flush(&mut self.device)?;

        if let Some(targets) = self.targets.take() {
            targets.destroy(&mut self.device);
        }
        self.swap_chain
            .resize_buffers(&mut self.device, width, height)?;
        let back_buffer = self.swap_chain.get_buffer(&mut self.device)?;
        self.targets = Some(Targets::create(&mut self.device, back_buffer)?);
        self.viewport = Viewport::init(width, height)?;
        if let Some(ui) = &mut self.ui {
            ui.resize(width, height);
        }

        self.change_on_resize.projection = to_shader_matrix(projection(width, height));
        self.cb_change_on_resize
            .update(&mut self.ctx, &self.change_on_resize)?;
        log::debug!("BaseApp: resized to {width}x{height}");
        Ok(())
    }

    /// Turns the camera by the cursor movement since the last call, while
    /// the right mouse button is held.
    pub fn rotate_camera(&mut self, mouse_x: f64, mouse_y: f64) {
        let (dx, dy) = self.input.on_cursor_moved(mouse_x, mouse_y);
        if self.input.is_rotating() {
            self.camera.rotate(dx, dy, self.config.camera.sensitivity);
        }
    }

    /// Releases everything and hands back the device, whose ledger should
    /// now be empty.
    pub fn destroy(mut self) -> GraphicsDevice {
        self.ctx.clear_state();
        if let Err(err) = self.ctx.flush(&mut self.device) {
            log::warn!("BaseApp::destroy: final flush failed: {err}");
        }
        if let Some(ui) = self.ui.take() {
            ui.destroy(&mut self.device);
        }
        for actor in self.actors.drain(..) {
            actor.destroy(&mut self.device);
        }
        for (_, texture) in self.textures.drain() {
            Texture::destroy_shared(texture, &mut self.device);
        }
        self.cb_never_changes.destroy(&mut self.device);
        self.cb_change_on_resize.destroy(&mut self.device);
        self.shader_program.destroy(&mut self.device);
        if let Some(targets) = self.targets.take() {
            targets.destroy(&mut self.device);
        }
        let leaked = self.device.live_count();
        if leaked > 0 {
            log::warn!("BaseApp::destroy: {leaked} resources still live");
        } else {
            log::info!("BaseApp destroyed");
        }
        self.device
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn device(&self) -> &GraphicsDevice {
        &self.device
    }

    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut [Actor] {
        &mut self.actors
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn ui_mut(&mut self) -> Option<&mut UserInterface> {
        self.ui.as_mut()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.swap_chain.size()
    }

    pub fn projection(&self) -> &CBChangeOnResize {
        &self.change_on_resize
    }

    pub fn view(&self) -> &CBNeverChanges {
        &self.never_changes
    }

    pub fn render_target_view(&self) -> Option<&RenderTargetView> {
        self.targets.as_ref().map(|t| &t.render_target_view)
    }

    pub fn depth_stencil_view(&self) -> Option<&DepthStencilView> {
        self.targets.as_ref().map(|t| &t.depth_stencil_view)
    }

    pub fn back_buffer(&self) -> Option<&Texture> {
        self.targets.as_ref().map(|t| &t.back_buffer)
    }
}

/// Left-handed perspective for a `width`x`height` target.
pub fn projection(width: u32, height: u32) -> Matrix4<f32> {
    perspective_fov_lh(FIELD_OF_VIEW, width as f32 / height.max(1) as f32, NEAR_PLANE, FAR_PLANE)
}
