//! The windowed event loop: one [`BaseApp`] on a `wgpu` surface.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{app::BaseApp, config::EngineConfig, graphics::wgpu_backend::WgpuBackend};

struct App {
    config: EngineConfig,
    async_runtime: tokio::runtime::Runtime,
    window: Option<Arc<Window>>,
    base: Option<BaseApp>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: EngineConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            async_runtime: tokio::runtime::Runtime::new()?,
            window: None,
            base: None,
            error: None,
        })
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let backend = self
            .async_runtime
            .block_on(WgpuBackend::new(Arc::clone(&window)))?;

        let size = window.inner_size();
        let mut config = self.config.clone();
        config.window.width = size.width.max(1);
        config.window.height = size.height.max(1);
        self.base = Some(BaseApp::init(config, Box::new(backend))?);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(base) = self.base.take() {
            base.destroy();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.base.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(base) = &mut self.base else {
            return;
        };

        let captured = base
            .ui_mut()
            .is_some_and(|ui| ui.handle_window_event(&event));

        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => base.resize_window(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let result = base.update().and_then(|()| base.render());
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                result
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                }
                base.input_mut().on_key(code, state);
                Ok(())
            }
            WindowEvent::MouseInput { state, button, .. } if !captured => {
                base.input_mut().on_mouse_button(button, state);
                Ok(())
            }
            WindowEvent::CursorMoved { position, .. } => {
                base.rotate_camera(position.x, position.y);
                Ok(())
            }
            WindowEvent::Focused(false) => {
                base.input_mut().release_all();
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Opens a window and runs until it is closed.
pub fn run(config: EngineConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;
    app.shutdown();
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
