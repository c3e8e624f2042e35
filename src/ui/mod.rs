//! The actor inspector.
//!
//! [`inspector`] holds the editing model and is always built. The Dear ImGui
//! front-end that draws it is behind the `ui` feature; without it the
//! interface records nothing.

pub mod inspector;
#[cfg(feature = "ui")]
mod imgui_frontend;

use winit::event::WindowEvent;

use crate::{
    ecs::actor::Actor,
    error::Result,
    graphics::{device::GraphicsDevice, device_context::DeviceContext},
};

pub use inspector::{Axis, Inspector, TransformField};

pub struct UserInterface {
    inspector: Inspector,
    #[cfg(feature = "ui")]
    frontend: imgui_frontend::ImguiFrontend,
}

impl std::fmt::Debug for UserInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInterface")
            .field("inspector", &self.inspector)
            .finish_non_exhaustive()
    }
}

impl UserInterface {
    pub fn init(device: &mut GraphicsDevice, width: u32, height: u32) -> Result<Self> {
        #[cfg(not(feature = "ui"))]
        let _ = (device, width, height);
        Ok(Self {
            inspector: Inspector::new(),
            #[cfg(feature = "ui")]
            frontend: imgui_frontend::ImguiFrontend::init(device, width, height)?,
        })
    }

    pub fn inspector_mut(&mut self) -> &mut Inspector {
        &mut self.inspector
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        #[cfg(feature = "ui")]
        self.frontend.resize(width, height);
        #[cfg(not(feature = "ui"))]
        let _ = (width, height);
    }

    /// Forwards a window event. Returns `true` when the interface wants the
    /// event for itself, e.g. a click on one of its widgets.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        #[cfg(feature = "ui")]
        return self.frontend.handle_window_event(event);
        #[cfg(not(feature = "ui"))]
        {
            let _ = event;
            false
        }
    }

    /// Builds the inspector for this frame and records its overlay.
    pub fn render(&mut self, ctx: &mut DeviceContext, actors: &mut [Actor], delta_time: f32) {
        self.inspector.sync(actors.len());
        #[cfg(feature = "ui")]
        self.frontend.render(ctx, &mut self.inspector, actors, delta_time);
        #[cfg(not(feature = "ui"))]
        let _ = (ctx, delta_time);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        #[cfg(feature = "ui")]
        self.frontend.destroy(device);
        #[cfg(not(feature = "ui"))]
        let _ = device;
        log::info!("UserInterface destroyed");
    }
}
