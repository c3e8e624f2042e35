//! kamogawa
//!
//! A small rendering engine built around an immediate device context. GPU
//! work is described with Direct3D 11 style resources (buffers, views,
//! samplers, shader programs) and recorded on a context that a backend
//! replays, either on `wgpu` or headless. Renderable objects are actors of a
//! minimal entity-component system.
//!
//! High-level modules
//! - `app`: `BaseApp`, which owns everything and drives init/update/render/resize/destroy
//! - `camera` and `input`: first-person camera and the input state feeding it
//! - `config`: TOML engine configuration
//! - `ecs`: entities, components, transforms, meshes and actors
//! - `graphics`: device, context, resource wrappers and the backends
//! - `resources`: OBJ and glTF model loading
//! - `ui`: the actor inspector
//! - `window`: the winit event loop
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod ecs;
pub mod error;
pub mod graphics;
pub mod input;
pub mod math;
pub mod resources;
pub mod ui;
pub mod window;

// Re-exports commonly used types for convenience in downstream code.
pub use app::BaseApp;
pub use config::EngineConfig;
pub use error::{GraphicsError, ModelError};
pub use cgmath;
pub use winit::event::WindowEvent;
