//! An immediate-context graphics facade.
//!
//! [`device::GraphicsDevice`] creates resources, [`device_context::DeviceContext`]
//! records what to do with them, and a [`backend::Backend`] does the actual
//! work. The wrappers (`Buffer`, `Texture`, `SwapChain`, ...) follow one
//! shape: `init` creates, `render` binds, `destroy` releases.

pub mod backend;
pub mod buffer;
pub mod command;
pub mod constant_buffers;
pub mod depth_stencil_view;
pub mod device;
pub mod device_context;
pub mod headless;
pub mod input_layout;
pub mod overlay;
pub mod render_target_view;
pub mod sampler_state;
pub mod shader_program;
pub mod swap_chain;
pub mod texture;
pub mod viewport;
pub mod wgpu_backend;

pub use backend::{Backend, BufferKind, Format, ResourceId, ResourceKind};
pub use buffer::Buffer;
pub use depth_stencil_view::DepthStencilView;
pub use device::GraphicsDevice;
pub use device_context::DeviceContext;
pub use headless::HeadlessBackend;
pub use render_target_view::RenderTargetView;
pub use sampler_state::SamplerState;
pub use shader_program::ShaderProgram;
pub use swap_chain::SwapChain;
pub use texture::{ExtensionType, Texture};
pub use viewport::Viewport;
pub use wgpu_backend::WgpuBackend;
