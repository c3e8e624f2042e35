//! Vertex and pixel shader pair compiled from one WGSL file, together with
//! the input layout the vertex shader consumes.

use std::path::Path;

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{ResourceId, ShaderProgramDesc},
        device::GraphicsDevice,
        device_context::DeviceContext,
        input_layout::InputLayout,
    },
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const PIXEL_ENTRY: &str = "fs_main";

#[derive(Debug)]
pub struct ShaderProgram {
    id: ResourceId,
    input_layout: InputLayout,
}

impl ShaderProgram {
    pub fn init(device: &mut GraphicsDevice, path: impl AsRef<Path>, input_layout: InputLayout) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| {
            log::error!("ShaderProgram::init: cannot read {path:?}");
            GraphicsError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_source(device, path, source, input_layout)
    }

    /// Compiles already loaded WGSL. `path` is only used for labels and
    /// error messages.
    pub fn from_source(
        device: &mut GraphicsDevice,
        path: impl AsRef<Path>,
        source: String,
        input_layout: InputLayout,
    ) -> Result<Self> {
        let path = path.as_ref();
        let desc = ShaderProgramDesc {
            label: path.display().to_string(),
            source,
            vertex_entry: VERTEX_ENTRY.to_string(),
            pixel_entry: PIXEL_ENTRY.to_string(),
            input_layout: input_layout.clone(),
        };
        let id = device.create_shader_program(&desc).map_err(|err| match err {
            GraphicsError::Backend(message) => GraphicsError::ShaderCompilation {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        log::info!("ShaderProgram {path:?} compiled");
        Ok(Self {
            id,
            input_layout,
        })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn input_layout(&self) -> &InputLayout {
        &self.input_layout
    }

    /// Binds the input layout and both shader stages.
    pub fn render(&self, ctx: &mut DeviceContext) {
        ctx.set_shader_program(self.id);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }
}
