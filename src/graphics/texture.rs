//! Textures: decoded images sampled by the pixel shader, and the
//! render/depth targets the output merger writes to.

use std::{path::Path, rc::Rc};

use image::{ImageFormat, load_from_memory_with_format};

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{Format, ResourceId, TextureDesc, TextureUsage},
        device::GraphicsDevice,
        device_context::DeviceContext,
    },
};

/// Container format of an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    Dds,
    Png,
    Jpg,
}

impl ExtensionType {
    /// Guesses the container from a file name, `None` if it is not an image
    /// format the engine decodes.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "dds" => Some(Self::Dds),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Dds => ImageFormat::Dds,
            Self::Png => ImageFormat::Png,
            Self::Jpg => ImageFormat::Jpeg,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    id: ResourceId,
    width: u32,
    height: u32,
    format: Format,
}

impl Texture {
    /// Loads and decodes an image file into a shader resource.
    pub fn from_file(device: &mut GraphicsDevice, path: impl AsRef<Path>, ext: ExtensionType) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| {
            log::error!("Texture::from_file: cannot read {path:?}");
            GraphicsError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(device, &label, &bytes, ext)
    }

    /// Decodes an in-memory image file.
    pub fn from_bytes(device: &mut GraphicsDevice, label: &str, bytes: &[u8], ext: ExtensionType) -> Result<Self> {
        let img = load_from_memory_with_format(bytes, ext.image_format())?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(device, label, width, height, &rgba)
    }

    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba(device: &mut GraphicsDevice, label: &str, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let needed = width as u64 * height as u64 * 4;
        if pixels.len() as u64 != needed {
            return Err(GraphicsError::BufferTooSmall {
                size: pixels.len() as u64,
                needed,
            });
        }
        let desc = TextureDesc {
            label: label.to_string(),
            width,
            height,
            format: Format::R8G8B8A8UnormSrgb,
            usage: TextureUsage::ShaderResource,
            sample_count: 1,
        };
        let id = device.create_texture(&desc, Some(pixels))?;
        log::info!("Texture {label}: {width}x{height}");
        Ok(Self {
            id,
            width,
            height,
            format: desc.format,
        })
    }

    /// An empty render or depth target, such as the depth-stencil buffer.
    pub fn render_target(
        device: &mut GraphicsDevice,
        label: &str,
        width: u32,
        height: u32,
        format: Format,
        usage: TextureUsage,
        sample_count: u32,
    ) -> Result<Self> {
        let desc = TextureDesc {
            label: label.to_string(),
            width,
            height,
            format,
            usage,
            sample_count,
        };
        let id = device.create_texture(&desc, None)?;
        Ok(Self {
            id,
            width,
            height,
            format,
        })
    }

    /// Wraps the swap chain's back buffer.
    pub(crate) fn back_buffer(id: ResourceId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            format: Format::R8G8B8A8Unorm,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Binds the texture as pixel shader resource `start_slot`.
    pub fn render(&self, ctx: &mut DeviceContext, start_slot: u32) {
        ctx.set_shader_resource(start_slot, self.id);
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        device.release(self.id);
    }

    /// Drops one owner of a shared texture, releasing the GPU resource when
    /// it was the last one.
    pub fn destroy_shared(texture: Rc<Texture>, device: &mut GraphicsDevice) {
        if let Ok(texture) = Rc::try_unwrap(texture) {
            texture.destroy(device);
        }
    }
}
