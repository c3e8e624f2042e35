//! Vertex input layout: the description of one vertex as the vertex shader
//! reads it.

use crate::{
    error::{GraphicsError, Result},
    graphics::backend::Format,
};

/// Place the element right after the previous one in the same slot.
pub const APPEND_ALIGNED_ELEMENT: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub semantic_name: String,
    pub semantic_index: u32,
    pub format: Format,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
}

impl InputElement {
    pub fn per_vertex(semantic_name: &str, format: Format) -> Self {
        Self {
            semantic_name: semantic_name.to_string(),
            semantic_index: 0,
            format,
            input_slot: 0,
            aligned_byte_offset: APPEND_ALIGNED_ELEMENT,
        }
    }
}

/// A validated layout with every offset resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    elements: Vec<InputElement>,
    stride: u32,
}

impl InputLayout {
    pub fn new(mut elements: Vec<InputElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(GraphicsError::InvalidInputLayout("no elements".into()));
        }
        let mut cursor = 0;
        let mut stride = 0;
        for element in &mut elements {
            if element.input_slot != 0 {
                return Err(GraphicsError::InvalidInputLayout(format!(
                    "{} uses input slot {}, only slot 0 is supported",
                    element.semantic_name, element.input_slot
                )));
            }
            if element.format.is_depth() {
                return Err(GraphicsError::InvalidInputLayout(format!(
                    "{} uses a depth format",
                    element.semantic_name
                )));
            }
            if element.aligned_byte_offset == APPEND_ALIGNED_ELEMENT {
                element.aligned_byte_offset = cursor;
            }
            cursor = element.aligned_byte_offset + element.format.byte_size();
            stride = stride.max(cursor);
        }
        Ok(Self { elements, stride })
    }

    /// `POSITION` float3 followed by `TEXCOORD` float2.
    pub fn position_texcoord() -> Self {
        Self {
            elements: vec![
                InputElement {
                    aligned_byte_offset: 0,
                    ..InputElement::per_vertex("POSITION", Format::R32G32B32Float)
                },
                InputElement {
                    aligned_byte_offset: 12,
                    ..InputElement::per_vertex("TEXCOORD", Format::R32G32Float)
                },
            ],
            stride: 20,
        }
    }

    pub fn elements(&self) -> &[InputElement] {
        &self.elements
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> u32 {
        self.stride
    }
}
