//! Render pipeline creation and the translation of facade enums into wgpu
//! types.

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{AddressMode, Filter, Format, SamplerDesc},
        command::PrimitiveTopology,
        input_layout::InputLayout,
    },
};

/// Everything a pipeline depends on besides its shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub topology: PrimitiveTopology,
}

pub(super) fn texture_format(format: Format) -> Result<wgpu::TextureFormat> {
    Ok(match format {
        Format::R8G8B8A8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        Format::R8G8B8A8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        Format::D24UnormS8Uint => wgpu::TextureFormat::Depth24PlusStencil8,
        Format::D32Float => wgpu::TextureFormat::Depth32Float,
        other => {
            return Err(GraphicsError::Backend(format!(
                "{other:?} is not a texture format"
            )));
        }
    })
}

pub(super) fn vertex_format(format: Format) -> Result<wgpu::VertexFormat> {
    Ok(match format {
        Format::R32G32B32Float => wgpu::VertexFormat::Float32x3,
        Format::R32G32Float => wgpu::VertexFormat::Float32x2,
        Format::R32Uint => wgpu::VertexFormat::Uint32,
        Format::R8G8B8A8Unorm => wgpu::VertexFormat::Unorm8x4,
        other => {
            return Err(GraphicsError::Backend(format!(
                "{other:?} is not a vertex format"
            )));
        }
    })
}

pub(super) fn index_format(format: Format) -> wgpu::IndexFormat {
    match format {
        Format::R16Uint => wgpu::IndexFormat::Uint16,
        _ => wgpu::IndexFormat::Uint32,
    }
}

fn topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
    }
}

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
    }
}

pub(super) fn create_sampler(device: &wgpu::Device, desc: &SamplerDesc) -> wgpu::Sampler {
    let (filter, mipmap_filter) = match desc.filter {
        Filter::MinMagMipLinear => (wgpu::FilterMode::Linear, wgpu::FilterMode::Linear),
        Filter::MinMagMipPoint => (wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest),
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("sampler state"),
        address_mode_u: address_mode(desc.address_u),
        address_mode_v: address_mode(desc.address_v),
        address_mode_w: address_mode(desc.address_w),
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter,
        lod_min_clamp: desc.min_lod,
        // wgpu rejects an unbounded clamp
        lod_max_clamp: desc.max_lod.min(32.0),
        ..Default::default()
    })
}

/// Layout of bind group 0 as `engine.wgsl` declares it: three uniform
/// blocks, one texture and one sampler.
pub(super) fn engine_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let uniform = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("engine bind group layout"),
        entries: &[
            uniform(0),
            uniform(1),
            uniform(2),
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub(super) fn vertex_attributes(layout: &InputLayout) -> Result<Vec<wgpu::VertexAttribute>> {
    layout
        .elements()
        .iter()
        .enumerate()
        .map(|(location, element)| {
            Ok(wgpu::VertexAttribute {
                offset: element.aligned_byte_offset as wgpu::BufferAddress,
                shader_location: location as u32,
                format: vertex_format(element.format)?,
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub(super) fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    entry_points: (&str, &str),
    key: PipelineKey,
    blend: Option<wgpu::BlendState>,
    cull_mode: Option<wgpu::Face>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    let strip_index_format = match key.topology {
        PrimitiveTopology::TriangleStrip => Some(wgpu::IndexFormat::Uint32),
        _ => None,
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("render pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entry_points.0),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry_points.1),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: topology(key.topology),
            strip_index_format,
            // clockwise winding is front facing, as in Direct3D
            front_face: wgpu::FrontFace::Cw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: key.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
