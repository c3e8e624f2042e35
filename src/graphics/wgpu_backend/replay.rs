//! Turns recorded [`Command`]s into wgpu render passes.

use std::{collections::HashMap, iter};

use crate::{
    error::{GraphicsError, Result},
    graphics::{
        backend::{Format, ResourceId},
        command::{Command, PrimitiveTopology},
        overlay::OverlayFrame,
        viewport::Viewport,
    },
};

use super::{
    GpuView, WgpuBackend,
    pipeline::{PipelineKey, index_format, mk_render_pipeline},
};

/// Immediate-context bindings. They outlive a single `execute` call and are
/// only reset by [`Command::ClearState`].
#[derive(Debug, Clone)]
pub(super) struct Bindings {
    render_target: Option<ResourceId>,
    depth_stencil: Option<ResourceId>,
    viewport: Option<Viewport>,
    program: Option<ResourceId>,
    vertex_buffer: Option<(ResourceId, u32)>,
    index_buffer: Option<(ResourceId, Format, u32)>,
    topology: PrimitiveTopology,
    constant_buffers: [Option<ResourceId>; 3],
    texture: Option<ResourceId>,
    sampler: Option<ResourceId>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            render_target: None,
            depth_stencil: None,
            viewport: None,
            program: None,
            vertex_buffer: None,
            index_buffer: None,
            topology: PrimitiveTopology::TriangleList,
            constant_buffers: [None; 3],
            texture: None,
            sampler: None,
        }
    }
}

impl Bindings {
    /// Unbinds a released resource.
    pub fn forget(&mut self, id: ResourceId) {
        let unset = |slot: &mut Option<ResourceId>| {
            if *slot == Some(id) {
                *slot = None;
            }
        };
        unset(&mut self.render_target);
        unset(&mut self.depth_stencil);
        unset(&mut self.program);
        unset(&mut self.texture);
        unset(&mut self.sampler);
        self.constant_buffers.iter_mut().for_each(unset);
        if self.vertex_buffer.is_some_and(|(b, _)| b == id) {
            self.vertex_buffer = None;
        }
        if self.index_buffer.is_some_and(|(b, _, _)| b == id) {
            self.index_buffer = None;
        }
    }

    fn bind_group_key(&self) -> [Option<ResourceId>; 5] {
        [
            self.constant_buffers[0],
            self.constant_buffers[1],
            self.constant_buffers[2],
            self.texture,
            self.sampler,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
enum Clear {
    Color(wgpu::Color),
    DepthStencil { depth: f32, stencil: u8 },
}

struct ActivePass {
    pass: wgpu::RenderPass<'static>,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    size: (u32, u32),
}

/// Output attachment resolved for a pass.
struct Attachment {
    id: ResourceId,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

struct Recorder {
    encoder: wgpu::CommandEncoder,
    pass: Option<ActivePass>,
    /// Pending clears keyed by view, applied as load operations.
    clears: HashMap<ResourceId, Clear>,
    /// Buffers read by draws since the last submit.
    read: Vec<ResourceId>,
}

fn encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
    device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    })
}

fn uniform_binding<'a>(
    buffers: &'a HashMap<ResourceId, wgpu::Buffer>,
    fallback: &'a wgpu::Buffer,
    slot: Option<ResourceId>,
) -> Result<wgpu::BindingResource<'a>> {
    Ok(match slot {
        Some(id) => buffers
            .get(&id)
            .ok_or(GraphicsError::UnknownResource(id))?
            .as_entire_binding(),
        None => fallback.as_entire_binding(),
    })
}

fn has_stencil(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Depth24PlusStencil8 | wgpu::TextureFormat::Stencil8
    )
}

impl WgpuBackend {
    pub(super) fn replay(&mut self, commands: &[Command]) -> Result<()> {
        let mut rec = Recorder {
            encoder: encoder(&self.device),
            pass: None,
            clears: HashMap::new(),
            read: Vec::new(),
        };
        for command in commands {
            command.check_slots()?;
            self.replay_one(&mut rec, command)?;
        }
        self.submit(&mut rec)?;
        Ok(())
    }

    fn replay_one(&mut self, rec: &mut Recorder, command: &Command) -> Result<()> {
        match command {
            Command::ClearState => {
                rec.pass = None;
                self.bindings = Bindings::default();
            }
            Command::SetRenderTargets {
                render_target,
                depth_stencil,
            } => {
                rec.pass = None;
                self.bindings.render_target = *render_target;
                self.bindings.depth_stencil = *depth_stencil;
            }
            Command::ClearRenderTarget { view, color } => {
                rec.pass = None;
                let [r, g, b, a] = color.map(f64::from);
                rec.clears.insert(*view, Clear::Color(wgpu::Color { r, g, b, a }));
            }
            Command::ClearDepthStencil {
                view,
                depth,
                stencil,
            } => {
                rec.pass = None;
                rec.clears.insert(
                    *view,
                    Clear::DepthStencil {
                        depth: *depth,
                        stencil: *stencil,
                    },
                );
            }
            Command::SetViewport(viewport) => self.bindings.viewport = Some(*viewport),
            Command::SetShaderProgram(id) => {
                self.require(self.programs.contains_key(id), *id)?;
                self.bindings.program = Some(*id);
            }
            Command::SetVertexBuffer { buffer, offset, .. } => {
                self.require(self.buffers.contains_key(buffer), *buffer)?;
                self.bindings.vertex_buffer = Some((*buffer, *offset));
            }
            Command::SetIndexBuffer {
                buffer,
                format,
                offset,
            } => {
                self.require(self.buffers.contains_key(buffer), *buffer)?;
                self.bindings.index_buffer = Some((*buffer, *format, *offset));
            }
            Command::SetPrimitiveTopology(topology) => self.bindings.topology = *topology,
            Command::SetConstantBuffer { slot, buffer, .. } => {
                self.require(self.buffers.contains_key(buffer), *buffer)?;
                self.bindings.constant_buffers[*slot as usize] = Some(*buffer);
            }
            Command::SetShaderResource { texture, .. } => {
                self.require(self.textures.contains_key(texture), *texture)?;
                self.bindings.texture = Some(*texture);
            }
            Command::SetSampler { sampler, .. } => {
                self.require(self.samplers.contains_key(sampler), *sampler)?;
                self.bindings.sampler = Some(*sampler);
            }
            Command::UpdateBuffer { buffer, data } => {
                // queued writes land before the whole submission, so a buffer
                // that earlier draws read must be written in a new one
                if rec.read.contains(buffer) {
                    self.submit(rec)?;
                }
                let target = self
                    .buffers
                    .get(buffer)
                    .ok_or(GraphicsError::UnknownResource(*buffer))?;
                let mut bytes = data.clone();
                bytes.resize(data.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize), 0);
                if bytes.len() as u64 > target.size() {
                    return Err(GraphicsError::BufferTooSmall {
                        size: target.size(),
                        needed: bytes.len() as u64,
                    });
                }
                self.queue.write_buffer(target, 0, &bytes);
            }
            Command::DrawIndexed {
                index_count,
                start_index,
                base_vertex,
            } => self.draw_indexed(rec, *index_count, *start_index, *base_vertex)?,
            Command::DrawOverlay(frame) => self.draw_overlay(rec, frame)?,
        }
        Ok(())
    }

    fn require(&self, present: bool, id: ResourceId) -> Result<()> {
        if present {
            Ok(())
        } else {
            Err(GraphicsError::UnknownResource(id))
        }
    }

    fn attachment(&mut self, id: ResourceId) -> Result<Attachment> {
        let (view, format, size) = match self.views.get(&id) {
            Some(GpuView::BackBuffer) => (
                self.frame_view()?,
                self.config.format,
                (self.config.width, self.config.height),
            ),
            Some(GpuView::Texture { view, format, size }) => (view.clone(), *format, *size),
            None => return Err(GraphicsError::UnknownResource(id)),
        };
        Ok(Attachment {
            id,
            view,
            format,
            size,
        })
    }

    /// Opens a pass on the bound targets, consuming their pending clears.
    fn begin_pass(&mut self, rec: &mut Recorder, with_depth: bool) -> Result<ActivePass> {
        let color_id = self
            .bindings
            .render_target
            .ok_or_else(|| GraphicsError::Backend("draw without a render target".into()))?;
        let color = self.attachment(color_id)?;
        let depth = match self.bindings.depth_stencil {
            Some(id) if with_depth => Some(self.attachment(id)?),
            _ => None,
        };

        let color_load = match rec.clears.remove(&color.id) {
            Some(Clear::Color(c)) => wgpu::LoadOp::Clear(c),
            _ => wgpu::LoadOp::Load,
        };
        let depth_attachment = depth.as_ref().map(|depth| {
            let (depth_load, stencil_load) = match rec.clears.remove(&depth.id) {
                Some(Clear::DepthStencil { depth, stencil }) => (
                    wgpu::LoadOp::Clear(depth),
                    wgpu::LoadOp::Clear(stencil as u32),
                ),
                _ => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
            };
            wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: has_stencil(depth.format).then_some(wgpu::Operations {
                    load: stencil_load,
                    store: wgpu::StoreOp::Store,
                }),
            }
        });

        let pass = rec
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: depth_attachment,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();

        Ok(ActivePass {
            pass,
            color_format: color.format,
            depth_format: depth.map(|d| d.format),
            size: color.size,
        })
    }

    fn pipeline(&mut self, program: ResourceId, key: PipelineKey) -> Result<&wgpu::RenderPipeline> {
        let gpu = self
            .programs
            .get_mut(&program)
            .ok_or(GraphicsError::UnknownResource(program))?;
        let device = &self.device;
        let layout = &self.pipeline_layout;
        let super::GpuProgram {
            module,
            vertex_entry,
            pixel_entry,
            stride,
            attributes,
            pipelines,
        } = gpu;
        Ok(pipelines.entry(key).or_insert_with(|| {
            log::debug!("WgpuBackend: new pipeline for {key:?}");
            mk_render_pipeline(
                device,
                layout,
                module,
                (vertex_entry.as_str(), pixel_entry.as_str()),
                key,
                Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
                Some(wgpu::Face::Back),
                &[wgpu::VertexBufferLayout {
                    array_stride: *stride as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: attributes.as_slice(),
                }],
            )
        }))
    }

    fn bind_group(&mut self) -> Result<&wgpu::BindGroup> {
        let key = self.bindings.bind_group_key();
        if !self.bind_groups.contains_key(&key) {
            let buffer = |slot| uniform_binding(&self.buffers, &self.fallbacks.uniform, slot);
            let texture = match key[3] {
                Some(id) => &self.texture_of(id)?.view,
                None => &self.fallbacks.texture,
            };
            let sampler = match key[4] {
                Some(id) => self
                    .samplers
                    .get(&id)
                    .ok_or(GraphicsError::UnknownResource(id))?,
                None => &self.fallbacks.sampler,
            };
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("engine bind group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer(key[0])?,
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffer(key[1])?,
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffer(key[2])?,
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(texture),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });
            self.bind_groups.insert(key, bind_group);
        }
        self.bind_groups
            .get(&key)
            .ok_or_else(|| GraphicsError::Backend("bind group cache miss".into()))
    }

    fn draw_indexed(&mut self, rec: &mut Recorder, index_count: u32, start_index: u32, base_vertex: i32) -> Result<()> {
        let program = self
            .bindings
            .program
            .ok_or_else(|| GraphicsError::Backend("draw without a shader program".into()))?;
        let (vertex_buffer, vertex_offset) = self
            .bindings
            .vertex_buffer
            .ok_or_else(|| GraphicsError::Backend("draw without a vertex buffer".into()))?;
        let (index_buffer, format, index_offset) = self
            .bindings
            .index_buffer
            .ok_or_else(|| GraphicsError::Backend("draw without an index buffer".into()))?;

        let mut active = match rec.pass.take() {
            Some(active) => active,
            None => self.begin_pass(rec, true)?,
        };

        let key = PipelineKey {
            color_format: active.color_format,
            depth_format: active.depth_format,
            topology: self.bindings.topology,
        };
        active.pass.set_pipeline(self.pipeline(program, key)?);
        active.pass.set_bind_group(0, self.bind_group()?, &[]);

        let vertices = self
            .buffers
            .get(&vertex_buffer)
            .ok_or(GraphicsError::UnknownResource(vertex_buffer))?;
        let indices = self
            .buffers
            .get(&index_buffer)
            .ok_or(GraphicsError::UnknownResource(index_buffer))?;
        active
            .pass
            .set_vertex_buffer(0, vertices.slice(vertex_offset as u64..));
        active
            .pass
            .set_index_buffer(indices.slice(index_offset as u64..), index_format(format));

        let (width, height) = (active.size.0 as f32, active.size.1 as f32);
        let vp = self.bindings.viewport.unwrap_or(Viewport {
            width,
            height,
            max_depth: 1.0,
            ..Default::default()
        });
        let x = vp.top_left_x.clamp(0.0, width);
        let y = vp.top_left_y.clamp(0.0, height);
        active.pass.set_viewport(
            x,
            y,
            vp.width.min(width - x),
            vp.height.min(height - y),
            vp.min_depth,
            vp.max_depth,
        );
        active.pass.draw_indexed(
            start_index..start_index + index_count,
            base_vertex,
            0..1,
        );

        rec.read.extend([vertex_buffer, index_buffer]);
        rec.read.extend(self.bindings.constant_buffers.iter().flatten());
        rec.pass = Some(active);
        Ok(())
    }

    /// Overlays go in their own pass without a depth attachment.
    fn draw_overlay(&mut self, rec: &mut Recorder, frame: &OverlayFrame) -> Result<()> {
        rec.pass = None;
        let mut active = self.begin_pass(rec, false)?;
        let textures = &self.textures;
        self.overlay.draw(
            &self.device,
            &mut active.pass,
            active.color_format,
            active.size,
            frame,
            |id| textures.get(&id).map(|t| &t.view),
        );
        Ok(())
    }

    /// Applies clears no draw consumed, then submits the encoder.
    fn submit(&mut self, rec: &mut Recorder) -> Result<()> {
        rec.pass = None;
        let pending: Vec<_> = rec.clears.drain().collect();
        for (view, clear) in pending {
            let target = self.attachment(view)?;
            let mut color_attachment = None;
            let mut depth_attachment = None;
            match clear {
                Clear::Color(c) => {
                    color_attachment = Some(wgpu::RenderPassColorAttachment {
                        view: &target.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(c),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    });
                }
                Clear::DepthStencil { depth, stencil } => {
                    depth_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &target.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(depth),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: has_stencil(target.format).then_some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(stencil as u32),
                            store: wgpu::StoreOp::Store,
                        }),
                    });
                }
            }
            rec.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[color_attachment],
                depth_stencil_attachment: depth_attachment,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        let finished = std::mem::replace(&mut rec.encoder, encoder(&self.device));
        self.queue.submit(iter::once(finished.finish()));
        rec.read.clear();
        Ok(())
    }
}
