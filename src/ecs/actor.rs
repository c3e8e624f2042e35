//! The renderable entity: a transform, its meshes and everything the GPU
//! needs to draw them.

use std::rc::Rc;

use crate::{
    ecs::{
        component::ComponentKind, entity::Entity, mesh_component::MeshComponent,
        transform::Transform,
    },
    error::Result,
    graphics::{
        backend::BufferKind,
        buffer::Buffer,
        command::PrimitiveTopology,
        constant_buffers::{CBChangesEveryFrame, to_shader_matrix},
        device::GraphicsDevice,
        device_context::DeviceContext,
        sampler_state::SamplerState,
        texture::Texture,
    },
};

/// Constant buffer slot of the per-actor [`CBChangesEveryFrame`].
pub const MODEL_BUFFER_SLOT: u32 = 2;

const MESH_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

#[derive(Debug)]
pub struct Actor {
    entity: Entity,
    vertex_buffers: Vec<Buffer>,
    index_buffers: Vec<Buffer>,
    textures: Vec<Rc<Texture>>,
    sampler: SamplerState,
    model: CBChangesEveryFrame,
    model_buffer: Buffer,
}

impl Actor {
    /// Creates an actor with a default transform, no meshes, its sampler
    /// and its per-frame constant buffer.
    pub fn new(device: &mut GraphicsDevice, name: impl Into<String>) -> Result<Self> {
        let mut entity = Entity::new(name);
        entity.add_component(Transform::default());

        let model_buffer = Buffer::constant_for::<CBChangesEveryFrame>(device, entity.name())?;
        let sampler = match SamplerState::init(device) {
            Ok(sampler) => sampler,
            Err(err) => {
                log::error!("Actor {}: cannot create sampler: {err}", entity.name());
                model_buffer.destroy(device);
                return Err(err);
            }
        };
        log::info!("Actor {} created", entity.name());
        Ok(Self {
            entity,
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            textures: Vec::new(),
            sampler,
            model: CBChangesEveryFrame::default(),
            model_buffer,
        })
    }

    pub fn name(&self) -> &str {
        self.entity.name()
    }

    pub fn get_component<T: ComponentKind>(&self) -> Option<&T> {
        self.entity.get_component()
    }

    pub fn get_component_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.entity.get_component_mut()
    }

    pub fn transform(&self) -> &Transform {
        self.entity
            .get_component::<Transform>()
            .unwrap_or_else(|| unreachable!("actors are created with a transform"))
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        self.entity
            .get_component_mut::<Transform>()
            .unwrap_or_else(|| unreachable!("actors are created with a transform"))
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshComponent> + '_ {
        self.entity.components_of::<MeshComponent>()
    }

    pub fn mesh_count(&self) -> usize {
        self.index_buffers.len()
    }

    pub fn textures(&self) -> &[Rc<Texture>] {
        &self.textures
    }

    /// Last values written to the per-frame constant buffer.
    pub fn model_constants(&self) -> &CBChangesEveryFrame {
        &self.model
    }

    /// Replaces the actor's meshes and uploads one vertex and one index
    /// buffer per mesh. Buffers of the previous meshes are released first.
    /// On failure the actor is left without meshes.
    pub fn set_mesh(&mut self, device: &mut GraphicsDevice, meshes: Vec<MeshComponent>) -> Result<()> {
        self.release_mesh_buffers(device);
        self.entity.remove_components::<MeshComponent>();

        for mesh in &meshes {
            let buffers = Buffer::from_mesh(device, mesh, BufferKind::Vertex).and_then(|vertex_buffer| {
                match Buffer::from_mesh(device, mesh, BufferKind::Index) {
                    Ok(index_buffer) => Ok((vertex_buffer, index_buffer)),
                    Err(err) => {
                        vertex_buffer.destroy(device);
                        Err(err)
                    }
                }
            });
            match buffers {
                Ok((vertex_buffer, index_buffer)) => {
                    self.vertex_buffers.push(vertex_buffer);
                    self.index_buffers.push(index_buffer);
                }
                Err(err) => {
                    log::error!("Actor {}: buffers for mesh {}: {err}", self.entity.name(), mesh.name);
                    self.release_mesh_buffers(device);
                    return Err(err);
                }
            }
        }
        log::info!("Actor {}: {} meshes", self.entity.name(), meshes.len());
        for mesh in meshes {
            self.entity.add_component(mesh);
        }
        Ok(())
    }

    /// Textures are matched to meshes by index. Missing entries leave the
    /// mesh with whatever texture is bound.
    pub fn set_textures(&mut self, textures: Vec<Rc<Texture>>) {
        self.textures = textures;
    }

    /// Recomposes the world matrix and records the constant buffer update.
    pub fn update(&mut self, delta_time: f32, ctx: &mut DeviceContext) -> Result<()> {
        let transform = self.transform_mut();
        transform.update(delta_time);
        let world = transform.matrix();
        self.model = CBChangesEveryFrame {
            world: to_shader_matrix(world),
            mesh_color: MESH_COLOR,
        };
        self.model_buffer.update(ctx, &self.model)
    }

    /// Records one indexed draw per mesh.
    pub fn render(&self, ctx: &mut DeviceContext) {
        self.sampler.render(ctx, 0);
        for (i, (vertex_buffer, index_buffer)) in self
            .vertex_buffers
            .iter()
            .zip(&self.index_buffers)
            .enumerate()
        {
            vertex_buffer.render(ctx, 0, false);
            index_buffer.render(ctx, 0, false);
            if let Some(texture) = self.textures.get(i) {
                texture.render(ctx, 0);
            }
            self.model_buffer.render(ctx, MODEL_BUFFER_SLOT, true);
            ctx.set_primitive_topology(PrimitiveTopology::TriangleList);
            ctx.draw_indexed(index_buffer.element_count(), 0, 0);
        }
    }

    fn release_mesh_buffers(&mut self, device: &mut GraphicsDevice) {
        for buffer in self.vertex_buffers.drain(..).chain(self.index_buffers.drain(..)) {
            buffer.destroy(device);
        }
    }

    /// Releases every GPU resource the actor owns. Shared textures survive
    /// until their last owner is gone.
    pub fn destroy(mut self, device: &mut GraphicsDevice) {
        self.release_mesh_buffers(device);
        for texture in self.textures.drain(..) {
            Texture::destroy_shared(texture, device);
        }
        self.model_buffer.destroy(device);
        self.sampler.destroy(device);
        log::info!("Actor {} destroyed", self.entity.name());
    }
}
