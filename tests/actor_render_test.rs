use std::rc::Rc;

use cgmath::Vector3;
use kamogawa::{
    ecs::{actor::Actor, mesh_component::MeshComponent, transform::Transform},
    error::GraphicsError,
    graphics::{
        DeviceContext, ResourceKind,
        command::{Command, PrimitiveTopology, ShaderStage},
        constant_buffers::{CBChangesEveryFrame, to_shader_matrix},
    },
};

mod common;
use common::test_utils::{
    cube, draw_sizes, engine_shader, headless, headless_device, textures_per_draw, triangle, white_texture,
};

#[test]
fn one_draw_per_mesh_sized_to_its_indices() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let mut actor = Actor::new(&mut device, "Mario").unwrap();
    actor
        .set_mesh(&mut device, vec![cube("body"), triangle("cap"), cube("shoe")])
        .unwrap();

    actor.render(&mut ctx);

    assert_eq!(draw_sizes(ctx.commands()), vec![36, 3, 36]);
    let topologies = ctx
        .commands()
        .iter()
        .filter(|c| matches!(c, Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList)))
        .count();
    assert_eq!(topologies, 3);
}

#[test]
fn model_buffer_goes_to_slot_two_of_both_stages() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let mut actor = Actor::new(&mut device, "Actor").unwrap();
    actor.set_mesh(&mut device, vec![triangle("tri")]).unwrap();
    actor.render(&mut ctx);

    let stages: Vec<_> = ctx
        .commands()
        .iter()
        .filter_map(|c| match c {
            Command::SetConstantBuffer { stage, slot, .. } => Some((*stage, *slot)),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![(ShaderStage::Vertex, 2), (ShaderStage::Pixel, 2)]);
    assert!(matches!(ctx.commands()[0], Command::SetSampler { slot: 0, .. }));
}

#[test]
fn short_texture_lists_skip_the_bind_but_still_draw() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let mut actor = Actor::new(&mut device, "Invincible").unwrap();
    actor
        .set_mesh(&mut device, vec![triangle("a"), triangle("b"), triangle("c")])
        .unwrap();
    let first = Rc::new(white_texture(&mut device, "first"));
    actor.set_textures(vec![Rc::clone(&first)]);
    let shader = engine_shader(&mut device);

    shader.render(&mut ctx);
    actor.render(&mut ctx);

    assert_eq!(draw_sizes(ctx.commands()).len(), 3);
    assert_eq!(textures_per_draw(ctx.commands()), vec![Some(first.id()), None, None]);
    // Replays cleanly: every referenced id is live and every slot valid.
    ctx.flush(&mut device).unwrap();
}

#[test]
fn update_writes_the_world_matrix_and_tint() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let mut actor = Actor::new(&mut device, "Actor").unwrap();
    actor.transform_mut().set_transform(
        Vector3::new(2.0, 1.0, 1.0),
        Vector3::new(-1.5707964, 0.0, 1.5707964),
        Vector3::new(1.0, 1.0, 1.0),
    );

    actor.update(0.016, &mut ctx).unwrap();

    let expected = CBChangesEveryFrame {
        world: to_shader_matrix(Transform::new(
            Vector3::new(2.0, 1.0, 1.0),
            Vector3::new(-1.5707964, 0.0, 1.5707964),
            Vector3::new(1.0, 1.0, 1.0),
        )
        .matrix()),
        mesh_color: [0.7, 0.7, 0.7, 1.0],
    };
    assert_eq!(actor.model_constants(), &expected);

    ctx.flush(&mut device).unwrap();
    let buffers: Vec<_> = headless(&device)
        .batches()
        .iter()
        .flatten()
        .filter_map(|c| match c {
            Command::UpdateBuffer { buffer, data } => Some((*buffer, data.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(buffers.len(), 1);
    let (id, data) = &buffers[0];
    assert_eq!(data.as_slice(), bytemuck::bytes_of(&expected));
    assert_eq!(
        headless(&device).buffer_contents(*id).unwrap(),
        bytemuck::bytes_of(&expected)
    );
}

#[test]
fn destroy_releases_everything_but_shared_textures() {
    let mut device = headless_device();
    let shared = Rc::new(white_texture(&mut device, "default"));

    let mut first = Actor::new(&mut device, "first").unwrap();
    first.set_mesh(&mut device, vec![cube("a"), cube("b")]).unwrap();
    let own = Rc::new(white_texture(&mut device, "own"));
    first.set_textures(vec![own, Rc::clone(&shared)]);

    let mut second = Actor::new(&mut device, "second").unwrap();
    second.set_mesh(&mut device, vec![triangle("c")]).unwrap();
    second.set_textures(vec![Rc::clone(&shared)]);

    // 2 textures, 2 x (sampler + constant buffer), 3 x (vertex + index buffer)
    assert_eq!(device.live_count(), 2 + 4 + 6);

    first.destroy(&mut device);
    assert_eq!(device.live_count(), 1 + 2 + 2);
    assert!(device.is_live(shared.id()));

    second.destroy(&mut device);
    assert!(device.is_live(shared.id()));
    let shared_id = shared.id();
    kamogawa::graphics::Texture::destroy_shared(shared, &mut device);
    assert!(!device.is_live(shared_id));
    assert_eq!(device.live_count(), 0);
    assert_eq!(headless(&device).live_ids().count(), 0);
}

#[test]
fn replacing_meshes_releases_the_old_buffers() {
    let mut device = headless_device();
    let mut actor = Actor::new(&mut device, "Actor").unwrap();
    actor.set_mesh(&mut device, vec![cube("a"), cube("b")]).unwrap();
    assert_eq!(device.live_count_of(ResourceKind::Buffer), 1 + 4);

    actor.set_mesh(&mut device, vec![triangle("c")]).unwrap();
    assert_eq!(device.live_count_of(ResourceKind::Buffer), 1 + 2);
    assert_eq!(actor.mesh_count(), 1);
    let names: Vec<_> = actor.meshes().map(|m| m.name.clone()).collect();
    assert_eq!(names, vec!["c".to_string()]);
}

#[test]
fn empty_meshes_are_an_error() {
    let mut device = headless_device();
    let mut actor = Actor::new(&mut device, "Actor").unwrap();
    let err = actor
        .set_mesh(&mut device, vec![triangle("ok"), MeshComponent::new("empty", vec![], vec![])])
        .unwrap_err();
    assert!(matches!(err, GraphicsError::EmptyBuffer(_)));
    assert_eq!(actor.mesh_count(), 0);
    assert_eq!(device.live_count_of(ResourceKind::Buffer), 1);
}

#[test]
fn new_actors_have_a_transform_component() {
    let mut device = headless_device();
    let actor = Actor::new(&mut device, "Actor").unwrap();
    assert_eq!(actor.name(), "Actor");
    assert!(actor.get_component::<Transform>().is_some());
    assert!(actor.get_component::<MeshComponent>().is_none());
    assert_eq!(device.live_count_of(ResourceKind::Sampler), 1);
}
