use kamogawa::{
    ecs::actor::Actor,
    error::GraphicsError,
    graphics::{
        Buffer, DeviceContext, SamplerState,
        command::{Command, ShaderStage},
        constant_buffers::CBNeverChanges,
    },
};

mod common;
use common::test_utils::{engine_shader, headless, headless_device, presenting_device, triangle};

#[test]
fn bindings_survive_flushes_until_cleared() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let cb = Buffer::constant_for::<CBNeverChanges>(&mut device, "view").unwrap();
    cb.render(&mut ctx, 0, true);
    ctx.flush(&mut device).unwrap();
    assert!(ctx.commands().is_empty());

    ctx.flush(&mut device).unwrap();
    assert_eq!(headless(&device).state().pixel_constant_buffers[0], Some(cb.id()));

    ctx.clear_state();
    ctx.flush(&mut device).unwrap();
    assert_eq!(headless(&device).state().pixel_constant_buffers[0], None);
}

#[test]
fn out_of_range_slots_are_rejected() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let cb = Buffer::constant_for::<CBNeverChanges>(&mut device, "cb").unwrap();
    let sampler = SamplerState::init(&mut device).unwrap();

    ctx.set_constant_buffer(ShaderStage::Pixel, 3, cb.id());
    assert!(matches!(
        ctx.flush(&mut device),
        Err(GraphicsError::UnsupportedSlot { slot: 3, .. })
    ));

    sampler.render(&mut ctx, 1);
    assert!(matches!(
        ctx.flush(&mut device),
        Err(GraphicsError::UnsupportedSlot { slot: 1, .. })
    ));
}

#[test]
fn released_resources_cannot_be_bound() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let sampler = SamplerState::init(&mut device).unwrap();
    let id = sampler.id();
    sampler.destroy(&mut device);
    ctx.set_sampler(0, id);
    assert!(matches!(
        ctx.flush(&mut device),
        Err(GraphicsError::UnknownResource(released)) if released == id
    ));
    // Releasing twice is harmless.
    device.release(id);
}

#[test]
fn constant_updates_are_size_checked() {
    let mut device = headless_device();
    let mut ctx = DeviceContext::new();
    let small = Buffer::constant(&mut device, "small", 16).unwrap();
    assert!(matches!(
        small.update(&mut ctx, &CBNeverChanges::default()),
        Err(GraphicsError::BufferTooSmall { size: 16, needed: 64 })
    ));
    assert!(ctx.commands().is_empty());
}

#[test]
fn flushed_frames_wait_for_present() {
    let mut device = presenting_device(64, 64);
    let mut ctx = DeviceContext::new();
    let shader = engine_shader(&mut device);
    let mut actor = Actor::new(&mut device, "Actor").unwrap();
    actor.set_mesh(&mut device, vec![triangle("tri")]).unwrap();

    shader.render(&mut ctx);
    actor.update(0.0, &mut ctx).unwrap();
    actor.render(&mut ctx);
    assert_eq!(ctx.draw_count(), 1);
    ctx.flush(&mut device).unwrap();

    let backend = headless(&device);
    assert_eq!(backend.present_count(), 0);
    assert!(matches!(backend.batches()[0][0], Command::SetShaderProgram(_)));
}

#[test]
fn shaders_without_entry_points_fail_to_compile() {
    let mut device = headless_device();
    let err = kamogawa::graphics::ShaderProgram::from_source(
        &mut device,
        "broken.wgsl",
        "fn main() {}".to_string(),
        kamogawa::graphics::input_layout::InputLayout::position_texcoord(),
    )
    .unwrap_err();
    assert!(matches!(err, GraphicsError::ShaderCompilation { .. }));
    assert_eq!(device.live_count(), 0);
}
