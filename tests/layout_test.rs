use std::mem::size_of;

use kamogawa::{
    ecs::mesh_component::SimpleVertex,
    graphics::{
        Format,
        constant_buffers::{CBChangeOnResize, CBChangesEveryFrame, CBNeverChanges},
        input_layout::{InputElement, InputLayout},
    },
};

mod common;
use common::test_utils::{engine_shader, headless_device};

#[test]
fn uniform_blocks_match_the_shader() {
    assert_eq!(size_of::<CBNeverChanges>(), 64);
    assert_eq!(size_of::<CBChangeOnResize>(), 64);
    assert_eq!(size_of::<CBChangesEveryFrame>(), 80);

    let source = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/shaders/engine.wgsl"
    ))
    .unwrap();
    assert!(source.contains("view: mat4x4<f32>"));
    assert!(source.contains("projection: mat4x4<f32>"));
    assert!(source.contains("mesh_color: vec4<f32>"));
}

#[test]
fn appended_elements_follow_each_other() {
    let layout = InputLayout::new(vec![
        InputElement::per_vertex("POSITION", Format::R32G32B32Float),
        InputElement::per_vertex("TEXCOORD", Format::R32G32Float),
    ])
    .unwrap();
    let offsets: Vec<_> = layout
        .elements()
        .iter()
        .map(|e| e.aligned_byte_offset)
        .collect();
    assert_eq!(offsets, vec![0, 12]);
    assert_eq!(layout.stride(), size_of::<SimpleVertex>() as u32);
    assert_eq!(layout, InputLayout::position_texcoord());
}

#[test]
fn shader_programs_keep_their_vertex_layout() {
    let mut device = headless_device();
    let program = engine_shader(&mut device);
    assert_eq!(program.input_layout(), &InputLayout::position_texcoord());
    assert_eq!(program.input_layout().stride(), 20);
    program.destroy(&mut device);
    assert_eq!(device.live_count(), 0);
}

#[test]
fn layouts_outside_slot_zero_are_rejected() {
    let element = InputElement {
        input_slot: 1,
        ..InputElement::per_vertex("POSITION", Format::R32G32B32Float)
    };
    assert!(InputLayout::new(vec![element]).is_err());
    assert!(InputLayout::new(Vec::new()).is_err());
}
