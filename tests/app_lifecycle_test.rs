use kamogawa::{
    BaseApp,
    config::ActorConfig,
    graphics::{
        HeadlessBackend, ResourceKind,
        command::{Command, ShaderStage},
    },
};
use winit::{event::ElementState, event::MouseButton, keyboard::KeyCode};

mod common;
use common::test_utils::{draw_sizes, headless, headless_app, test_config};

#[test]
fn init_loads_the_configured_actors() {
    let app = headless_app();
    let names: Vec<_> = app.actors().iter().map(|a| a.name().to_string()).collect();
    assert_eq!(names, vec!["Crate", "Banner", "Cube"]);
    for actor in app.actors() {
        assert_eq!(actor.mesh_count(), 1);
        // One texture per mesh plus the shared default texture.
        assert_eq!(actor.textures().len(), 2);
    }
    let default = &app.actors()[0].textures()[1];
    assert!(app.actors().iter().all(|a| a.textures()[1].id() == default.id()));

    let device = app.device();
    assert_eq!(device.live_count_of(ResourceKind::ShaderProgram), 1);
    assert_eq!(device.live_count_of(ResourceKind::BackBuffer), 1);
    assert_eq!(device.live_count_of(ResourceKind::RenderTargetView), 1);
    assert_eq!(device.live_count_of(ResourceKind::DepthStencilView), 1);
    assert_eq!(app.viewport().width, 800.0);
    app.destroy();
}

#[test]
fn frames_draw_every_mesh_after_clearing() {
    let mut app = headless_app();
    for _ in 0..2 {
        app.update().unwrap();
        app.render().unwrap();
    }
    let backend = headless(app.device());
    assert_eq!(backend.present_count(), 2);

    let frame = &backend.frames()[1];
    assert_eq!(draw_sizes(frame), vec![36, 6, 36]);

    let clear = frame
        .iter()
        .position(|c| matches!(c, Command::ClearRenderTarget { .. }))
        .unwrap();
    let first_draw = frame.iter().position(Command::is_draw).unwrap();
    assert!(clear < first_draw);
    assert!(frame.iter().any(|c| matches!(
        c,
        Command::ClearRenderTarget { color, .. } if *color == [0.0, 0.125, 0.3, 1.0]
    )));

    // View and projection stay bound to slots 0 and 1 for both stages.
    let state = backend.state();
    assert!(state.vertex_constant_buffers[0].is_some());
    assert!(state.vertex_constant_buffers[1].is_some());
    assert_eq!(state.vertex_constant_buffers[..2], state.pixel_constant_buffers[..2]);
    assert_eq!(state.vertex_constant_buffers[2], state.pixel_constant_buffers[2]);
    assert!(state.program.is_some());
    app.destroy();
}

#[test]
fn shared_buffers_are_bound_before_the_first_draw() {
    let mut app = headless_app();
    app.update().unwrap();
    app.render().unwrap();
    let frame = &headless(app.device()).frames()[0];
    let first_draw = frame.iter().position(Command::is_draw).unwrap();
    for slot in [0, 1] {
        let bound = frame[..first_draw].iter().any(|c| {
            matches!(c, Command::SetConstantBuffer { stage: ShaderStage::Vertex, slot: s, .. } if *s == slot)
        });
        assert!(bound, "slot {slot}");
    }
    app.destroy();
}

#[test]
fn destroy_releases_every_resource() {
    let mut app = headless_app();
    app.update().unwrap();
    app.render().unwrap();
    app.resize_window(640, 480).unwrap();
    let device = app.destroy();
    assert_eq!(device.live_count(), 0);
    let backend = device.backend::<HeadlessBackend>().unwrap();
    assert_eq!(backend.live_ids().count(), 0);
    assert_eq!(backend.state(), &Default::default());
}

#[test]
fn keyboard_moves_the_camera_and_the_view_buffer() {
    let mut app = headless_app();
    app.update().unwrap();
    let view = *app.view();
    let start = app.camera().position;

    app.input_mut().on_key(KeyCode::KeyW, ElementState::Pressed);
    std::thread::sleep(std::time::Duration::from_millis(20));
    app.update().unwrap();

    assert!(app.camera().position.z > start.z);
    assert!((app.camera().position.x - start.x).abs() < 1e-4);
    assert_ne!(*app.view(), view);
    app.destroy();
}

#[test]
fn the_camera_only_turns_while_the_right_button_is_held() {
    let mut app = headless_app();
    let forward = app.camera().forward;
    app.rotate_camera(100.0, 100.0);
    app.rotate_camera(150.0, 100.0);
    assert_eq!(app.camera().forward, forward);

    app.input_mut()
        .on_mouse_button(MouseButton::Right, ElementState::Pressed);
    app.rotate_camera(200.0, 100.0);
    assert!(app.camera().forward.x > 0.0);
    app.destroy();
}

#[test]
fn spawned_actors_fall_back_to_material_textures() {
    let mut config = test_config();
    config.actors.clear();
    let mut app = BaseApp::init(config, Box::new(HeadlessBackend::new())).unwrap();
    assert!(app.actors().is_empty());

    let actor = app
        .spawn_actor(&ActorConfig {
            name: "Box".into(),
            model: "Models/cube.obj".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(actor.textures().len(), 2);
    assert_eq!(actor.transform().scale, cgmath::Vector3::new(1.0, 1.0, 1.0));

    assert!(
        app.spawn_actor(&ActorConfig {
            name: "Hero".into(),
            model: "Models/invincible.fbx".into(),
            ..Default::default()
        })
        .is_err()
    );
    assert_eq!(app.actors().len(), 1);
    assert_eq!(app.destroy().live_count(), 0);
}

#[test]
fn material_textures_line_up_with_their_meshes() {
    let mut config = test_config();
    config.actors.clear();
    let mut app = BaseApp::init(config, Box::new(HeadlessBackend::new())).unwrap();
    let actor = app
        .spawn_actor(&ActorConfig {
            name: "Triangles".into(),
            model: "../tests/fixtures/two_materials.obj".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(actor.mesh_count(), 3);
    let textures = actor.textures();
    assert_eq!(textures.len(), 4);
    // A uses second.png (64x64), B first.png (32x64), C has no texture.
    assert_eq!(textures[0].size(), (64, 64));
    assert_eq!(textures[1].size(), (32, 64));
    assert_eq!(textures[2].id(), textures[3].id());
    assert_eq!(textures[3].size(), (1, 1));
    assert_eq!(app.destroy().live_count(), 0);
}

#[test]
fn missing_shaders_fail_init() {
    let mut config = test_config();
    config.shader = "shaders/missing.wgsl".into();
    assert!(BaseApp::init(config, Box::new(HeadlessBackend::new())).is_err());
}
