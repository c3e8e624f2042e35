use std::{cell::Cell, rc::Rc};

use kamogawa::{
    BaseApp,
    error::GraphicsError,
    graphics::{
        DepthStencilView, Format, RenderTargetView, SwapChain, Texture, Viewport,
        backend::TextureUsage, headless::HeadlessResource,
    },
};

mod common;
use common::test_utils::{FailingDepthViews, headless, headless_app, headless_device, test_config};

#[test]
fn resize_rebuilds_targets_at_the_new_size() {
    let mut app = headless_app();
    let old_rtv = app.render_target_view().unwrap().id();
    let old_back_buffer = app.back_buffer().unwrap().id();

    app.resize_window(1024, 768).unwrap();

    assert_eq!(app.window_size(), (1024, 768));
    let viewport = app.viewport();
    assert_eq!((viewport.width, viewport.height), (1024.0, 768.0));
    assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));
    assert_eq!(app.back_buffer().unwrap().size(), (1024, 768));

    assert!(!app.device().is_live(old_rtv));
    assert!(!app.device().is_live(old_back_buffer));
    assert!(app.device().is_live(app.render_target_view().unwrap().id()));
    assert!(app.device().is_live(app.depth_stencil_view().unwrap().id()));
    assert_eq!(headless(app.device()).resizes(), &[(1024, 768)]);
    assert_eq!(app.device().swap_chain_size(), Some((1024, 768)));
    assert_eq!(headless(app.device()).surface_size(), Some((1024, 768)));

    let back_buffer = app.back_buffer().unwrap();
    assert_eq!(back_buffer.format(), Format::R8G8B8A8Unorm);
    let rtv = app.render_target_view().unwrap().id();
    assert!(matches!(
        headless(app.device()).resource(rtv),
        Some(HeadlessResource::RenderTargetView { texture, .. }) if *texture == back_buffer.id()
    ));

    // The next frame renders into the new targets.
    app.update().unwrap();
    app.render().unwrap();
    let frame = headless(app.device()).frames().last().unwrap().clone();
    assert!(frame.iter().any(|c| matches!(
        c,
        kamogawa::graphics::command::Command::SetViewport(v) if v.width == 1024.0
    )));
    app.destroy();
}

#[test]
fn resize_refreshes_the_projection() {
    let mut app = headless_app();
    let before = *app.projection();
    app.resize_window(400, 800).unwrap();
    let after = *app.projection();
    assert_ne!(before, after);
    // Column 0, row 0 is the horizontal scale h / aspect.
    let h = 1.0 / (std::f32::consts::FRAC_PI_4 / 2.0).tan();
    assert!((after.projection[0][0] - h / 0.5).abs() < 1e-4);
    app.destroy();
}

#[test]
fn minimized_windows_are_ignored() {
    let mut app = headless_app();
    let rtv = app.render_target_view().unwrap().id();
    app.resize_window(0, 600).unwrap();
    app.resize_window(800, 0).unwrap();
    assert_eq!(app.window_size(), (800, 600));
    assert_eq!(app.render_target_view().unwrap().id(), rtv);
    assert!(headless(app.device()).resizes().is_empty());
    app.destroy();
}

#[test]
fn a_failed_resize_releases_its_partial_targets() {
    let failures = Rc::new(Cell::new(0));
    let backend = FailingDepthViews::new(Rc::clone(&failures));
    let mut app = BaseApp::init(test_config(), Box::new(backend)).unwrap();
    let live = app.device().live_count();

    failures.set(1);
    let err = app.resize_window(1024, 768).unwrap_err();
    assert!(format!("{err:#}").contains("depth stencil view"), "{err:#}");
    assert!(app.render_target_view().is_none());
    assert!(app.back_buffer().is_none());
    assert_eq!(app.device().back_buffer_references(), 0);
    // Back buffer, render target view and depth texture are gone.
    assert_eq!(app.device().live_count(), live - 4);

    app.resize_window(1024, 768).unwrap();
    assert_eq!(app.back_buffer().unwrap().size(), (1024, 768));
    assert!(app.depth_stencil_view().is_some());
    assert_eq!(app.device().live_count(), live);
    assert_eq!(headless(app.device()).resizes(), &[(1024, 768), (1024, 768)]);

    app.resize_window(640, 480).unwrap();
    assert_eq!(app.viewport().width, 640.0);
    assert_eq!(app.destroy().live_count(), 0);
}

#[test]
fn resizing_with_live_back_buffer_views_fails() {
    let mut device = headless_device();
    let (mut swap_chain, back_buffer) = SwapChain::init(&mut device, 640, 480).unwrap();
    let rtv = RenderTargetView::init(&mut device, &back_buffer, Format::R8G8B8A8Unorm).unwrap();

    let err = swap_chain.resize_buffers(&mut device, 800, 600).unwrap_err();
    assert!(matches!(err, GraphicsError::SwapChainBuffersInUse(2)));

    rtv.destroy(&mut device);
    let err = swap_chain.resize_buffers(&mut device, 800, 600).unwrap_err();
    assert!(matches!(err, GraphicsError::SwapChainBuffersInUse(1)));
    assert_eq!(swap_chain.size(), (640, 480));

    back_buffer.destroy(&mut device);
    swap_chain.resize_buffers(&mut device, 800, 600).unwrap();
    assert_eq!(swap_chain.size(), (800, 600));

    let back_buffer = swap_chain.get_buffer(&mut device).unwrap();
    assert_eq!(back_buffer.size(), (800, 600));
    RenderTargetView::init(&mut device, &back_buffer, Format::R8G8B8A8Unorm).unwrap();
}

#[test]
fn depth_buffers_do_not_block_a_resize() {
    let mut device = headless_device();
    let (mut swap_chain, back_buffer) = SwapChain::init(&mut device, 640, 480).unwrap();
    let depth = Texture::render_target(
        &mut device,
        "depth",
        640,
        480,
        Format::D24UnormS8Uint,
        TextureUsage::DepthStencil,
        1,
    )
    .unwrap();
    let _dsv = DepthStencilView::init(&mut device, &depth, Format::D24UnormS8Uint).unwrap();
    back_buffer.destroy(&mut device);
    swap_chain.resize_buffers(&mut device, 320, 240).unwrap();
}

#[test]
fn views_of_a_released_back_buffer_cannot_be_created() {
    let mut device = headless_device();
    let (_swap_chain, back_buffer) = SwapChain::init(&mut device, 640, 480).unwrap();
    let id = back_buffer.id();
    back_buffer.destroy(&mut device);
    let stale = kamogawa::graphics::Texture::render_target(
        &mut device,
        "other",
        1,
        1,
        Format::R8G8B8A8Unorm,
        TextureUsage::RenderTarget,
        1,
    )
    .unwrap();
    assert_ne!(stale.id(), id);
    assert!(matches!(
        device.create_render_target_view(id, Format::R8G8B8A8Unorm),
        Err(GraphicsError::UnknownResource(_))
    ));
}

#[test]
fn zero_sized_viewports_are_rejected() {
    assert!(matches!(
        Viewport::init(0, 10),
        Err(GraphicsError::InvalidDimensions { width: 0, height: 10 })
    ));
    assert!(Viewport::init(1, 1).is_ok());
}

#[test]
fn resizing_without_a_swap_chain_fails() {
    let mut device = headless_device();
    assert!(matches!(
        device.resize_swap_chain(10, 10),
        Err(GraphicsError::NoSwapChain)
    ));
}
