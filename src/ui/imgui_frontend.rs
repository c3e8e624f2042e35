//! Dear ImGui front-end of the inspector. Draw data is converted into an
//! [`OverlayFrame`] and recorded like any other command.

use imgui::{Condition, DrawCmd, DrawCmdParams, FontSource, TextureId};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::{
    ecs::actor::Actor,
    error::Result,
    graphics::{
        device::GraphicsDevice,
        device_context::DeviceContext,
        overlay::{OverlayDraw, OverlayFrame, OverlayVertex},
        texture::Texture,
    },
    ui::inspector::{
        Axis, DRAG_FORMAT, DRAG_MAX, DRAG_MIN, DRAG_SPEED, Inspector, LABEL_COLUMN_WIDTH,
        TransformField,
    },
};

pub(super) struct ImguiFrontend {
    imgui: imgui::Context,
    font: Texture,
}

impl ImguiFrontend {
    pub fn init(device: &mut GraphicsDevice, width: u32, height: u32) -> Result<Self> {
        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);
        imgui.io_mut().display_size = [width as f32, height as f32];

        let fonts = imgui.fonts();
        fonts.add_font(&[FontSource::DefaultFontData { config: None }]);
        let atlas = fonts.build_rgba32_texture();
        let font = Texture::from_rgba(device, "imgui font atlas", atlas.width, atlas.height, atlas.data)?;
        fonts.tex_id = TextureId::new(font.id().raw() as usize);

        log::info!("UserInterface: font atlas {}x{}", font.size().0, font.size().1);
        Ok(Self { imgui, font })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.imgui.io_mut().display_size = [width as f32, height as f32];
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let io = self.imgui.io_mut();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                io.add_mouse_pos_event([position.x as f32, position.y as f32]);
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => imgui::MouseButton::Left,
                    MouseButton::Right => imgui::MouseButton::Right,
                    MouseButton::Middle => imgui::MouseButton::Middle,
                    _ => return false,
                };
                io.add_mouse_button_event(button, *state == ElementState::Pressed);
                io.want_capture_mouse
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let [h, v] = match delta {
                    MouseScrollDelta::LineDelta(h, v) => [*h, *v],
                    MouseScrollDelta::PixelDelta(p) => [p.x as f32 / 20.0, p.y as f32 / 20.0],
                };
                io.add_mouse_wheel_event([h, v]);
                io.want_capture_mouse
            }
            _ => false,
        }
    }

    pub fn render(
        &mut self,
        ctx: &mut DeviceContext,
        inspector: &mut Inspector,
        actors: &mut [Actor],
        delta_time: f32,
    ) {
        self.imgui.io_mut().delta_time = delta_time.max(1.0 / 1000.0);

        let ui: &imgui::Ui = self.imgui.new_frame();
        ui.window("Inspector")
            .size([340.0, 180.0], Condition::FirstUseEver)
            .build(|| {
                let names: Vec<&str> = actors.iter().map(Actor::name).collect();
                let mut selected = inspector.selected().unwrap_or(0);
                if !names.is_empty() && ui.combo_simple_string("Actor", &mut selected, &names) {
                    inspector.select(selected, names.len());
                }
                let Some(actor) = inspector.selected().and_then(|i| actors.get_mut(i)) else {
                    ui.text_disabled("No actor");
                    return;
                };
                ui.separator();
                for field in TransformField::ALL {
                    vec3_control(ui, actor, field);
                }
            });

        let draw_data = self.imgui.render();
        let frame = overlay_frame(draw_data, &self.font);
        if !frame.is_empty() {
            ctx.draw_overlay(frame);
        }
    }

    pub fn destroy(self, device: &mut GraphicsDevice) {
        self.font.destroy(device);
    }
}

/// One labelled row: a reset button and a drag field per axis.
fn vec3_control(ui: &imgui::Ui, actor: &mut Actor, field: TransformField) {
    let _id = ui.push_id(field.label());
    ui.columns(2, field.label(), false);
    ui.set_column_width(0, LABEL_COLUMN_WIDTH);
    ui.text(field.label());
    ui.next_column();

    let transform = actor.transform_mut();
    for axis in Axis::ALL {
        if axis != Axis::X {
            ui.same_line();
        }
        if ui.button(axis.label()) {
            Inspector::reset_axis(transform, field, axis);
        }
        ui.same_line();
        let mut value = Inspector::axis_value(transform, field, axis);
        ui.set_next_item_width(60.0);
        let changed = imgui::Drag::new(format!("##{}", axis.label()))
            .speed(DRAG_SPEED)
            .range(DRAG_MIN, DRAG_MAX)
            .display_format(DRAG_FORMAT)
            .build(ui, &mut value);
        if changed {
            Inspector::set_axis(transform, field, axis, value);
        }
    }
    ui.columns(1, field.label(), false);
}

fn overlay_frame(draw_data: &imgui::DrawData, font: &Texture) -> OverlayFrame {
    let mut frame = OverlayFrame {
        display_pos: draw_data.display_pos,
        display_size: draw_data.display_size,
        ..Default::default()
    };
    let mut absolute_vertex_offset = 0;
    let mut absolute_index_offset = 0;
    for list in draw_data.draw_lists() {
        frame.vertices.extend(list.vtx_buffer().iter().map(|v| OverlayVertex {
            pos: v.pos,
            uv: v.uv,
            color: v.col,
        }));
        frame.indices.extend_from_slice(list.idx_buffer());

        for command in list.commands() {
            match command {
                DrawCmd::Elements { count, cmd_params } => {
                    let DrawCmdParams {
                        clip_rect,
                        vtx_offset,
                        idx_offset,
                        ..
                    } = cmd_params;
                    let base_index = absolute_index_offset + idx_offset as u32;
                    frame.draws.push(OverlayDraw {
                        clip_rect,
                        indices: base_index..base_index + count as u32,
                        base_vertex: absolute_vertex_offset + vtx_offset as i32,
                        texture: font.id(),
                    });
                }
                DrawCmd::ResetRenderState => {}
                DrawCmd::RawCallback { .. } => {
                    log::warn!("UserInterface: raw draw callbacks are not supported");
                }
            }
        }

        absolute_vertex_offset += list.vtx_buffer().len() as i32;
        absolute_index_offset += list.idx_buffer().len() as u32;
    }
    frame
}
