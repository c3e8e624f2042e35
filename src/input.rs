//! Keyboard and mouse state collected from window events.

use std::collections::HashSet;

use winit::{
    event::{ElementState, MouseButton},
    keyboard::KeyCode,
};

#[derive(Debug, Default, Clone)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    cursor: Option<(f64, f64)>,
    right_button: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pressed.insert(key);
            }
            ElementState::Released => {
                self.pressed.remove(&key);
            }
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.right_button = state.is_pressed();
        }
    }

    /// Records a cursor position and returns the movement since the previous
    /// one. The first position yields no movement.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> (f32, f32) {
        let delta = match self.cursor {
            Some((last_x, last_y)) => ((x - last_x) as f32, (y - last_y) as f32),
            None => (0.0, 0.0),
        };
        self.cursor = Some((x, y));
        delta
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_rotating(&self) -> bool {
        self.right_button
    }

    /// Forgets held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed.clear();
        self.right_button = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_deltas_start_from_the_first_position() {
        let mut input = InputState::new();
        assert_eq!(input.on_cursor_moved(10.0, 10.0), (0.0, 0.0));
        assert_eq!(input.on_cursor_moved(13.0, 8.0), (3.0, -2.0));
    }

    #[test]
    fn keys_are_held_until_released() {
        let mut input = InputState::new();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_pressed(KeyCode::KeyW));
        input.on_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_pressed(KeyCode::KeyW));
    }
}
