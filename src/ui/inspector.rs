//! What the inspector edits, independent of how it is drawn.

use cgmath::Vector3;

use crate::ecs::transform::Transform;

pub const DRAG_SPEED: f32 = 0.1;
pub const DRAG_MIN: f32 = -10.0;
pub const DRAG_MAX: f32 = 10.0;
pub const DRAG_FORMAT: &str = "%.3f";
pub const LABEL_COLUMN_WIDTH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    Position,
    Rotation,
    Scale,
}

impl TransformField {
    pub const ALL: [TransformField; 3] = [Self::Position, Self::Rotation, Self::Scale];

    pub fn label(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::Rotation => "Rotation",
            Self::Scale => "Scale",
        }
    }

    /// Value an axis takes when its reset button is pressed.
    pub fn reset_value(self) -> f32 {
        match self {
            Self::Position | Self::Rotation => 0.0,
            Self::Scale => 1.0,
        }
    }

    pub fn get(self, transform: &Transform) -> Vector3<f32> {
        match self {
            Self::Position => transform.position(),
            Self::Rotation => transform.rotation(),
            Self::Scale => transform.scale(),
        }
    }

    pub fn set(self, transform: &mut Transform, value: Vector3<f32>) {
        match self {
            Self::Position => transform.set_position(value),
            Self::Rotation => transform.set_rotation(value),
            Self::Scale => transform.set_scale(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Self::X, Self::Y, Self::Z];

    pub fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Selection plus the edit operations of the transform inspector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inspector {
    selected: Option<usize>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selects actor `index`; out of range clears the selection.
    pub fn select(&mut self, index: usize, actor_count: usize) {
        self.selected = (index < actor_count).then_some(index);
    }

    /// Keeps the selection valid after the actor list changed. Selects the
    /// first actor if there was no selection.
    pub fn sync(&mut self, actor_count: usize) {
        self.selected = match self.selected {
            Some(i) if i < actor_count => Some(i),
            _ if actor_count > 0 => Some(0),
            _ => None,
        };
    }

    pub fn axis_value(transform: &Transform, field: TransformField, axis: Axis) -> f32 {
        field.get(transform)[axis.index()]
    }

    pub fn reset_axis(transform: &mut Transform, field: TransformField, axis: Axis) {
        let mut value = field.get(transform);
        value[axis.index()] = field.reset_value();
        field.set(transform, value);
    }

    /// Writes a value into a field as is. Typed values may leave the drag
    /// range.
    pub fn set_axis(transform: &mut Transform, field: TransformField, axis: Axis, value: f32) {
        let mut current = field.get(transform);
        current[axis.index()] = value;
        field.set(transform, current);
    }

    /// Applies a mouse drag of `pixels`. Dragging stops at the drag range.
    pub fn drag_axis(transform: &mut Transform, field: TransformField, axis: Axis, pixels: f32) {
        let value = Self::axis_value(transform, field, axis) + pixels * DRAG_SPEED;
        Self::set_axis(transform, field, axis, value.clamp(DRAG_MIN, DRAG_MAX));
    }
}
