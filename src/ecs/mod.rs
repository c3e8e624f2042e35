//! A minimal entity-component system: entities hold a list of tagged
//! components, and [`actor::Actor`] is the entity the renderer knows how to
//! draw.

pub mod actor;
pub mod component;
pub mod entity;
pub mod mesh_component;
pub mod transform;

pub use actor::Actor;
pub use component::{Component, ComponentKind};
pub use entity::Entity;
pub use mesh_component::{MeshComponent, SimpleVertex};
pub use transform::Transform;
