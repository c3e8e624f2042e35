use crate::ecs::{mesh_component::MeshComponent, transform::Transform};

/// Every kind of component an [`Entity`](crate::ecs::entity::Entity) can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Transform(Transform),
    Mesh(MeshComponent),
}

/// Typed access into a [`Component`].
pub trait ComponentKind: Sized {
    fn from_ref(component: &Component) -> Option<&Self>;
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
}

impl ComponentKind for Transform {
    fn from_ref(component: &Component) -> Option<&Self> {
        match component {
            Component::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    fn from_mut(component: &mut Component) -> Option<&mut Self> {
        match component {
            Component::Transform(transform) => Some(transform),
            _ => None,
        }
    }
}

impl ComponentKind for MeshComponent {
    fn from_ref(component: &Component) -> Option<&Self> {
        match component {
            Component::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    fn from_mut(component: &mut Component) -> Option<&mut Self> {
        match component {
            Component::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

impl From<Transform> for Component {
    fn from(transform: Transform) -> Self {
        Component::Transform(transform)
    }
}

impl From<MeshComponent> for Component {
    fn from(mesh: MeshComponent) -> Self {
        Component::Mesh(mesh)
    }
}
