use crate::ecs::component::{Component, ComponentKind};

/// A named bag of components.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    name: String,
    components: Vec<Component>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_component(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// First component of type `T`.
    pub fn get_component<T: ComponentKind>(&self) -> Option<&T> {
        self.components.iter().find_map(T::from_ref)
    }

    pub fn get_component_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(T::from_mut)
    }

    /// Every component of type `T`, in insertion order.
    pub fn components_of<'a, T: ComponentKind + 'a>(&'a self) -> impl Iterator<Item = &'a T> + 'a {
        self.components.iter().filter_map(T::from_ref)
    }

    /// Removes every component of type `T` and returns how many there were.
    pub fn remove_components<T: ComponentKind>(&mut self) -> usize {
        let before = self.components.len();
        self.components.retain(|c| T::from_ref(c).is_none());
        before - self.components.len()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}
