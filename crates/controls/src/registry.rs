use std::collections::HashMap;

use crate::control::{Control, ControlSerial};

/// Owner of every control in a session, keyed by name.
///
/// Inserting under an existing name replaces the previous control.
#[derive(Debug, Default)]
pub struct Registry {
    controls: HashMap<String, Control>,
    next_serial: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `control` and returns whatever was registered under its name.
    pub fn insert(&mut self, mut control: Control) -> Option<Control> {
        self.next_serial += 1;
        control.set_serial(ControlSerial(self.next_serial));
        self.controls.insert(control.name().to_string(), control)
    }

    pub fn get(&self, name: &str) -> Option<&Control> {
        self.controls.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.controls.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Control> {
        self.controls.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controls.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Controls in creation order.
    pub fn ordered(&self) -> Vec<&Control> {
        let mut controls: Vec<&Control> = self.controls.values().collect();
        controls.sort_by_key(|control| control.serial());
        controls
    }
}
