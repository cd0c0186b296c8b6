use crate::layers::layer::Layer;

/// Ordered pipeline of sub-layers, possibly nested.
///
/// Consecutive layers are expected to be shape-compatible; nothing is checked
/// until data flows through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeLayer {
    pub layers: Vec<Layer>,
}

impl CompositeLayer {
    pub fn new(layers: Vec<Layer>) -> CompositeLayer {
        CompositeLayer { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
