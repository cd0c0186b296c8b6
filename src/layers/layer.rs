use std::fmt;

use crate::error::Result;
use crate::layers::{
    ActivationLayer, BiasedWeightLayer, CompositeLayer, LayerPath, ReshapeLayer, ShapeTransform,
    WeightLayer,
};
use crate::math::matrix::Matrix;

/// A node of a layer graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Weight(WeightLayer),
    BiasedWeight(BiasedWeightLayer),
    Activation(ActivationLayer),
    Reshape(ReshapeLayer),
    Composite(CompositeLayer),
}

/// Variant tag of a [`Layer`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Weight,
    BiasedWeight,
    Activation,
    Reshape,
    Composite,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerKind::Weight       => "WeightLayer",
            LayerKind::BiasedWeight => "BiasedWeightLayer",
            LayerKind::Activation   => "ActivationLayer",
            LayerKind::Reshape      => "ReshapeLayer",
            LayerKind::Composite    => "CompositeLayer",
        };
        f.write_str(name)
    }
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Weight(_)       => LayerKind::Weight,
            Layer::BiasedWeight(_) => LayerKind::BiasedWeight,
            Layer::Activation(_)   => LayerKind::Activation,
            Layer::Reshape(_)      => LayerKind::Reshape,
            Layer::Composite(_)    => LayerKind::Composite,
        }
    }

    /// Inference pass; parameters are left untouched.
    pub fn forward(&self, a: &Matrix) -> Result<Matrix> {
        match self {
            Layer::Weight(layer)       => layer.forward(a),
            Layer::BiasedWeight(layer) => layer.forward(a),
            Layer::Activation(layer)   => Ok(layer.forward(a)),
            Layer::Reshape(layer)      => layer.apply(a),
            Layer::Composite(composite) => {
                let mut current = a.clone();
                for layer in &composite.layers {
                    current = layer.forward(&current)?;
                }
                Ok(current)
            }
        }
    }

    /// Number of trainable scalars in this layer and everything below it.
    pub fn parameter_count(&self) -> usize {
        match self {
            Layer::Weight(layer)        => layer.weights.len(),
            Layer::BiasedWeight(layer)  => layer.weights.len() + layer.bias.len(),
            Layer::Activation(_) | Layer::Reshape(_) => 0,
            Layer::Composite(composite) => composite.layers.iter().map(Layer::parameter_count).sum(),
        }
    }

    /// Input `(rows, cols)` pinned by the first leaf that constrains shape,
    /// looking through activations and transposes. `None` marks an axis that
    /// leaf leaves free. An `Exchange` is read in its `from` direction.
    pub fn input_shape(&self) -> (Option<usize>, Option<usize>) {
        let mut transposed = false;
        for (_, leaf) in self.leaves() {
            let shape = match leaf {
                Layer::Weight(it)       => (Some(it.weights.cols), None),
                Layer::BiasedWeight(it) => (Some(it.weights.cols), None),
                Layer::Reshape(it) => match it.transform {
                    ShapeTransform::Transpose => {
                        transposed = !transposed;
                        continue;
                    }
                    ShapeTransform::Exchange { from, .. } => (Some(from.0), Some(from.1)),
                },
                Layer::Activation(_) | Layer::Composite(_) => continue,
            };
            return if transposed { (shape.1, shape.0) } else { shape };
        }
        (None, None)
    }

    /// Depth-first list of every non-composite layer with its path.
    pub fn leaves(&self) -> Vec<(LayerPath, &Layer)> {
        let mut out = Vec::new();
        self.collect_leaves(LayerPath::root(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, path: LayerPath, out: &mut Vec<(LayerPath, &'a Layer)>) {
        match self {
            Layer::Composite(composite) => {
                for (i, child) in composite.layers.iter().enumerate() {
                    child.collect_leaves(path.child(i), out);
                }
            }
            leaf => out.push((path, leaf)),
        }
    }

    /// Mutable counterpart of [`Layer::leaves`], in the same order.
    pub fn leaves_mut(&mut self) -> Vec<(LayerPath, &mut Layer)> {
        let mut out = Vec::new();
        collect_leaves_mut(self, LayerPath::root(), &mut out);
        out
    }
}

fn collect_leaves_mut<'a>(layer: &'a mut Layer, path: LayerPath, out: &mut Vec<(LayerPath, &'a mut Layer)>) {
    match layer {
        Layer::Composite(composite) => {
            for (i, child) in composite.layers.iter_mut().enumerate() {
                collect_leaves_mut(child, path.child(i), out);
            }
        }
        leaf => out.push((path, leaf)),
    }
}

impl From<WeightLayer> for Layer {
    fn from(layer: WeightLayer) -> Self {
        Layer::Weight(layer)
    }
}

impl From<BiasedWeightLayer> for Layer {
    fn from(layer: BiasedWeightLayer) -> Self {
        Layer::BiasedWeight(layer)
    }
}

impl From<ActivationLayer> for Layer {
    fn from(layer: ActivationLayer) -> Self {
        Layer::Activation(layer)
    }
}

impl From<ReshapeLayer> for Layer {
    fn from(layer: ReshapeLayer) -> Self {
        Layer::Reshape(layer)
    }
}

impl From<CompositeLayer> for Layer {
    fn from(layer: CompositeLayer) -> Self {
        Layer::Composite(layer)
    }
}
