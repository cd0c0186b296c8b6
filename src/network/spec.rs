use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::layers::{
    ActivationLayer, BiasedWeightLayer, CompositeLayer, Layer, ReshapeLayer, ShapeTransform,
    WeightInit, WeightLayer,
};
use crate::loss::loss_type::LossType;
use crate::optim::gradient_descent::OptimizerConfig;

fn default_bias() -> bool {
    true
}

/// Describes one node of a layer graph.
///
/// `Dense` builds a `BiasedWeightLayer` (or a `WeightLayer` when `bias` is
/// false) mapping `inputs` features to `outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        inputs: usize,
        outputs: usize,
        #[serde(default = "default_bias")]
        bias: bool,
        #[serde(default)]
        init: WeightInit,
    },
    Activation { function: ActivationFunction },
    Reshape { transform: ShapeTransform },
    Composite { layers: Vec<LayerSpec> },
}

impl LayerSpec {
    pub fn build(&self) -> Layer {
        match self {
            LayerSpec::Dense { inputs, outputs, bias: true, init } => {
                BiasedWeightLayer::init(*inputs, *outputs, *init).into()
            }
            LayerSpec::Dense { inputs, outputs, bias: false, init } => {
                WeightLayer::init(*inputs, *outputs, *init).into()
            }
            LayerSpec::Activation { function } => ActivationLayer::new(*function).into(),
            LayerSpec::Reshape { transform } => ReshapeLayer::new(*transform).into(),
            LayerSpec::Composite { layers } => {
                CompositeLayer::new(layers.iter().map(LayerSpec::build).collect()).into()
            }
        }
    }
}

/// A serializable network architecture plus the loss and optimizer settings
/// to train it with.
///
/// Only the architecture is stored; every `build()` draws fresh parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the file stem.
    pub name: String,
    /// Ordered list of layers (input → output).
    pub layers: Vec<LayerSpec>,
    pub loss: LossType,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl NetworkSpec {
    /// Builds the graph as a `CompositeLayer` over `layers`.
    ///
    /// `|| spec.build()` can be handed straight to `prepare`.
    pub fn build(&self) -> Layer {
        CompositeLayer::new(self.layers.iter().map(LayerSpec::build).collect()).into()
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
