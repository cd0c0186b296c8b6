pub mod activation;
pub mod composite;
pub mod dense;
pub mod layer;
pub mod path;
pub mod reshape;

pub use activation::ActivationLayer;
pub use composite::CompositeLayer;
pub use dense::{BiasedWeightLayer, WeightInit, WeightLayer};
pub use layer::{Layer, LayerKind};
pub use path::LayerPath;
pub use reshape::{ReshapeLayer, ShapeTransform};
