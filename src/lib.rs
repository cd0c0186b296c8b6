pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NnError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::{
    ActivationLayer, BiasedWeightLayer, CompositeLayer, Layer, LayerKind, LayerPath,
    ReshapeLayer, ShapeTransform, WeightInit, WeightLayer,
};
pub use network::{NetworkSpec, LayerSpec};
pub use loss::{LossFunction, LossType, MseLoss};
pub use optim::{
    GradientDescentOptimizer, NeuralNetOptimizer, OptimalResult, OptimizerConfig,
};
pub use train::{train_loop, Dataset, EpochStats, TrainConfig};
