pub mod gradient_descent;
pub mod velocity;

pub use gradient_descent::{GradientDescentOptimizer, OptimizerConfig};
pub use velocity::{LayerVelocity, VelocityStore};

use crate::error::Result;
use crate::layers::Layer;
use crate::loss::LossFunction;
use crate::math::matrix::Matrix;

/// Outcome of one training step: the updated graph and the loss measured
/// by that step's forward pass.
#[derive(Debug, Clone, Copy)]
pub struct OptimalResult<'a> {
    pub layer: &'a Layer,
    pub loss: f64,
}

/// Trains a layer graph one batch at a time.
///
/// An optimizer starts unprepared. `prepare` binds a target graph (replacing
/// any previous one and resetting all optimizer state); `optimize` may then
/// be called any number of times.
pub trait NeuralNetOptimizer {
    /// Calls `supplier` once and trains the graph it returns from now on.
    fn prepare<S>(&mut self, supplier: S)
    where
        S: FnOnce() -> Layer;

    /// Runs one forward and backward pass over `x` (`features x batch`) and
    /// updates the target's parameters in place. `epoch` is informational.
    fn optimize(
        &mut self,
        epoch: usize,
        x: &Matrix,
        y_true: &Matrix,
        loss: &dyn LossFunction,
    ) -> Result<OptimalResult<'_>>;

    /// The graph bound by the last `prepare`, if any.
    fn target(&self) -> Option<&Layer>;
}
