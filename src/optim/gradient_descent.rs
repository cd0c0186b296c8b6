use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::error::{NnError, Result};
use crate::layers::{Layer, LayerKind, LayerPath};
use crate::loss::LossFunction;
use crate::math::matrix::Matrix;
use crate::optim::velocity::{LayerVelocity, VelocityStore};
use crate::optim::{NeuralNetOptimizer, OptimalResult};

/// Hyperparameters of [`GradientDescentOptimizer`], loadable from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub learning_rate: f64,
    #[serde(default)]
    pub momentum: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig { learning_rate: 0.01, momentum: 0.0 }
    }
}

impl OptimizerConfig {
    /// `learning_rate` must be finite and positive, `momentum` in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NnError::InvalidConfig(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(NnError::InvalidConfig(format!(
                "momentum must lie in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<GradientDescentOptimizer> {
        self.validate()?;
        Ok(GradientDescentOptimizer::new(self.learning_rate, self.momentum))
    }
}

/// Exponential-moving-average velocity followed by a plain descent step:
///
/// `v ← β·v + (1 − β)·g`, then `θ ← θ − η·v`.
#[derive(Debug, Clone, Copy)]
struct UpdateRule {
    learning_rate: f64,
    momentum: f64,
}

impl UpdateRule {
    fn update(&self, param: &mut Matrix, grad: &Matrix, velocity: &mut Matrix) -> Result<()> {
        let next = velocity.scale(self.momentum).add(&grad.scale(1.0 - self.momentum))?;
        *param = param.sub(&next.scale(self.learning_rate))?;
        *velocity = next;
        Ok(())
    }
}

#[derive(Debug)]
struct Prepared {
    target: Layer,
    velocities: VelocityStore,
}

/// Mini-batch gradient descent with momentum over a layer graph.
#[derive(Debug)]
pub struct GradientDescentOptimizer {
    rule: UpdateRule,
    state: Option<Prepared>,
}

impl GradientDescentOptimizer {
    pub fn new(learning_rate: f64, momentum: f64) -> GradientDescentOptimizer {
        GradientDescentOptimizer {
            rule: UpdateRule { learning_rate, momentum },
            state: None,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.rule.learning_rate
    }

    pub fn momentum(&self) -> f64 {
        self.rule.momentum
    }

    pub fn is_prepared(&self) -> bool {
        self.state.is_some()
    }

    pub fn velocities(&self) -> Option<&VelocityStore> {
        self.state.as_ref().map(|state| &state.velocities)
    }

    /// Gives up the trained graph, returning the optimizer to unprepared.
    pub fn into_target(self) -> Option<Layer> {
        self.state.map(|state| state.target)
    }
}

impl NeuralNetOptimizer for GradientDescentOptimizer {
    fn prepare<S>(&mut self, supplier: S)
    where
        S: FnOnce() -> Layer,
    {
        let target = supplier();
        let velocities = VelocityStore::for_layer(&target);

        debug!(
            velocity_entries = velocities.len(),
            parameters = target.parameter_count(),
            "optimizer prepared"
        );

        self.state = Some(Prepared { target, velocities });
    }

    /// Every forward computation and the loss run before the first parameter
    /// is touched, so failures there leave the graph unchanged. A failure while
    /// unwinding leaves the deeper layers already updated.
    fn optimize(
        &mut self,
        epoch: usize,
        x: &Matrix,
        y_true: &Matrix,
        loss_fn: &dyn LossFunction,
    ) -> Result<OptimalResult<'_>> {
        let rule = self.rule;
        let Prepared { target, velocities } = self.state.as_mut().ok_or(NnError::NotPrepared)?;

        if x.cols == 0 {
            return Err(NnError::EmptyBatch);
        }

        let loss = {
            let mut leaves = target.leaves_mut();
            let (_, loss) = step(rule, &mut leaves, x.clone(), y_true, loss_fn, velocities)?;
            loss
        };

        debug!(epoch, loss, "optimization step");

        Ok(OptimalResult { layer: target, loss })
    }

    fn target(&self) -> Option<&Layer> {
        self.state.as_ref().map(|state| &state.target)
    }
}

/// Feeds `a` (the output of the layer before `leaves[0]`) through the
/// remaining layers, then back-propagates.
///
/// Returns the gradient of the loss w.r.t. `a` together with the loss. Weighted
/// layers are updated on the way back, after their own `da` has been computed
/// from the pre-update weights.
fn step(
    rule: UpdateRule,
    leaves: &mut [(LayerPath, &mut Layer)],
    a: Matrix,
    y_true: &Matrix,
    loss_fn: &dyn LossFunction,
    velocities: &mut VelocityStore,
) -> Result<(Matrix, f64)> {
    let Some(((path, layer), rest)) = leaves.split_first_mut() else {
        let loss = loss_fn.apply(y_true, &a)?;
        let grad = loss_fn.apply_derivative(y_true, &a)?;
        return Ok((grad, loss));
    };

    match &mut **layer {
        Layer::Weight(it) => {
            let z = it.weights.dot(&a)?;
            let (dz, loss) = step(rule, rest, z, y_true, loss_fn, velocities)?;

            let m = a.cols as f64;
            let dw = dz.dot(&a.transpose())?.scale(1.0 / m);
            let da = it.weights.transpose().dot(&dz)?;

            let velocity = velocities.get_mut(path)?;
            rule.update(&mut it.weights, &dw, &mut velocity.dw)?;

            Ok((da, loss))
        }
        Layer::BiasedWeight(it) => {
            let z = it.weights.dot(&a)?.add_column(&it.bias)?;
            let (dz, loss) = step(rule, rest, z, y_true, loss_fn, velocities)?;

            let m = a.cols as f64;
            let dw = dz.dot(&a.transpose())?.scale(1.0 / m);
            let db = dz.mean_cols();
            let da = it.weights.transpose().dot(&dz)?;

            let LayerVelocity { dw: v_dw, db: Some(v_db) } = velocities.get_mut(path)? else {
                return Err(NnError::MissingVelocity(path.clone()));
            };
            rule.update(&mut it.weights, &dw, v_dw)?;
            rule.update(&mut it.bias, &db, v_db)?;

            Ok((da, loss))
        }
        Layer::Activation(it) => {
            let out = it.forward(&a);
            let (da_next, loss) = step(rule, rest, out, y_true, loss_fn, velocities)?;

            // f' is taken at the activation's input, not its output.
            let dz = da_next.hadamard(&it.function.apply_derivative(&a))?;

            Ok((dz, loss))
        }
        Layer::Reshape(it) => {
            let out = it.apply(&a)?;
            let (da_next, loss) = step(rule, rest, out, y_true, loss_fn, velocities)?;

            Ok((it.apply(&da_next)?, loss))
        }
        Layer::Composite(_) => Err(NnError::UnexpectedLayer {
            path: path.clone(),
            kind: LayerKind::Composite,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::{
        ActivationLayer, BiasedWeightLayer, CompositeLayer, ReshapeLayer, WeightInit, WeightLayer,
    };
    use crate::loss::MseLoss;

    fn scalar(v: f64) -> Matrix {
        Matrix::column(vec![v])
    }

    #[test]
    fn config_validation() {
        assert!(OptimizerConfig { learning_rate: 0.1, momentum: 0.9 }.build().is_ok());
        assert!(OptimizerConfig { learning_rate: 0.0, momentum: 0.0 }.validate().is_err());
        assert!(OptimizerConfig { learning_rate: f64::NAN, momentum: 0.0 }.validate().is_err());
        assert!(OptimizerConfig { learning_rate: 0.1, momentum: 1.0 }.validate().is_err());
        assert!(OptimizerConfig { learning_rate: 0.1, momentum: -0.1 }.validate().is_err());
    }

    #[test]
    fn config_momentum_defaults_to_zero() {
        let config: OptimizerConfig = serde_json::from_str(r#"{"learning_rate": 0.5}"#).unwrap();
        assert_eq!(config, OptimizerConfig { learning_rate: 0.5, momentum: 0.0 });
    }

    #[test]
    fn update_rule_blends_velocity_and_gradient() {
        let rule = UpdateRule { learning_rate: 0.5, momentum: 0.25 };
        let mut param = scalar(1.0);
        let mut velocity = scalar(4.0);
        rule.update(&mut param, &scalar(8.0), &mut velocity).unwrap();
        // 0.25·4 + 0.75·8 = 7
        assert_eq!(velocity, scalar(7.0));
        assert_eq!(param, scalar(1.0 - 3.5));
    }

    #[test]
    fn update_rule_rejects_misshaped_velocity() {
        let rule = UpdateRule { learning_rate: 0.5, momentum: 0.5 };
        let mut param = Matrix::zeros(2, 1);
        let mut velocity = Matrix::zeros(1, 2);
        assert!(rule.update(&mut param, &Matrix::zeros(2, 1), &mut velocity).is_err());
        assert_eq!(param, Matrix::zeros(2, 1));
    }

    #[test]
    fn input_gradient_has_input_shape() {
        let mut graph: Layer = CompositeLayer::new(vec![
            BiasedWeightLayer::init(3, 4, WeightInit::Xavier).into(),
            ActivationLayer::new(ActivationFunction::Tanh).into(),
            ReshapeLayer::exchange((4, 5), (2, 10)).unwrap().into(),
            WeightLayer::init(2, 2, WeightInit::Xavier).into(),
            ReshapeLayer::exchange((4, 5), (2, 10)).unwrap().into(),
        ]).into();
        let mut velocities = VelocityStore::for_layer(&graph);
        let rule = UpdateRule { learning_rate: 0.01, momentum: 0.9 };

        let x = Matrix::random(3, 5);
        let y = Matrix::random(4, 5);

        let mut leaves = graph.leaves_mut();
        let (grad, loss) = step(rule, &mut leaves, x.clone(), &y, &MseLoss, &mut velocities).unwrap();
        assert_eq!(grad.shape(), x.shape());
        assert!(loss.is_finite());
    }

    #[test]
    fn forward_failure_leaves_parameters_untouched() {
        let first = WeightLayer::new(Matrix::filled(2, 2, 1.0));
        let mut optimizer = GradientDescentOptimizer::new(0.1, 0.0);
        optimizer.prepare(|| -> Layer {
            CompositeLayer::new(vec![
                first.clone().into(),
                // expects 3 inputs but receives 2
                WeightLayer::new(Matrix::filled(1, 3, 1.0)).into(),
            ]).into()
        });

        let err = optimizer
            .optimize(0, &Matrix::filled(2, 1, 1.0), &scalar(0.0), &MseLoss)
            .unwrap_err();
        assert!(matches!(err, NnError::ShapeMismatch { op: "dot", .. }));

        let Some(Layer::Composite(graph)) = optimizer.target() else {
            panic!("target should be a composite");
        };
        assert_eq!(graph.layers[0], Layer::Weight(first));
    }

    #[test]
    fn composite_leaf_is_rejected() {
        let mut empty: Layer = CompositeLayer::default().into();
        let mut leaves = vec![(LayerPath::from([3]), &mut empty)];
        let mut velocities = VelocityStore::default();
        let rule = UpdateRule { learning_rate: 0.1, momentum: 0.0 };

        let err = step(rule, &mut leaves, scalar(1.0), &scalar(1.0), &MseLoss, &mut velocities)
            .unwrap_err();
        assert!(matches!(
            err,
            NnError::UnexpectedLayer { kind: LayerKind::Composite, .. }
        ));
    }
}
