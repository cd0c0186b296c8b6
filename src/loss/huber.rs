use crate::error::Result;
use crate::loss::{elementwise_grad, elementwise_mean, LossFunction};
use crate::math::matrix::Matrix;

pub struct HuberLoss;

// Fixed δ = 1.0 keeps `LossType::Huber` a unit variant.
const DELTA: f64 = 1.0;

impl LossFunction for HuberLoss {
    /// Scalar Huber: mean(h(predicted − expected))
    /// where h(x) = 0.5·x²  if |x| ≤ δ
    ///              δ·(|x| − 0.5·δ)  otherwise
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        elementwise_mean(y_true, y_pred, |y, p| {
            let x = p - y;
            if x.abs() <= DELTA {
                0.5 * x * x
            } else {
                DELTA * (x.abs() - 0.5 * DELTA)
            }
        })
    }

    /// Per-output gradient: x  if |x| ≤ δ,  else δ·sign(x)
    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix> {
        elementwise_grad(y_true, y_pred, |y, p| {
            let x = p - y;
            if x.abs() <= DELTA { x } else { DELTA * x.signum() }
        })
    }
}
