use crate::error::Result;
use crate::loss::{elementwise_grad, elementwise_mean, LossFunction};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl LossFunction for MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        elementwise_mean(y_true, y_pred, |y, p| (p - y).powi(2))
    }

    /// Per-output gradient: 2·(predicted - expected)
    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix> {
        elementwise_grad(y_true, y_pred, |y, p| 2.0 * (p - y))
    }
}
