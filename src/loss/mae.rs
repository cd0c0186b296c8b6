use crate::error::Result;
use crate::loss::{elementwise_grad, elementwise_mean, LossFunction};
use crate::math::matrix::Matrix;

pub struct MaeLoss;

impl LossFunction for MaeLoss {
    /// Scalar MAE: mean(|predicted - expected|)
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        elementwise_mean(y_true, y_pred, |y, p| (p - y).abs())
    }

    /// Per-output subgradient: sign(p - y)  (0 when equal)
    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix> {
        elementwise_grad(y_true, y_pred, |y, p| {
            let diff = p - y;
            if diff > 0.0 { 1.0 } else if diff < 0.0 { -1.0 } else { 0.0 }
        })
    }
}
