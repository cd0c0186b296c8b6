pub mod mse;
pub mod mae;
pub mod huber;
pub mod bce;
pub mod loss_type;

pub use mse::MseLoss;
pub use mae::MaeLoss;
pub use huber::HuberLoss;
pub use bce::BceLoss;
pub use loss_type::LossType;

use crate::error::Result;
use crate::math::matrix::Matrix;

/// A differentiable training objective.
///
/// Both methods fail with `ShapeMismatch` when `y_true` and `y_pred` differ
/// in shape.
pub trait LossFunction {
    /// Scalar loss of a prediction batch.
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64>;

    /// Gradient of the loss w.r.t. `y_pred`, shaped like `y_pred`.
    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix>;
}

/// Mean of `f(y_true, y_pred)` over every element.
pub(crate) fn elementwise_mean<F>(y_true: &Matrix, y_pred: &Matrix, f: F) -> Result<f64>
where
    F: Fn(f64, f64) -> f64,
{
    y_true.expect_same_shape(y_pred, "loss")?;
    let n = y_pred.len().max(1) as f64;
    let total: f64 = y_true.data.iter().flatten()
        .zip(y_pred.data.iter().flatten())
        .map(|(&y, &p)| f(y, p))
        .sum();
    Ok(total / n)
}

/// `f(y_true, y_pred)` per element, shaped like `y_pred`.
pub(crate) fn elementwise_grad<F>(y_true: &Matrix, y_pred: &Matrix, f: F) -> Result<Matrix>
where
    F: Fn(f64, f64) -> f64,
{
    y_true.expect_same_shape(y_pred, "loss derivative")?;
    Ok(Matrix {
        rows: y_pred.rows,
        cols: y_pred.cols,
        data: y_true.data.iter().zip(y_pred.data.iter())
            .map(|(row_y, row_p)| row_y.iter().zip(row_p.iter()).map(|(&y, &p)| f(y, p)).collect())
            .collect(),
    })
}
