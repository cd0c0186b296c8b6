use crate::error::Result;
use crate::loss::{elementwise_grad, elementwise_mean, LossFunction};
use crate::math::matrix::Matrix;

pub struct BceLoss;

const EPS: f64 = 1e-12;

impl LossFunction for BceLoss {
    /// Scalar BCE: -mean(y·log(p+ε) + (1-y)·log(1-p+ε))
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        elementwise_mean(y_true, y_pred, |y, p| {
            -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln())
        })
    }

    /// Per-output gradient: (p - y) / ((p + ε) · (1 - p + ε))
    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix> {
        elementwise_grad(y_true, y_pred, |y, p| (p - y) / ((p + EPS) * (1.0 - p + EPS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confident_correct_prediction_is_cheap() {
        let y = Matrix::column(vec![1.0, 0.0]);
        let good = Matrix::column(vec![0.99, 0.01]);
        let bad = Matrix::column(vec![0.01, 0.99]);
        assert!(BceLoss.apply(&y, &good).unwrap() < BceLoss.apply(&y, &bad).unwrap());
    }

    #[test]
    fn gradient_pushes_towards_target() {
        let y = Matrix::column(vec![1.0, 0.0]);
        let p = Matrix::column(vec![0.5, 0.5]);
        let grad = BceLoss.apply_derivative(&y, &p).unwrap();
        assert!(grad.data[0][0] < 0.0);
        assert!(grad.data[1][0] > 0.0);
    }
}
