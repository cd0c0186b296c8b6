use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::{BceLoss, HuberLoss, LossFunction, MaeLoss, MseLoss};
use crate::math::matrix::Matrix;

/// Selects which loss function the training loop uses.
///
/// - `Mse`                — Mean-squared error; pair with Identity or Sigmoid output.
/// - `Mae`                — Mean absolute error; pair with Identity output.
/// - `Huber`              — Huber loss (δ=1.0); pair with Identity output.
/// - `BinaryCrossEntropy` — Binary cross-entropy; pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    Mae,
    Huber,
    BinaryCrossEntropy,
}

impl LossType {
    fn function(self) -> &'static dyn LossFunction {
        match self {
            LossType::Mse                => &MseLoss,
            LossType::Mae                => &MaeLoss,
            LossType::Huber              => &HuberLoss,
            LossType::BinaryCrossEntropy => &BceLoss,
        }
    }
}

impl LossFunction for LossType {
    fn apply(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        self.function().apply(y_true, y_pred)
    }

    fn apply_derivative(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<Matrix> {
        self.function().apply_derivative(y_true, y_pred)
    }
}
