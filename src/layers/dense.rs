use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// How freshly built weight matrices are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    Zeros,
    /// Uniform in [-1, 1).
    Random,
    /// N(0, sqrt(2 / fan_in)); use before ReLU-family activations.
    He,
    /// N(0, sqrt(1 / fan_in)); use before Sigmoid/Tanh/Identity.
    #[default]
    Xavier,
}

impl WeightInit {
    pub fn matrix(self, rows: usize, cols: usize) -> Matrix {
        match self {
            WeightInit::Zeros  => Matrix::zeros(rows, cols),
            WeightInit::Random => Matrix::random(rows, cols),
            WeightInit::He     => Matrix::he(rows, cols),
            WeightInit::Xavier => Matrix::xavier(rows, cols),
        }
    }
}

/// Affine map without bias: `z = W · a`.
///
/// `weights` is `outputs x inputs`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightLayer {
    pub weights: Matrix,
}

impl WeightLayer {
    pub fn new(weights: Matrix) -> WeightLayer {
        WeightLayer { weights }
    }

    pub fn init(inputs: usize, outputs: usize, init: WeightInit) -> WeightLayer {
        WeightLayer::new(init.matrix(outputs, inputs))
    }

    pub fn forward(&self, a: &Matrix) -> Result<Matrix> {
        self.weights.dot(a)
    }
}

/// Affine map with bias: `z = W · a + b`.
///
/// `weights` is `outputs x inputs`, `bias` is an `outputs x 1` column that is
/// broadcast over the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasedWeightLayer {
    pub weights: Matrix,
    pub bias: Matrix,
}

impl BiasedWeightLayer {
    pub fn new(weights: Matrix, bias: Matrix) -> Result<BiasedWeightLayer> {
        if bias.cols != 1 || bias.rows != weights.rows {
            return Err(NnError::ShapeMismatch {
                op: "bias",
                left: weights.shape(),
                right: bias.shape(),
            });
        }
        Ok(BiasedWeightLayer { weights, bias })
    }

    /// Biases start at zero whatever the weight initializer.
    pub fn init(inputs: usize, outputs: usize, init: WeightInit) -> BiasedWeightLayer {
        BiasedWeightLayer {
            weights: init.matrix(outputs, inputs),
            bias: Matrix::zeros(outputs, 1),
        }
    }

    pub fn forward(&self, a: &Matrix) -> Result<Matrix> {
        self.weights.dot(a)?.add_column(&self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_must_be_a_matching_column() {
        let w = Matrix::zeros(3, 2);
        assert!(BiasedWeightLayer::new(w.clone(), Matrix::zeros(3, 1)).is_ok());
        assert!(BiasedWeightLayer::new(w.clone(), Matrix::zeros(2, 1)).is_err());
        assert!(BiasedWeightLayer::new(w, Matrix::zeros(3, 2)).is_err());
    }

    #[test]
    fn init_shapes_follow_outputs_by_inputs() {
        let layer = BiasedWeightLayer::init(4, 2, WeightInit::He);
        assert_eq!(layer.weights.shape(), (2, 4));
        assert_eq!(layer.bias, Matrix::zeros(2, 1));
        assert_eq!(WeightLayer::init(4, 2, WeightInit::Zeros).weights, Matrix::zeros(2, 4));
    }

    #[test]
    fn biased_forward_adds_bias_to_every_sample() {
        let w = Matrix::from_data(vec![vec![1.0, 1.0]]).unwrap();
        let layer = BiasedWeightLayer::new(w, Matrix::column(vec![0.5])).unwrap();
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(layer.forward(&a).unwrap().data, vec![vec![4.5, 6.5]]);
    }
}
