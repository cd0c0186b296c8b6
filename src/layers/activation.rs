use crate::activation::activation::ActivationFunction;
use crate::math::matrix::Matrix;

/// Stateless element-wise nonlinearity: `a' = f(z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationLayer {
    pub function: ActivationFunction,
}

impl ActivationLayer {
    pub fn new(function: ActivationFunction) -> ActivationLayer {
        ActivationLayer { function }
    }

    pub fn forward(&self, z: &Matrix) -> Matrix {
        self.function.apply(z)
    }
}
