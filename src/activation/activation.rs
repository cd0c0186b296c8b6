use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Gelu,
    Swish,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
        }
    }

    /// Element-wise derivative, evaluated at the activation's input.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            },
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { 1.0 } else { alpha * E.powf(x) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                let inner = c * (x + 0.044715 * x.powi(3));
                let tanh_inner = inner.tanh();
                let sech2 = 1.0 - tanh_inner * tanh_inner;
                let d_inner = c * (1.0 + 3.0 * 0.044715 * x.powi(2));
                0.5 * tanh_inner + 0.5 * x * sech2 * d_inner + 0.5
            }
            ActivationFunction::Swish => {
                let sig = 1.0 / (1.0 + E.powf(-x));
                sig + x * sig * (1.0 - sig)
            }
        }
    }

    /// `f(z)` applied to every element.
    pub fn apply(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.function(x))
    }

    /// `f'(z)` applied to every element. `z` is the pre-activation input.
    pub fn apply_derivative(&self, z: &Matrix) -> Matrix {
        z.map(|x| self.derivative(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ActivationFunction; 8] = [
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::Identity,
        ActivationFunction::Tanh,
        ActivationFunction::LeakyReLU { alpha: 0.1 },
        ActivationFunction::Elu { alpha: 1.0 },
        ActivationFunction::Gelu,
        ActivationFunction::Swish,
    ];

    #[test]
    fn derivative_matches_central_difference() {
        let h = 1e-6;
        for f in ALL {
            for &x in &[-1.7, -0.3, 0.4, 2.2] {
                let numeric = (f.function(x + h) - f.function(x - h)) / (2.0 * h);
                assert!(
                    (numeric - f.derivative(x)).abs() < 1e-5,
                    "{f:?} at {x}: numeric {numeric}, analytic {}",
                    f.derivative(x)
                );
            }
        }
    }

    #[test]
    fn relu_masks_non_positive_inputs() {
        let z = Matrix::from_data(vec![vec![-2.0, 0.0, 3.0]]).unwrap();
        let f = ActivationFunction::ReLU;
        assert_eq!(f.apply(&z).data, vec![vec![0.0, 0.0, 3.0]]);
        assert_eq!(f.apply_derivative(&z).data, vec![vec![0.0, 0.0, 1.0]]);
    }

    #[test]
    fn identity_derivative_is_ones() {
        let z = Matrix::random(3, 2);
        assert_eq!(ActivationFunction::Identity.apply_derivative(&z), Matrix::filled(3, 2, 1.0));
    }
}
