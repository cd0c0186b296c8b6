use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// A pure layout change that is its own inverse.
///
/// The same transform maps activations forward and gradients back, so it must
/// never change values, only where they sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTransform {
    Transpose,
    /// Row-major re-layout between two shapes of equal size, in either
    /// direction. Any other input shape is rejected.
    Exchange { from: (usize, usize), to: (usize, usize) },
}

impl ShapeTransform {
    pub fn apply(&self, m: &Matrix) -> Result<Matrix> {
        match *self {
            ShapeTransform::Transpose => Ok(m.transpose()),
            ShapeTransform::Exchange { from, to } => {
                if m.shape() == from {
                    m.reshape(to.0, to.1)
                } else if m.shape() == to {
                    m.reshape(from.0, from.1)
                } else {
                    Err(NnError::ShapeMismatch { op: "exchange", left: m.shape(), right: from })
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReshapeLayer {
    pub transform: ShapeTransform,
}

impl ReshapeLayer {
    pub fn new(transform: ShapeTransform) -> ReshapeLayer {
        ReshapeLayer { transform }
    }

    pub fn transpose() -> ReshapeLayer {
        ReshapeLayer::new(ShapeTransform::Transpose)
    }

    pub fn exchange(from: (usize, usize), to: (usize, usize)) -> Result<ReshapeLayer> {
        if from.0 * from.1 != to.0 * to.1 {
            return Err(NnError::ShapeMismatch { op: "exchange", left: from, right: to });
        }
        Ok(ReshapeLayer::new(ShapeTransform::Exchange { from, to }))
    }

    pub fn apply(&self, m: &Matrix) -> Result<Matrix> {
        self.transform.apply(m)
    }
}
