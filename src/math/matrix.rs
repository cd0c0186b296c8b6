use rand::prelude::*;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

use crate::error::{NnError, Result};

/// Dense row-major matrix.
///
/// Activations are laid out `features x batch`: every column is one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Builds a matrix from row vectors. Every row must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());

        if let Some((row, found)) = data.iter()
            .map(|r| r.len())
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(NnError::RaggedData { row, expected: cols, found });
        }

        Ok(Matrix { rows, cols, data })
    }

    /// A `len x 1` column vector.
    pub fn column(values: Vec<f64>) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn random(rows: usize, cols: usize) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal(rng: &mut ThreadRng) -> f64 {
        // (0, 1] keeps ln() finite.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal(rows: usize, cols: usize, std_dev: f64) -> Matrix {
        let mut rng = rand::thread_rng();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(&mut rng) * std_dev;
            }
        }
        res
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Weights are `outputs x inputs`, so `cols` is the fan-in.
    pub fn he(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / cols.max(1) as f64).sqrt())
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    pub fn xavier(rows: usize, cols: usize) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / cols.max(1) as f64).sqrt())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.expect_same_shape(rhs, op)?;

        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&x, &y)| functor(x, y)).collect()
            })
            .collect();

        Ok(Matrix { rows: self.rows, cols: self.cols, data })
    }

    pub(crate) fn expect_same_shape(&self, rhs: &Matrix, op: &'static str) -> Result<()> {
        if self.shape() != rhs.shape() {
            return Err(NnError::ShapeMismatch { op, left: self.shape(), right: rhs.shape() });
        }
        Ok(())
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "add", |x, y| x + y)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "sub", |x, y| x - y)
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |x, y| x * y)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(NnError::ShapeMismatch { op: "dot", left: self.shape(), right: rhs.shape() });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Adds a `rows x 1` column to every column of `self`.
    pub fn add_column(&self, column: &Matrix) -> Result<Matrix> {
        if column.cols != 1 || column.rows != self.rows {
            return Err(NnError::ShapeMismatch {
                op: "add_column",
                left: self.shape(),
                right: column.shape(),
            });
        }

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(column.data.iter())
                .map(|(row, c)| row.iter().map(|x| x + c[0]).collect())
                .collect(),
        })
    }

    /// Mean of every row across the batch axis, as a `rows x 1` column.
    pub fn mean_cols(&self) -> Matrix {
        let n = self.cols.max(1) as f64;
        Matrix::column(self.data.iter().map(|row| row.iter().sum::<f64>() / n).collect())
    }

    /// Re-lays the elements in row-major order as a `rows x cols` matrix.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<Matrix> {
        if rows * cols != self.len() {
            return Err(NnError::ShapeMismatch { op: "reshape", left: self.shape(), right: (rows, cols) });
        }

        let flat: Vec<f64> = self.data.iter().flatten().copied().collect();
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            flat.chunks(cols).map(|chunk| chunk.to_vec()).collect()
        };

        Ok(Matrix { rows, cols, data })
    }

    /// Gathers the given columns, in order, into a new matrix.
    pub fn select_columns(&self, indices: &[usize]) -> Result<Matrix> {
        if let Some(&bad) = indices.iter().find(|&&j| j >= self.cols) {
            return Err(NnError::ShapeMismatch {
                op: "select_columns",
                left: self.shape(),
                right: (self.rows, bad + 1),
            });
        }

        Ok(Matrix {
            rows: self.rows,
            cols: indices.len(),
            data: self.data.iter()
                .map(|row| indices.iter().map(|&j| row[j]).collect())
                .collect(),
        })
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
