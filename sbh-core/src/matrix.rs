//! Fixed-shape dense matrices
//!
//! Row-major storage with the handful of element-wise operations the ACO
//! engine needs: power, Hadamard product, scaling, floor clamping, indexed
//! accumulation and masked row normalisation. Shapes are fixed at construction
//! and checked whenever two matrices are combined.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: (usize, usize), right: (usize, usize) },

    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Data length {found} does not match a {rows}x{cols} matrix")]
    DataLength { rows: usize, cols: usize, found: usize },
}

pub type MatrixResult<T> = Result<T, MatrixError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<T>>) -> MatrixResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n_cols {
                return Err(MatrixError::RaggedRow {
                    row,
                    expected: n_cols,
                    found: values.len(),
                });
            }
            data.extend(values);
        }

        Ok(Self { rows: n_rows, cols: n_cols, data })
    }
}

impl<T> Matrix<T> {
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> MatrixResult<Self> {
        if data.len() != rows * cols {
            return Err(MatrixError::DataLength { rows, cols, found: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Wrap `n * n` row-major values produced by a crate-internal builder
    pub(crate) fn from_square_data(n: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), n * n);
        Self { rows: n, cols: n, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate `(row, col, value)` triples in row-major order
    pub fn indexed_iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols.max(1);
        self.data.iter().enumerate().map(move |(i, v)| (i / cols, i % cols, v))
    }

    pub fn map<U, F>(&self, f: F) -> Matrix<U>
    where
        F: Fn(&T) -> U,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Combine two same-shaped matrices element by element
    pub fn zip_with<U, V, F>(&self, other: &Matrix<U>, f: F) -> MatrixResult<Matrix<V>>
    where
        F: Fn(&T, &U) -> V,
    {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(a, b)| f(a, b)).collect(),
        })
    }
}

impl Matrix<f64> {
    pub fn powf(&self, exponent: f64) -> Self {
        self.map(|v| v.powf(exponent))
    }

    pub fn hadamard(&self, other: &Matrix<f64>) -> MatrixResult<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Raise every entry below `floor` up to `floor`
    pub fn clamp_min(&mut self, floor: f64) {
        for v in &mut self.data {
            if *v < floor {
                *v = floor;
            }
        }
    }

    pub fn add_at(&mut self, row: usize, col: usize, amount: f64) {
        self[(row, col)] += amount;
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "matrix index ({row}, {col}) out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "matrix index ({row}, {col}) out of bounds");
        &mut self.data[row * self.cols + col]
    }
}

/// Normalise the entries of `row` selected by `mask` into a probability
/// distribution; unselected entries become zero.
///
/// Returns `None` when the selected entries do not sum to a positive finite
/// value, i.e. when no distribution exists.
pub fn normalize_masked(row: &[f64], mask: &[bool]) -> Option<Vec<f64>> {
    debug_assert_eq!(row.len(), mask.len());

    let total: f64 = row
        .iter()
        .zip(mask)
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .sum();

    if !(total.is_finite() && total > 0.0) {
        return None;
    }

    Some(
        row.iter()
            .zip(mask)
            .map(|(&v, &keep)| if keep { v / total } else { 0.0 })
            .collect(),
    )
}
