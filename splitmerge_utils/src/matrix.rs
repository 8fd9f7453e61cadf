use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A lightweight row-major Matrix that does almost nothing.
///
/// Rows are fixed-width; the number of rows never changes after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    n_rows: usize,
    n_cols: usize,
    values: Vec<T>,
}

impl<T> Matrix<T> {
    pub fn from_raw_parts(values: Vec<T>, n_rows: usize) -> Self {
        let n_cols = if n_rows == 0 { 0 } else { values.len() / n_rows };
        assert_eq!(values.len(), n_rows * n_cols);
        Matrix {
            n_rows,
            n_cols,
            values,
        }
    }

    /// Create a new Matrix from a vector of vectors
    ///
    /// # Example
    ///
    /// ```rust
    /// # use splitmerge_utils::{Matrix, Shape};
    /// let mat = Matrix::from_vecs(vec![
    ///     vec![0.0, 1.0],
    ///     vec![2.0, 3.0],
    ///     vec![4.0, 5.0],
    /// ]);
    ///
    /// assert_eq!(mat.shape(), (3, 2));
    /// assert_eq!(mat[(2, 0)], 4.0);
    /// ```
    pub fn from_vecs(vecs: Vec<Vec<T>>) -> Self {
        let n_rows = vecs.len();
        let n_cols = vecs.first().map_or(0, |row| row.len());
        let mut values = Vec::with_capacity(n_rows * n_cols);

        vecs.into_iter().for_each(|row| {
            assert_eq!(row.len(), n_cols, "ragged rows");
            values.extend(row);
        });

        Matrix {
            n_rows,
            n_cols,
            values,
        }
    }

    #[inline]
    pub fn nelem(&self) -> usize {
        self.n_cols * self.n_rows
    }

    #[inline]
    pub fn raw_values(&self) -> &Vec<T> {
        &self.values
    }

    /// Borrow row `i`
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = self.n_cols * i;
        &self.values[start..start + self.n_cols]
    }

    /// Mutably borrow row `i`
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        let start = self.n_cols * i;
        &mut self.values[start..start + self.n_cols]
    }

    /// Create an iterator through rows
    #[inline]
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.values.chunks_exact(self.n_cols.max(1))
    }

    /// Create a mutable iterator through rows
    #[inline]
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.values.chunks_exact_mut(self.n_cols.max(1))
    }
}

impl<T: Clone> Matrix<T> {
    /// An `n_rows` by `n_cols` matrix with every entry set to `value`
    pub fn from_elem(value: T, n_rows: usize, n_cols: usize) -> Self {
        Matrix {
            n_rows,
            n_cols,
            values: vec![value; n_rows * n_cols],
        }
    }

    /// Overwrite row `i` with `row`
    ///
    /// # Example
    ///
    /// ```rust
    /// # use splitmerge_utils::Matrix;
    /// let mut mat = Matrix::from_elem(0.0, 3, 2);
    /// mat.set_row(1, &[1.5, -1.5]);
    ///
    /// assert_eq!(mat.row(0), &[0.0, 0.0]);
    /// assert_eq!(mat.row(1), &[1.5, -1.5]);
    /// ```
    #[inline]
    pub fn set_row(&mut self, i: usize, row: &[T]) {
        self.row_mut(i).clone_from_slice(row);
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.values[self.n_cols * i + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.values[self.n_cols * i + j]
    }
}

pub trait Shape {
    fn n_rows(&self) -> usize;
    fn n_cols(&self) -> usize;
    fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }
}

impl<T> Shape for Matrix<T> {
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }
}
