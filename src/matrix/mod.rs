//! Dense row-major matrices with shape-checked products.
//!
//! Every product has an allocating form (`multiply`) and an `_into` form that
//! writes into a pre-shaped output so the per-tick path never allocates.

mod random;

pub use random::{randomize_gaussian, shuffle_in_place};

use thiserror::Error;

/// Shape violations. Nothing is ever truncated or padded to make shapes fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("{op}: inner dimensions differ ({lhs} vs {rhs})")]
    InnerDimension {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },

    #[error("{op}: output is {actual_rows}x{actual_cols}, expected {rows}x{cols}")]
    OutputShape {
        op: &'static str,
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("buffer of {actual} elements cannot back a {rows}x{cols} matrix")]
    BufferLength {
        rows: usize,
        cols: usize,
        actual: usize,
    },
}

/// Dense matrix, row-major. `data.len() == rows * cols` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Zero-filled matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap an existing row-major buffer
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        if data.len() != rows * cols {
            return Err(MatrixError::BufferLength {
                rows,
                cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build element-wise from `f(row, col)`
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |r, c| if r == c { 1.0 } else { 0.0 })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Reset every element to 0.0 without reallocating
    pub fn zero(&mut self) {
        self.data.fill(0.0);
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    /// C = A·B
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        multiply_into(self, rhs, &mut out)?;
        Ok(out)
    }

    /// C = A·Bᵀ
    pub fn multiply_transpose_right(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        let mut out = Matrix::zeros(self.rows, rhs.rows);
        multiply_transpose_right_into(self, rhs, &mut out)?;
        Ok(out)
    }

    /// C = Aᵀ·B
    pub fn multiply_transpose_left(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        let mut out = Matrix::zeros(self.cols, rhs.cols);
        multiply_transpose_left_into(self, rhs, &mut out)?;
        Ok(out)
    }
}

fn check_output(
    op: &'static str,
    out: &Matrix,
    rows: usize,
    cols: usize,
) -> Result<(), MatrixError> {
    if out.rows != rows || out.cols != cols {
        return Err(MatrixError::OutputShape {
            op,
            rows,
            cols,
            actual_rows: out.rows,
            actual_cols: out.cols,
        });
    }
    Ok(())
}

/// `out = a · b`. Requires `a.cols == b.rows` and `out` shaped `a.rows × b.cols`.
pub fn multiply_into(a: &Matrix, b: &Matrix, out: &mut Matrix) -> Result<(), MatrixError> {
    const OP: &str = "multiply";
    if a.cols != b.rows {
        return Err(MatrixError::InnerDimension {
            op: OP,
            lhs: a.cols,
            rhs: b.rows,
        });
    }
    check_output(OP, out, a.rows, b.cols)?;

    out.zero();
    let n = b.cols;
    // i-k-j order keeps both `b` and `out` rows streaming sequentially
    for (a_row, out_row) in a.data.chunks_exact(a.cols.max(1)).zip(out.data.chunks_exact_mut(n.max(1))) {
        for (k, &a_ik) in a_row.iter().enumerate() {
            let b_row = &b.data[k * n..(k + 1) * n];
            for (o, &b_kj) in out_row.iter_mut().zip(b_row) {
                *o += a_ik * b_kj;
            }
        }
    }
    Ok(())
}

/// `out = a · bᵀ`. Requires `a.cols == b.cols` and `out` shaped `a.rows × b.rows`.
pub fn multiply_transpose_right_into(
    a: &Matrix,
    b: &Matrix,
    out: &mut Matrix,
) -> Result<(), MatrixError> {
    const OP: &str = "multiply_transpose_right";
    if a.cols != b.cols {
        return Err(MatrixError::InnerDimension {
            op: OP,
            lhs: a.cols,
            rhs: b.cols,
        });
    }
    check_output(OP, out, a.rows, b.rows)?;

    for i in 0..a.rows {
        let a_row = a.row(i);
        for j in 0..b.rows {
            let dot: f32 = a_row.iter().zip(b.row(j)).map(|(x, y)| x * y).sum();
            out.data[i * b.rows + j] = dot;
        }
    }
    Ok(())
}

/// `out = aᵀ · b`. Requires `a.rows == b.rows` and `out` shaped `a.cols × b.cols`.
pub fn multiply_transpose_left_into(
    a: &Matrix,
    b: &Matrix,
    out: &mut Matrix,
) -> Result<(), MatrixError> {
    const OP: &str = "multiply_transpose_left";
    if a.rows != b.rows {
        return Err(MatrixError::InnerDimension {
            op: OP,
            lhs: a.rows,
            rhs: b.rows,
        });
    }
    check_output(OP, out, a.cols, b.cols)?;

    out.zero();
    let n = b.cols;
    for k in 0..a.rows {
        let a_row = a.row(k);
        let b_row = b.row(k);
        for (i, &a_ki) in a_row.iter().enumerate() {
            let out_row = &mut out.data[i * n..(i + 1) * n];
            for (o, &b_kj) in out_row.iter_mut().zip(b_row) {
                *o += a_ki * b_kj;
            }
        }
    }
    Ok(())
}
