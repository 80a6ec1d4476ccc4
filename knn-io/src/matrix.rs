use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Row {row} has {actual} columns, expected {expected}")]
    Ragged { row: usize, expected: usize, actual: usize },
    #[error("Buffer of {len} elements cannot hold {rows}x{cols}")]
    BufferSize { rows: usize, cols: usize, len: usize },
}

/// Dense row-major matrix.
///
/// # Layout
/// All rows live back to back in a single `Vec<T>`; row `i` occupies
/// `data[i * cols..(i + 1) * cols]`. A row's position is its identity: the
/// index hands it back as the label of that vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Wraps an existing row-major buffer.
    ///
    /// # Errors
    /// Returns `ShapeError::BufferSize` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, ShapeError> {
        if rows * cols != data.len() {
            return Err(ShapeError::BufferSize { rows, cols, len: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    /// Flattens a list of rows. The first row fixes the column count.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ShapeError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let n = rows.len();
        let mut data = Vec::with_capacity(n * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(ShapeError::Ragged { row: i, expected: cols, actual: row.len() });
            }
            data.extend(row);
        }
        Ok(Self { rows: n, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// # Panics
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }
}

impl<T: Clone> Matrix<T> {
    /// Copies rows `start..end` into a new matrix.
    fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            rows: end - start,
            cols: self.cols,
            data: self.data[start * self.cols..end * self.cols].to_vec(),
        }
    }

    /// First `n` rows (all of them if fewer exist).
    pub fn head(&self, n: usize) -> Self {
        self.slice_rows(0, n.min(self.rows))
    }

    /// Last `n` rows (all of them if fewer exist).
    pub fn tail(&self, n: usize) -> Self {
        self.slice_rows(self.rows.saturating_sub(n), self.rows)
    }
}

/// Prints rows in bracketed form, e.g. `[[0, 1], [1, 0]]` spread over lines.
impl<T: fmt::Debug> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.rows_iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            write!(f, "{:?}", row)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0f32, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err, ShapeError::Ragged { row: 1, expected: 2, actual: 1 });
    }

    #[test]
    fn test_head_and_tail_clamp() {
        let m = Matrix::from_rows((0..7i64).map(|i| vec![i, i * 10]).collect()).unwrap();
        assert_eq!(m.head(5).rows(), 5);
        assert_eq!(m.tail(5).row(0), &[2, 20]);
        assert_eq!(m.tail(5).row(4), &[6, 60]);

        let small = m.head(3);
        assert_eq!(small.head(5), small);
        assert_eq!(small.tail(5), small);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(Matrix::from_vec(2, 3, vec![0u8; 6]).is_ok());
        assert_eq!(
            Matrix::from_vec(2, 3, vec![0u8; 5]).unwrap_err(),
            ShapeError::BufferSize { rows: 2, cols: 3, len: 5 }
        );
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(vec![vec![0i64, 1], vec![3, 2]]).unwrap();
        assert_eq!(m.to_string(), "[[0, 1]\n [3, 2]]");
    }
}
