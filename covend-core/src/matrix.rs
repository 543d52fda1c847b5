//! Square travel-cost matrices.

use thiserror::Error;

/// Travel cost between two points, in whole metres.
pub type Cost = u64;

/// Errors returned by [`DistanceMatrix::from_rows`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// No rows were supplied.
    #[error("distance matrix must contain at least one row")]
    Empty,
    /// A row had a different length from the row count.
    #[error("row {row} has {len} columns but {expected} expected (matrix must be square)")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Number of columns found.
        len: usize,
        /// Number of rows in the matrix.
        expected: usize,
    },
    /// A diagonal entry was not zero.
    #[error("diagonal entry {index} is {cost}; travelling to the same point must cost 0")]
    NonZeroDiagonal {
        /// Index of the offending diagonal entry.
        index: usize,
        /// Value found on the diagonal.
        cost: Cost,
    },
}

/// Dense `n×n` matrix of travel costs stored in row-major order.
///
/// `cost(i, j)` is the cost of travelling from point `i` to point `j`. The
/// diagonal is always zero; the matrix may be asymmetric when the underlying
/// road network has one-way streets.
///
/// # Examples
/// ```
/// use covend_core::DistanceMatrix;
///
/// # fn main() -> Result<(), covend_core::MatrixError> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 7], vec![9, 0]])?;
/// assert_eq!(matrix.cost(0, 1), 7);
/// assert_eq!(matrix.cost(1, 0), 9);
/// assert!(!matrix.is_symmetric());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<Cost>,
}

impl DistanceMatrix {
    /// Create a `size×size` matrix filled with zeros.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a matrix from explicit rows, validating shape and diagonal.
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(MatrixError::NotSquare {
                    row: row_idx,
                    len: row.len(),
                    expected: size,
                });
            }
            if let Some(&cost) = row.get(row_idx)
                && cost != 0
            {
                return Err(MatrixError::NonZeroDiagonal {
                    index: row_idx,
                    cost,
                });
            }
            cells.extend(row);
        }
        Ok(Self { size, cells })
    }

    /// Number of points covered by the matrix.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Checked lookup of the cost from `from` to `to`.
    pub fn get(&self, from: usize, to: usize) -> Option<Cost> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.cells.get(from * self.size + to).copied()
    }

    /// Cost from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the matrix. Instances validate their
    /// indices up front, so solver code can rely on this accessor.
    pub fn cost(&self, from: usize, to: usize) -> Cost {
        assert!(
            from < self.size && to < self.size,
            "matrix index ({from}, {to}) out of bounds for size {}",
            self.size
        );
        self.cells[from * self.size + to]
    }

    /// Overwrite a single cell. Diagonal cells stay at zero.
    pub(crate) fn set(&mut self, from: usize, to: usize, cost: Cost) {
        if from == to {
            return;
        }
        if let Some(cell) = self.cells.get_mut(from * self.size + to) {
            *cell = cost;
        }
    }

    /// Whether `cost(i, j) == cost(j, i)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self.cost(i, j) == self.cost(j, i)))
    }

    /// Iterate over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[Cost]> + '_ {
        self.cells.chunks(self.size.max(1))
    }

    /// Copy the matrix into nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<Cost>> {
        self.rows().map(<[Cost]>::to_vec).collect()
    }
}
