//! Input abstraction for PHATE data matrices.
//!
//! This module defines the `PhateInput` trait which allows `fit` and
//! `transform` to accept ndarray matrices and row-major nested vectors
//! interchangeably. Rows are observations, columns are features.

use crate::primitives::errors::PhateError;
use ndarray::{Array2, ArrayBase, CowArray, Data, Ix2};
use num_traits::Float;

/// Trait for types that can be used as an `n × p` input matrix.
pub trait PhateInput<T: Float> {
    /// Borrow (or assemble) the input as a 2-D array.
    fn as_phate_matrix(&self) -> Result<CowArray<'_, T, Ix2>, PhateError>;
}

impl<T: Float, S> PhateInput<T> for ArrayBase<S, Ix2>
where
    S: Data<Elem = T>,
{
    fn as_phate_matrix(&self) -> Result<CowArray<'_, T, Ix2>, PhateError> {
        Ok(CowArray::from(self.view()))
    }
}

impl<T: Float> PhateInput<T> for [Vec<T>] {
    fn as_phate_matrix(&self) -> Result<CowArray<'_, T, Ix2>, PhateError> {
        let n = self.len();
        let p = self.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(n * p);
        for (i, row) in self.iter().enumerate() {
            if row.len() != p {
                return Err(PhateError::InvalidInput(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    p
                )));
            }
            flat.extend_from_slice(row);
        }
        Array2::from_shape_vec((n, p), flat)
            .map(CowArray::from)
            .map_err(|e| PhateError::InvalidInput(e.to_string()))
    }
}

impl<T: Float> PhateInput<T> for Vec<Vec<T>> {
    fn as_phate_matrix(&self) -> Result<CowArray<'_, T, Ix2>, PhateError> {
        self.as_slice().as_phate_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn ndarray_input_is_borrowed() {
        let x: Array2<f64> = array![[1.0, 2.0], [3.0, 4.0]];
        let m = x.as_phate_matrix().unwrap();
        assert!(m.is_view());
        assert_eq!(m.dim(), (2, 2));
    }

    #[test]
    fn nested_vec_input_is_assembled_row_major() {
        let x = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let m = x.as_phate_matrix().unwrap();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[1, 0]], 4.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            x.as_phate_matrix(),
            Err(PhateError::InvalidInput(_))
        ));
    }
}
