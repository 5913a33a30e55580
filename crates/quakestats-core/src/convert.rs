// =============================================================================
// ndarray <-> nalgebra Conversion Utilities
// =============================================================================
//
// Data lives in ndarray (vectors, design matrices); the decompositions live
// in nalgebra. This module centralizes the crossings so the solver never
// writes element-by-element copy loops of its own.
//
// =============================================================================

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::error::{Result, StatsError};

/// Convert an ndarray `Array2` to a nalgebra `DMatrix`.
///
/// Handles non-contiguous arrays by making a contiguous copy first.
#[inline]
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = (a.nrows(), a.ncols());
    let contig = a.as_standard_layout();
    DMatrix::from_row_slice(nrows, ncols, contig.as_slice().expect("contiguous layout"))
}

/// Convert an ndarray `Array1` to a nalgebra `DVector`.
#[inline]
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra `DMatrix` to an ndarray `Array2`.
#[inline]
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    let (nrows, ncols) = m.shape();
    let mut result = Array2::zeros((nrows, ncols));
    for i in 0..nrows {
        for j in 0..ncols {
            result[[i, j]] = m[(i, j)];
        }
    }
    result
}

/// Convert a nalgebra `DVector` to an ndarray `Array1`.
#[inline]
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(v.iter().copied())
}

/// Solve A x = b and also return A^-1, using Cholesky when A is positive
/// definite and LU otherwise.
///
/// This is the pattern the weighted-least-squares step needs: the solution
/// gives the coefficients, the inverse gives the covariance for standard
/// errors. A singular system is reported as a `LinearAlgebra` error, which
/// in regression terms almost always means collinear predictors.
pub fn solve_and_invert(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let p = a.nrows();

    if let Some(chol) = a.clone().cholesky() {
        let solution = chol.solve(b);
        let inverse = chol.solve(&DMatrix::identity(p, p));
        return Ok((to_array1(&solution), to_array2(&inverse)));
    }

    // Fall back to LU for matrices that are symmetric but not quite
    // positive definite (degenerate weights can do this).
    let lu = a.clone().lu();
    let solution = lu.solve(b).ok_or_else(|| {
        StatsError::LinearAlgebra(
            "failed to solve the weighted least squares system; \
             the design matrix is singular (collinear predictors?)"
                .to_string(),
        )
    })?;
    let inverse = a.clone().try_inverse().ok_or_else(|| {
        StatsError::LinearAlgebra("X'WX is not invertible; standard errors undefined".to_string())
    })?;

    Ok((to_array1(&solution), to_array2(&inverse)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn roundtrip_matrix() {
        let a = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let back = to_array2(&to_dmatrix(&a));
        assert_eq!(a, back);
    }

    #[test]
    fn roundtrip_vector() {
        let v = array![1.0, 2.0, 3.0];
        let back = to_array1(&to_dvector(&v));
        assert_eq!(v, back);
    }

    #[test]
    fn solve_and_invert_simple_system() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[5.0, 4.0]);
        let (sol, inv) = solve_and_invert(&a, &b).unwrap();

        // A x = b
        assert!((4.0 * sol[0] + sol[1] - 5.0).abs() < 1e-10);
        assert!((sol[0] + 3.0 * sol[1] - 4.0).abs() < 1e-10);

        // A * A^-1 = I (check the first row)
        assert!((4.0 * inv[[0, 0]] + inv[[1, 0]] - 1.0).abs() < 1e-10);
        assert!((4.0 * inv[[0, 1]] + inv[[1, 1]]).abs() < 1e-10);
    }

    #[test]
    fn singular_system_is_an_error() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        let result = solve_and_invert(&a, &b);
        assert!(matches!(result, Err(StatsError::LinearAlgebra(_))));
    }
}
