//! inference::linalg — small dense linear-algebra bridge to `nalgebra`.
//!
//! Purpose
//! -------
//! Regression code works on `ndarray` arrays; factorizations come from
//! `nalgebra`. This module copies symmetric matrices across, inverts Gram
//! matrices through a Cholesky factor with an explicit conditioning guard, and
//! returns lower Cholesky factors for shock identification.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are square and symmetric up to rounding; only their values are
//!   copied, never reinterpreted.
//! - Matrices are equilibrated by their diagonal, `G̃ = S G S` with
//!   `S = diag(G_ii)^{-1/2}`, before factorizing. A Gram matrix is declared
//!   singular when a diagonal entry is not strictly positive, when the
//!   Cholesky factorization of `G̃` fails, or when a squared pivot of `G̃`
//!   falls below `PIVOT_TOL`. The squared pivot `i` of `G̃` is `1 − R²` of
//!   column `i` on the columns before it, so the guard does not depend on
//!   the scale of any regressor.
use crate::inference::errors::{InferenceError, InferenceResult};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

/// Pivot tolerance for declaring an equilibrated Gram matrix singular.
pub const PIVOT_TOL: f64 = 1e-12;

/// Copy a square `ndarray` matrix into a `nalgebra::DMatrix`.
pub fn to_dmatrix(mat: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = mat.dim();
    DMatrix::from_fn(rows, cols, |i, j| mat[[i, j]])
}

/// Copy a `nalgebra::DMatrix` back into an `ndarray::Array2`.
pub fn from_dmatrix(mat: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}

/// Lower Cholesky factor `L` of a symmetric positive-definite matrix
/// (`A = L Lᵀ`).
///
/// # Errors
/// - [`InferenceError::SingularMatrix`] if `A` is not numerically positive
///   definite (see module docs for the pivot guard).
pub fn cholesky_lower(mat: &Array2<f64>) -> InferenceResult<Array2<f64>> {
    let dim = mat.nrows();
    if dim != mat.ncols() {
        return Err(InferenceError::DimensionMismatch {
            expected: dim,
            actual: mat.ncols(),
            what: "columns of a square matrix",
        });
    }
    let (scaled, scale) = equilibrate(mat)?;
    let chol = to_dmatrix(&scaled).cholesky().ok_or(InferenceError::SingularMatrix { dim })?;
    let lower = chol.l();
    check_pivots(&lower)?;
    // A = S⁻¹ G̃ S⁻¹ = (S⁻¹ L̃)(S⁻¹ L̃)ᵀ
    let lower = from_dmatrix(&lower);
    Ok(Array2::from_shape_fn((dim, dim), |(i, j)| lower[[i, j]] / scale[i]))
}

/// Inverse of a symmetric positive-definite Gram matrix `WᵀW`.
///
/// # Errors
/// - [`InferenceError::SingularMatrix`] on factorization failure, on a pivot
///   below the tolerance, or on a non-finite inverse.
pub fn invert_spd(gram: &Array2<f64>) -> InferenceResult<Array2<f64>> {
    let dim = gram.nrows();
    if dim == 0 {
        return Err(InferenceError::SingularMatrix { dim });
    }
    let (scaled, scale) = equilibrate(gram)?;
    let chol = to_dmatrix(&scaled).cholesky().ok_or(InferenceError::SingularMatrix { dim })?;
    check_pivots(&chol.l())?;
    // G⁻¹ = S G̃⁻¹ S
    let inner = from_dmatrix(&chol.inverse());
    let inverse = Array2::from_shape_fn((dim, dim), |(i, j)| scale[i] * inner[[i, j]] * scale[j]);
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::SingularMatrix { dim });
    }
    Ok((&inverse + &inverse.t()) * 0.5)
}

/// Unit-diagonal rescaling `S G S` and the scale vector `S_ii = G_ii^{-1/2}`.
fn equilibrate(mat: &Array2<f64>) -> InferenceResult<(Array2<f64>, Array1<f64>)> {
    let dim = mat.nrows();
    let diag = mat.diag();
    if diag.iter().any(|&v| !v.is_finite() || v <= 0.0) {
        return Err(InferenceError::SingularMatrix { dim });
    }
    let scale = diag.mapv(|v| 1.0 / v.sqrt());
    let scaled = Array2::from_shape_fn((dim, dim), |(i, j)| scale[i] * mat[[i, j]] * scale[j]);
    Ok((scaled, scale))
}

fn check_pivots(lower: &DMatrix<f64>) -> InferenceResult<()> {
    let dim = lower.nrows();
    for i in 0..dim {
        let pivot = lower[(i, i)];
        if !pivot.is_finite() || pivot * pivot < PIVOT_TOL {
            return Err(InferenceError::SingularMatrix { dim });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The bridge copies values without modification in both directions.
    fn dmatrix_round_trip_preserves_values() {
        let mat = array![[4.0, 1.0, 0.5], [1.0, 3.0, -0.25], [0.5, -0.25, 2.0]];
        let back = from_dmatrix(&to_dmatrix(&mat));
        assert_eq!(back, mat);
    }

    #[test]
    // Purpose
    // -------
    // `invert_spd` returns a two-sided inverse of a well-conditioned matrix.
    fn invert_spd_produces_identity() {
        let mat = array![[4.0, 1.0], [1.0, 3.0]];
        let inv = invert_spd(&mat).unwrap();
        let id = mat.dot(&inv);
        assert_relative_eq!(id[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(id[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // An exactly collinear Gram matrix is rejected.
    //
    // Given
    // -----
    // - X with columns (1, 2·1): XᵀX = [[n, 2n], [2n, 4n]] (rank 1).
    //
    // Expect
    // ------
    // - `SingularMatrix { dim: 2 }`.
    fn invert_spd_rejects_collinear_gram() {
        let gram = array![[5.0, 10.0], [10.0, 20.0]];
        assert_eq!(invert_spd(&gram), Err(InferenceError::SingularMatrix { dim: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // `cholesky_lower` reproduces A = L Lᵀ with a lower-triangular L.
    fn cholesky_lower_reconstructs_matrix() {
        let mat = array![[2.0, 0.6, 0.2], [0.6, 1.5, 0.3], [0.2, 0.3, 1.0]];
        let lower = cholesky_lower(&mat).unwrap();
        assert_eq!(lower[[0, 1]], 0.0);
        assert_eq!(lower[[0, 2]], 0.0);
        assert_eq!(lower[[1, 2]], 0.0);
        let rebuilt = lower.dot(&lower.t());
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rebuilt[[i, j]], mat[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Indefinite matrices have no Cholesky factor.
    fn cholesky_lower_rejects_indefinite() {
        let mat = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(matches!(cholesky_lower(&mat), Err(InferenceError::SingularMatrix { .. })));
    }

    #[test]
    // Purpose
    // -------
    // The singularity guard ignores the scale of individual columns.
    //
    // Given
    // -----
    // - A well-conditioned Gram matrix with one column scaled by 1e-6, so
    //   its diagonal spans twelve orders of magnitude.
    //
    // Expect
    // ------
    // - The inverse exists and is a two-sided inverse; the Cholesky factor
    //   reconstructs the matrix.
    fn badly_scaled_gram_is_not_singular() {
        let c = 1e-6;
        let gram = array![[100.0, 30.0 * c], [30.0 * c, 40.0 * c * c]];
        let inv = invert_spd(&gram).unwrap();
        let id = gram.dot(&inv);
        assert_relative_eq!(id[[0, 0]], 1.0, epsilon = 1e-9);
        assert_relative_eq!(id[[1, 1]], 1.0, epsilon = 1e-9);
        assert_relative_eq!(id[[1, 0]], 0.0, epsilon = 1e-9);

        let lower = cholesky_lower(&gram).unwrap();
        let rebuilt = lower.dot(&lower.t());
        assert_relative_eq!(rebuilt[[1, 1]], gram[[1, 1]], max_relative = 1e-12);
        assert_relative_eq!(rebuilt[[0, 1]], gram[[0, 1]], max_relative = 1e-12);
    }
}
