//! Hodrick–Prescott filter.
//!
//! The trend `τ` minimizes `Σ (y_t − τ_t)² + λ Σ (Δ²τ_t)²`, i.e. solves the
//! symmetric positive-definite system `(I + λ DᵀD) τ = y` with `D` the
//! `(T−2)×T` second-difference operator. `I + λ DᵀD` is pentadiagonal; it is
//! assembled as a sparse column-major matrix and solved with a sparse
//! Cholesky factorization, so the filter stays linear in `T`.
//!
//! Series shorter than three observations have no second differences; their
//! trend is the series itself and the cycle is zero.
use crate::{
    inference::errors::InferenceError,
    projections::errors::{LPError, LPResult},
};
use faer::{
    linalg::solvers::Solve,
    sparse::{SparseColMat, Triplet},
    Mat, Side,
};
use ndarray::Array1;

/// Trend/cycle split of a series (`cycle = y − trend`).
#[derive(Debug, Clone, PartialEq)]
pub struct HpDecomposition {
    pub trend: Array1<f64>,
    pub cycle: Array1<f64>,
}

/// Run the HP filter with smoothing weight `lambda`.
///
/// # Errors
/// - [`LPError::InvalidRegimeParam`] if `lambda` is not finite and `> 0`.
/// - [`LPError::NonFiniteData`] if the series contains NaN/±inf.
/// - [`LPError::Inference`] if the system cannot be assembled or factorized.
pub fn hp_filter(series: &Array1<f64>, lambda: f64) -> LPResult<HpDecomposition> {
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(LPError::InvalidRegimeParam { param: "lambda", value: lambda });
    }
    if let Some((row, &value)) = series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(LPError::NonFiniteData { block: "switching", row, col: 0, value });
    }

    let n = series.len();
    if n < 3 {
        return Ok(HpDecomposition { trend: series.clone(), cycle: Array1::zeros(n) });
    }

    let system = penalized_system(n, lambda)?;
    let singular = || LPError::Inference(InferenceError::SingularMatrix { dim: n });
    let factor = system.as_ref().sp_cholesky(Side::Upper).map_err(|_| singular())?;
    let rhs = Mat::from_fn(n, 1, |i, _| series[i]);
    let solved = factor.solve(rhs.as_ref());

    let trend = Array1::from_shape_fn(n, |i| solved[(i, 0)]);
    if trend.iter().any(|v| !v.is_finite()) {
        return Err(singular());
    }
    let cycle = series - &trend;
    Ok(HpDecomposition { trend, cycle })
}

/// `I + λ DᵀD` for a series of length `n ≥ 3`, both triangles stored.
fn penalized_system(n: usize, lambda: f64) -> LPResult<SparseColMat<usize, f64>> {
    // Main, first and second off-diagonal bands.
    let mut a0 = vec![1.0; n];
    let mut a1 = vec![0.0; n - 1];
    let mut a2 = vec![0.0; n - 2];
    for i in 0..n - 2 {
        a0[i] += lambda;
        a0[i + 1] += 4.0 * lambda;
        a0[i + 2] += lambda;
        a1[i] -= 2.0 * lambda;
        a1[i + 1] -= 2.0 * lambda;
        a2[i] += lambda;
    }

    let mut triplets = Vec::with_capacity(5 * n);
    for (i, &value) in a0.iter().enumerate() {
        triplets.push(Triplet::new(i, i, value));
    }
    for (offset, band) in [(1, &a1), (2, &a2)] {
        for (i, &value) in band.iter().enumerate() {
            triplets.push(Triplet::new(i, i + offset, value));
            triplets.push(Triplet::new(i + offset, i, value));
        }
    }
    SparseColMat::try_new_from_triplets(n, n, &triplets)
        .map_err(|_| LPError::Inference(InferenceError::SingularMatrix { dim: n }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::linalg::invert_spd;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    #[test]
    // Purpose
    // -------
    // A linear series has zero second differences, so it is its own trend.
    fn linear_series_has_zero_cycle() {
        let series = Array1::from_shape_fn(25, |t| 2.0 + 0.3 * t as f64);
        let hp = hp_filter(&series, 1600.0).unwrap();
        for t in 0..25 {
            assert_relative_eq!(hp.cycle[t], 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // The sparse solve matches a dense solve of (I + λ DᵀD) τ = y.
    fn sparse_solve_matches_dense_solution() {
        let n = 12;
        let lambda = 50.0;
        let series = Array1::from_shape_fn(n, |t| (t as f64 * 0.7).sin() + 0.1 * t as f64);
        let mut system = Array2::<f64>::eye(n);
        for i in 0..n - 2 {
            let coeffs = [1.0, -2.0, 1.0];
            for a in 0..3 {
                for b in 0..3 {
                    system[[i + a, i + b]] += lambda * coeffs[a] * coeffs[b];
                }
            }
        }
        let dense = invert_spd(&system).unwrap().dot(&series);

        let hp = hp_filter(&series, lambda).unwrap();
        for t in 0..n {
            assert_relative_eq!(hp.trend[t], dense[t], epsilon = 1e-9);
            assert_relative_eq!(hp.trend[t] + hp.cycle[t], series[t], epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Very small λ leaves the series almost untouched.
    fn small_lambda_tracks_series() {
        let series = Array1::from_shape_fn(20, |t| ((t * 7) % 5) as f64);
        let hp = hp_filter(&series, 1e-8).unwrap();
        for t in 0..20 {
            assert_relative_eq!(hp.trend[t], series[t], epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // λ must be positive; short series pass through; the shortest filtered
    // series (three points) is solved.
    fn edge_cases() {
        let series = Array1::from(vec![1.0, 2.0]);
        assert!(hp_filter(&series, 0.0).is_err());
        let hp = hp_filter(&series, 10.0).unwrap();
        assert_eq!(hp.trend, series);

        let three = Array1::from(vec![0.0, 3.0, 0.0]);
        let hp = hp_filter(&three, 1.0).unwrap();
        // (I + DᵀD) τ = y with D = [1, −2, 1]: τ = (6/7, 9/7, 6/7).
        assert_relative_eq!(hp.trend[0], 6.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(hp.trend[1], 9.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(hp.cycle[2], -6.0 / 7.0, epsilon = 1e-12);
    }
}
