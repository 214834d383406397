//! Recursive (Cholesky) shock identification.
//!
//! Purpose
//! -------
//! Estimate the reduced-form residual covariance `Σ` of the horizon-0
//! projection and turn it into the impact matrix `D` whose column `j` is the
//! contemporaneous response of every variable to structural shock `j`.
//!
//! Key behaviors
//! -------------
//! - [`residual_covariance`] regresses every endogenous variable on the
//!   horizon-0 design and returns `EᵀE / (n − d)`.
//! - [`ShockMatrix::from_covariance`] takes the lower Cholesky factor `D`;
//!   under [`ShockType::Unit`] each column is divided by its diagonal entry so
//!   shock `j` moves variable `j` by exactly one unit on impact.
//!
//! Invariants & assumptions
//! ------------------------
//! - Variable ordering defines the recursive structure: variable `j` does not
//!   respond on impact to shocks ordered after it.
//! - `D` is lower triangular with a strictly positive diagonal.
use crate::{
    inference::linalg::{cholesky_lower, invert_spd},
    projections::{
        core::{design::LagMatrix, options::ShockType},
        errors::{LPError, LPResult},
    },
};
use ndarray::{Array2, ArrayView1};

/// Reduced-form residual covariance `EᵀE / (n − d)` of the shift-0 design.
///
/// # Errors
/// - [`LPError::InsufficientData`] if `n ≤ d`.
/// - [`LPError::SingularDesign`] if `XᵀX` is singular.
pub fn residual_covariance(design: &LagMatrix) -> LPResult<Array2<f64>> {
    let x = &design.x;
    let y = &design.y;
    let (n, d) = (x.nrows(), x.ncols());
    if n <= d {
        return Err(LPError::InsufficientData {
            available: n,
            required: d + 1,
            reason: "reduced-form covariance needs more rows than regressors",
        });
    }
    let bread = invert_spd(&x.t().dot(x)).map_err(|err| LPError::from_fit(err, 0, 0, None))?;
    let coefs = bread.dot(&x.t().dot(y));
    let resid = y - &x.dot(&coefs);
    let sigma = resid.t().dot(&resid) / (n - d) as f64;
    if sigma.iter().any(|v| !v.is_finite()) {
        return Err(LPError::NotPositiveDefinite { dim: sigma.nrows() });
    }
    Ok(sigma)
}

/// ShockMatrix — impact responses `D` of recursive structural shocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockMatrix {
    /// `K×K` lower-triangular impact matrix; column `j` is shock `j`.
    pub matrix: Array2<f64>,
}

impl ShockMatrix {
    /// Cholesky factor of `sigma`, normalized per `shock_type`.
    ///
    /// # Errors
    /// - [`LPError::InvalidConfig`] if `sigma` is not `nvars×nvars`.
    /// - [`LPError::NotPositiveDefinite`] if the factorization fails.
    pub fn from_covariance(
        sigma: &Array2<f64>, shock_type: ShockType, nvars: usize,
    ) -> LPResult<ShockMatrix> {
        if sigma.nrows() != nvars || sigma.ncols() != nvars {
            return Err(LPError::InvalidConfig {
                param: "residual_covariance",
                reason: "must be K×K with K the number of endogenous variables",
            });
        }
        let mut matrix =
            cholesky_lower(sigma).map_err(|_| LPError::NotPositiveDefinite { dim: nvars })?;
        if shock_type == ShockType::Unit {
            for j in 0..nvars {
                let diag = matrix[[j, j]];
                matrix.column_mut(j).mapv_inplace(|v| v / diag);
            }
        }
        Ok(ShockMatrix { matrix })
    }

    /// Impact vector `d_j` of shock `j`.
    pub fn impact(&self, shock: usize) -> ArrayView1<'_, f64> {
        self.matrix.column(shock)
    }

    pub fn nshocks(&self) -> usize {
        self.matrix.ncols()
    }
}
