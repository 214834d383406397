//! inference::regression — single-equation OLS / 2SLS with HAC covariance.
//!
//! Purpose
//! -------
//! Fit one local-projection equation `y = Xβ + e` and attach a Newey–West
//! covariance to `β`. The estimator strategy (OLS vs two-stage least squares)
//! is a tagged variant chosen once per estimation call; the truncation lag is
//! derived from the horizon shift passed with every fit.
//!
//! Key behaviors
//! -------------
//! - [`ols`] returns coefficients, residuals and the residual sum of squares;
//!   lag-order selection uses it directly.
//! - [`HacEstimator::fit`] runs OLS or 2SLS and wraps the scores in a HAC
//!   sandwich (see [`crate::inference::hac`]).
//!
//! Conventions
//! -----------
//! - 2SLS: each column listed in [`Instruments::endogenous`] is regressed on
//!   the full instrument matrix `Z` (which already contains every exogenous
//!   regressor); `X̂` is `X` with those columns replaced by the fitted values.
//!   Coefficients come from regressing `y` on `X̂`; residuals are the
//!   structural residuals `y − Xβ`; scores are `X̂_t e_t`.
//! - With `Z = X` 2SLS reproduces OLS exactly.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    hac::{calculate_avg_scores_cov, sandwich_covariance, HACOptions},
    linalg::invert_spd,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::str::FromStr;

/// Estimator strategy for one projection equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    /// Ordinary least squares.
    Ols,
    /// Two-stage least squares; requires [`Instruments`].
    TwoStageLeastSquares,
}

impl FromStr for Estimator {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "ols" => Ok(Estimator::Ols),
            "2sls" | "tsls" | "twosls" => Ok(Estimator::TwoStageLeastSquares),
            other => Err(format!("invalid estimator {other:?} (expected 'ols' or '2sls')")),
        }
    }
}

/// Instrument matrix and the regressor columns it instruments.
#[derive(Debug, Clone, Copy)]
pub struct Instruments<'a> {
    /// `n×m` instrument matrix, row-aligned with `X`.
    pub matrix: ArrayView2<'a, f64>,
    /// Column indices of `X` replaced by first-stage fitted values.
    pub endogenous: &'a [usize],
}

/// Plain least-squares fit used by lag-order selection.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub beta: Array1<f64>,
    pub residuals: Array1<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    pub nobs: usize,
    pub nregressors: usize,
}

/// Coefficients and HAC covariance of one projection equation.
#[derive(Debug, Clone, PartialEq)]
pub struct HacFit {
    pub beta: Array1<f64>,
    /// `d×d` HAC covariance of `beta`.
    pub covariance: Array2<f64>,
    pub residuals: Array1<f64>,
    pub nobs: usize,
    /// Truncation lag actually used (after clamping to `n−1`).
    pub truncation_lag: usize,
}

impl HacFit {
    /// HAC standard error of coefficient `index`.
    pub fn std_error(&self, index: usize) -> f64 {
        self.covariance[[index, index]].max(0.0).sqrt()
    }

    /// Coefficients and covariance block of the contiguous columns
    /// `start..start + len`.
    pub fn block(&self, start: usize, len: usize) -> (Array1<f64>, Array2<f64>) {
        let range = start..start + len;
        let beta = self.beta.slice(ndarray::s![range.clone()]).to_owned();
        let cov = self.covariance.slice(ndarray::s![range.clone(), range]).to_owned();
        (beta, cov)
    }
}

/// Ordinary least squares `β = (XᵀX)⁻¹Xᵀy`.
///
/// # Errors
/// - [`InferenceError::DimensionMismatch`] if `y.len() != x.nrows()`.
/// - [`InferenceError::InsufficientObservations`] if `n ≤ d`.
/// - [`InferenceError::SingularMatrix`] if `XᵀX` is not invertible.
pub fn ols(y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>) -> InferenceResult<OlsFit> {
    check_shapes(y, x)?;
    let bread = invert_spd(&x.t().dot(&x))?;
    let beta = bread.dot(&x.t().dot(&y));
    let residuals = &y - &x.dot(&beta);
    let rss = residuals.dot(&residuals);
    if !rss.is_finite() || beta.iter().any(|b| !b.is_finite()) {
        return Err(InferenceError::NonFiniteEstimate);
    }
    Ok(OlsFit { beta, residuals, rss, nobs: x.nrows(), nregressors: x.ncols() })
}

/// HacEstimator — OLS or 2SLS with Newey–West covariance.
///
/// Fields
/// ------
/// - `estimator`: [`Estimator`]
///   Strategy fixed for the whole estimation call.
/// - `hac`: [`HACOptions`]
///   Kernel, truncation-lag policy and small-sample scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HacEstimator {
    pub estimator: Estimator,
    pub hac: HACOptions,
}

impl HacEstimator {
    pub fn new(estimator: Estimator, hac: HACOptions) -> HacEstimator {
        HacEstimator { estimator, hac }
    }

    /// Fit `y` on `x` at horizon shift `shift`.
    ///
    /// Parameters
    /// ----------
    /// - `y`: `ArrayView1<f64>`
    ///   Lead-shifted response, length `n`.
    /// - `x`: `ArrayView2<f64>`
    ///   `n×d` regressors, row-aligned with `y`.
    /// - `instruments`: `Option<Instruments>`
    ///   Required for [`Estimator::TwoStageLeastSquares`], ignored for OLS.
    /// - `shift`: `usize`
    ///   Horizon shift of the projection; drives the truncation lag under
    ///   [`crate::inference::hac::HacBandwidth::Horizon`].
    ///
    /// Errors
    /// ------
    /// - `DimensionMismatch`, `InsufficientObservations`, `SingularMatrix`
    ///   (either stage), `MissingInstruments`, `UnderIdentified`,
    ///   `NonFiniteEstimate`.
    pub fn fit(
        &self, y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>, instruments: Option<Instruments<'_>>,
        shift: usize,
    ) -> InferenceResult<HacFit> {
        check_shapes(y, x)?;
        let regressors = match self.estimator {
            Estimator::Ols => x.to_owned(),
            Estimator::TwoStageLeastSquares => {
                let instruments = instruments.ok_or(InferenceError::MissingInstruments)?;
                first_stage(x, instruments)?
            }
        };

        let n = x.nrows();
        let bread = invert_spd(&regressors.t().dot(&regressors))?;
        let beta = bread.dot(&regressors.t().dot(&y));
        let residuals = &y - &x.dot(&beta);

        let scores = &regressors * &residuals.view().insert_axis(Axis(1));
        let truncation_lag = self.hac.truncation_lag(shift, n);
        let avg_scores_cov = calculate_avg_scores_cov(&self.hac, scores.view(), truncation_lag);
        let covariance = sandwich_covariance(&bread, &avg_scores_cov, n);

        if beta.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteEstimate);
        }
        Ok(HacFit { beta, covariance, residuals, nobs: n, truncation_lag })
    }
}

// ---- Helper methods ----

fn check_shapes(y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>) -> InferenceResult<()> {
    if y.len() != x.nrows() {
        return Err(InferenceError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
            what: "response",
        });
    }
    if x.nrows() <= x.ncols() {
        return Err(InferenceError::InsufficientObservations {
            nobs: x.nrows(),
            nregressors: x.ncols(),
        });
    }
    Ok(())
}

/// Replace the instrumented columns of `x` by their projections on `Z`.
fn first_stage(x: ArrayView2<'_, f64>, instruments: Instruments<'_>) -> InferenceResult<Array2<f64>> {
    let z = instruments.matrix;
    if z.nrows() != x.nrows() {
        return Err(InferenceError::DimensionMismatch {
            expected: x.nrows(),
            actual: z.nrows(),
            what: "instrument rows",
        });
    }
    if z.ncols() < x.ncols() {
        return Err(InferenceError::UnderIdentified {
            instruments: z.ncols(),
            regressors: x.ncols(),
        });
    }
    let z_bread = invert_spd(&z.t().dot(&z))?;
    let mut fitted = x.to_owned();
    for &col in instruments.endogenous {
        if col >= x.ncols() {
            return Err(InferenceError::DimensionMismatch {
                expected: x.ncols(),
                actual: col,
                what: "instrumented column index",
            });
        }
        let target = x.column(col);
        let gamma = z_bread.dot(&z.t().dot(&target));
        fitted.column_mut(col).assign(&z.dot(&gamma));
    }
    Ok(fitted)
}
