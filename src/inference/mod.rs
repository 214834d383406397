//! inference — least squares, HAC covariance and the linear algebra behind
//! them.
//!
//! Purpose
//! -------
//! Provide the single-equation estimation engine used by every local
//! projection: OLS or two-stage least squares coefficients with a
//! Newey–West (HAC) sandwich covariance whose truncation lag follows the
//! forecast horizon.
//!
//! Key behaviors
//! -------------
//! - Define a unified error and result type, [`InferenceError`] and
//!   [`InferenceResult`], for rank, shape and identification failures.
//! - Configure HAC behavior via [`HACOptions`] (kernel, truncation-lag policy,
//!   small-sample scaling) and enumerate tapers with [`KernelType`].
//! - Build average-score HAC matrices via [`calculate_avg_scores_cov`] and
//!   coefficient covariances via [`sandwich_covariance`].
//! - Fit equations with [`HacEstimator`] (strategy [`Estimator`]) or plain
//!   [`ols`] for information criteria.
//!
//! Invariants & assumptions
//! ------------------------
//! - Regressor matrices are `n×d` with rows indexing time; responses have
//!   length `n`; `n > d` is enforced before factorizing.
//! - Gram matrices are inverted through a Cholesky factor with a relative
//!   pivot guard applied after diagonal equilibration; singular designs are
//!   reported, never regularized.
//! - All routines return [`InferenceError`] on failure rather than panicking.
//!
//! Conventions
//! -----------
//! - The taper argument is `k/(L+1)`; Bartlett weights are `1 − k/(L+1)`.
//! - With `L = 0`, the sandwich is White's HC0 estimator.
//! - Functions are pure: no logging, no global state, no `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - `projections` builds aligned `(y, X[, Z])` views per horizon and calls
//!   [`HacEstimator::fit`]; lag selection calls [`ols`] for residual sums of
//!   squares; shock identification calls [`linalg::cholesky_lower`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover kernels, the HAC accumulator, the White identity,
//!   scale equivariance, 2SLS against OLS, endogeneity correction, and the
//!   singular / under-identified error paths.

pub mod errors;
pub mod hac;
pub mod kernel;
pub mod linalg;
pub mod regression;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hac::{calculate_avg_scores_cov, sandwich_covariance, HACOptions, HacBandwidth};
pub use self::kernel::KernelType;
pub use self::regression::{ols, Estimator, HacEstimator, HacFit, Instruments, OlsFit};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hac::{HACOptions, HacBandwidth};
    pub use super::kernel::KernelType;
    pub use super::regression::{Estimator, HacEstimator, HacFit};
}
