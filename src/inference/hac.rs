//! inference::hac — HAC score covariance and sandwich covariance for
//! local-projection regressions.
//!
//! Purpose
//! -------
//! Build HAC (Heteroskedasticity & Autocorrelation Consistent) covariance
//! matrices of *average* per-observation scores `u_t = w_t e_t` and turn them
//! into coefficient covariance matrices via the sandwich formula. The score
//! estimator has the form
//!
//! ```text
//! S  =  Γ₀  +  ∑_{k=1}^{L} w_k ( Γ_k + Γ_kᵀ ),
//! Γ₀ = (1/n) UᵀU,
//! Γ_k = c_k · U_{k:}ᵀ U_{:n−k},
//! ```
//!
//! where `U` is the `n×p` score matrix (rows=time, cols=regressors), `w_k` are
//! kernel weights, and `L` is the truncation lag. The scaling `c_k` is
//!
//! - Newey–West (small-sample) **on**:  `c_k = 1/(n − k)`,
//! - Newey–West **off**:                `c_k = 1/n` (default).
//!
//! The coefficient covariance is `Σ = n · (WᵀW)⁻¹ S (WᵀW)⁻¹`, which with
//! `c_k = 1/n` equals the classical Newey–West estimator
//! `(WᵀW)⁻¹ [∑ u_t u_tᵀ + ∑ w_k (∑ u_t u_{t−k}ᵀ + ·ᵀ)] (WᵀW)⁻¹`.
//!
//! Key behaviors
//! -------------
//! - Aggregate per-observation scores into a symmetric `p×p` covariance
//!   matrix on the *average-score* scale via [`calculate_avg_scores_cov`].
//! - Resolve the truncation lag from the forecast horizon
//!   ([`HacBandwidth::Horizon`]) or a fixed value ([`HacBandwidth::Fixed`]).
//! - Wrap the score covariance in the sandwich with [`sandwich_covariance`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Input scores must be an `n×p` matrix with `n ≥ 1`.
//! - The truncation lag is always clamped to `L ≤ n−1`.
//! - With `L = 0` the sandwich reduces to White's HC0 estimator.
//!
//! Conventions
//! -----------
//! - Rows index time; columns index regressors.
//! - The taper argument is `x = k/(L+1)`, so Bartlett weights are
//!   `1 − k/(L+1)`.
//! - For a regression at horizon shift `s` the default truncation lag is
//!   `L = s`: an `s`-step-ahead projection error is an MA(s) at most.
//!
//! Testing notes
//! -------------
//! - Unit tests cover defaults, the IID/L=0 reduction, symmetry, the
//!   small-sample inflation, a hand-computed Bartlett example, and the
//!   White-estimator identity of the sandwich at `L = 0`.
use crate::inference::kernel::KernelType;
use ndarray::{s, Array2, ArrayView2};
use std::cmp::min;

/// How the HAC truncation lag is chosen for one regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HacBandwidth {
    /// `L` equals the horizon shift of the projection.
    Horizon,
    /// `L` is fixed regardless of horizon.
    Fixed(usize),
}

/// HACOptions — configuration for HAC score covariance estimation.
///
/// Purpose
/// -------
/// Represent the kernel, truncation-lag policy and small-sample policy used
/// for every local-projection regression of one estimation call.
///
/// Fields
/// ------
/// - `kernel`: [`KernelType`]
///   Kernel family for the HAC estimator.
/// - `bandwidth`: [`HacBandwidth`]
///   Horizon-driven or fixed truncation lag; clamped to `n−1` at compute time.
/// - `small_sample_correction`: `bool`
///   Whether to apply Newey–West finite-sample scaling `c_k = 1/(n−k)`.
///
/// Notes
/// -----
/// - `Default` is the classical local-projection setting: Bartlett kernel,
///   horizon-driven lag, no small-sample scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HACOptions {
    /// Kernel type for the HAC estimator.
    pub kernel: KernelType,
    /// Truncation lag policy.
    pub bandwidth: HacBandwidth,
    /// Apply finite-sample scaling to the autocovariance terms.
    pub small_sample_correction: bool,
}

impl HACOptions {
    /// Construct a `HACOptions` value from explicit settings.
    ///
    /// This constructor does not validate; every combination is admissible.
    pub fn new(
        kernel: KernelType, bandwidth: HacBandwidth, small_sample_correction: bool,
    ) -> HACOptions {
        HACOptions { kernel, bandwidth, small_sample_correction }
    }

    /// Effective truncation lag for a regression at horizon shift `shift`
    /// with `n` usable observations.
    ///
    /// Returns `min(L, n−1)` where `L` is `shift` under
    /// [`HacBandwidth::Horizon`] and the fixed value otherwise. Returns 0 for
    /// `n ≤ 1`.
    pub fn truncation_lag(&self, shift: usize, n: usize) -> usize {
        let requested = match self.bandwidth {
            HacBandwidth::Horizon => shift,
            HacBandwidth::Fixed(lag) => lag,
        };
        min(requested, n.saturating_sub(1))
    }
}

impl Default for HACOptions {
    fn default() -> Self {
        Self {
            kernel: KernelType::Bartlett,
            bandwidth: HacBandwidth::Horizon,
            small_sample_correction: false,
        }
    }
}

/// Build a `p×p` HAC covariance matrix of average per-observation scores.
///
/// Parameters
/// ----------
/// - `hac_opts`: `&HACOptions`
///   Kernel and small-sample scaling.
/// - `scores`: `ArrayView2<f64>`
///   `n×p` matrix of per-observation scores (rows=time, columns=regressors).
///   Must satisfy `n ≥ 1`.
/// - `bandwidth`: `usize`
///   Truncation lag `L`; truncated again to `n−1` here.
///
/// Returns
/// -------
/// `Array2<f64>`
///   A symmetric `p×p` covariance matrix on the *average-score* scale.
///
/// Notes
/// -----
/// - With `L = 0` this is the outer-product-of-gradients `(1/n) UᵀU`.
pub fn calculate_avg_scores_cov(
    hac_opts: &HACOptions, scores: ArrayView2<'_, f64>, bandwidth: usize,
) -> Array2<f64> {
    let n = scores.nrows();
    let p = scores.ncols();
    let bandwidth = min(bandwidth, n.saturating_sub(1));

    let mut avg_scores = Array2::<f64>::zeros((p, p));
    if n == 0 {
        return avg_scores;
    }
    for lag in 0..=bandwidth {
        add_hac_component(&mut avg_scores, scores, lag, bandwidth, hac_opts);
    }
    avg_scores
}

/// Sandwich covariance `n · A S A` for a bread `A = (WᵀW)⁻¹` and an
/// average-scale score covariance `S` from [`calculate_avg_scores_cov`].
///
/// The result is symmetrized to remove rounding asymmetry.
pub fn sandwich_covariance(
    bread: &Array2<f64>, avg_scores_cov: &Array2<f64>, nobs: usize,
) -> Array2<f64> {
    let meat = avg_scores_cov * (nobs as f64);
    let cov = bread.dot(&meat).dot(bread);
    (&cov + &cov.t()) * 0.5
}

// ---- Helper methods ----

/// Add a single lag component to the HAC score covariance accumulator.
///
/// For `lag = 0`, adds `(1/n) UᵀU`. For `lag > 0`, adds
/// `w_k (Γ_k + Γ_kᵀ)` with `Γ_k = c_k · U_{k:}ᵀ U_{:n−k}` and
/// `w_k = kernel.weight(k/(L+1))`. Assumes `lag ≤ bandwidth ≤ n−1`.
fn add_hac_component(
    avg_scores: &mut Array2<f64>, scores: ArrayView2<'_, f64>, lag: usize, bandwidth: usize,
    hac_opts: &HACOptions,
) {
    let n = scores.nrows();
    let weight = hac_opts.kernel.weight(lag as f64 / (bandwidth + 1) as f64);
    match lag {
        0 => {
            let scores_t = scores.t();
            avg_scores.scaled_add(1.0 / (n as f64), &scores_t.dot(&scores));
        }
        _ => {
            let small_samp_correction = if hac_opts.small_sample_correction {
                1.0 / ((n - lag) as f64)
            } else {
                1.0 / (n as f64)
            };
            let scores_lagged = scores.slice(s![lag.., ..]);
            let scores_leading = scores.slice(s![..n - lag, ..]);
            let scores_lagged_t = scores_lagged.t();
            let corrected_gamma_k = small_samp_correction * scores_lagged_t.dot(&scores_leading);
            avg_scores.scaled_add(weight, &corrected_gamma_k);
            avg_scores.scaled_add(weight, &corrected_gamma_k.t());
        }
    }
}
