//! Errors for local-projection estimation (data validation, configuration
//! checks, design construction, per-horizon estimation failures, and the
//! per-shock failure records of the parallel scheduler).
//!
//! This module defines [`LPError`], its result alias [`LPResult`], and
//! [`ShockFailure`], the record attached to a result when one shock task
//! fails while its siblings complete.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy): shock, response and regime
//!   indices count from 0; horizons count periods after impact.
//! - Errors raised before tasks are scattered (data, options, design
//!   matrices, regime weights, shock matrix) abort the whole call.
//! - Errors raised inside a shock task are wrapped in a [`ShockFailure`] and
//!   never abort sibling tasks.
use crate::inference::errors::InferenceError;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

/// Crate-wide result alias for local-projection operations.
pub type LPResult<T> = Result<T, LPError>;

/// Unified error type for local-projection estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum LPError {
    // ---- Configuration ----
    /// An option value is outside its admissible range.
    InvalidConfig { param: &'static str, reason: &'static str },

    /// Unknown lag-selection criterion name.
    InvalidCriterion(String),

    /// Smooth-transition parameter (γ or λ) is non-finite or non-positive.
    InvalidRegimeParam { param: &'static str, value: f64 },

    // ---- Input/data validation ----
    /// Endogenous block has no rows or no columns.
    EmptyData,

    /// A data point is NaN/±inf.
    NonFiniteData { block: &'static str, row: usize, col: usize, value: f64 },

    /// A data block is not row-aligned with the endogenous block.
    LengthMismatch { block: &'static str, expected: usize, actual: usize },

    // ---- Design / sample ----
    /// Sample too short for the requested lag/horizon combination.
    InsufficientData { available: usize, required: usize, reason: &'static str },

    // ---- Estimation ----
    /// Non-invertible design for one horizon/response/regime.
    SingularDesign { horizon: usize, response: usize, regime: Option<usize> },

    /// Reduced-form residual covariance has no Cholesky factor.
    NotPositiveDefinite { dim: usize },

    /// Any other failure of the inference layer.
    Inference(InferenceError),

    // ---- Runtime ----
    /// The worker pool could not be created.
    ThreadPool(String),
}

impl LPError {
    /// Attach horizon/response/regime context to a failed fit.
    ///
    /// Singular Gram matrices become [`LPError::SingularDesign`]; every other
    /// inference failure is wrapped unchanged.
    pub fn from_fit(
        err: InferenceError, horizon: usize, response: usize, regime: Option<usize>,
    ) -> LPError {
        match err {
            InferenceError::SingularMatrix { .. } => {
                LPError::SingularDesign { horizon, response, regime }
            }
            other => LPError::Inference(other),
        }
    }
}

impl std::error::Error for LPError {}

impl std::fmt::Display for LPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            LPError::InvalidConfig { param, reason } => {
                write!(f, "Invalid option `{param}`: {reason}")
            }
            LPError::InvalidCriterion(name) => {
                write!(f, "Invalid lag criterion {name:?} (expected 'AICc', 'AIC', or 'BIC').")
            }
            LPError::InvalidRegimeParam { param, value } => {
                write!(f, "Regime parameter {param} must be finite and > 0; got: {value}")
            }
            // ---- Input/data validation ----
            LPError::EmptyData => write!(f, "Endogenous data must have at least one row and column."),
            LPError::NonFiniteData { block, row, col, value } => {
                write!(f, "{block} data at row {row}, column {col} is non-finite: {value}")
            }
            LPError::LengthMismatch { block, expected, actual } => {
                write!(f, "{block} data has {actual} rows; expected {expected} to match endogenous data")
            }
            // ---- Design / sample ----
            LPError::InsufficientData { available, required, reason } => {
                write!(f, "Insufficient data: {available} observations available, {required} required; {reason}")
            }
            // ---- Estimation ----
            LPError::SingularDesign { horizon, response, regime } => match regime {
                Some(r) => write!(
                    f,
                    "Singular design at horizon {horizon}, response {response}, regime {}",
                    r + 1
                ),
                None => write!(f, "Singular design at horizon {horizon}, response {response}"),
            },
            LPError::NotPositiveDefinite { dim } => {
                write!(f, "Residual covariance ({dim}x{dim}) is not positive definite")
            }
            LPError::Inference(err) => write!(f, "{err}"),
            // ---- Runtime ----
            LPError::ThreadPool(msg) => write!(f, "Worker pool could not be created: {msg}"),
        }
    }
}

impl From<InferenceError> for LPError {
    fn from(err: InferenceError) -> Self {
        LPError::Inference(err)
    }
}

/// ShockFailure — one shock task that did not complete.
///
/// The result arrays keep NaN in every cell of `shock`; `error` is the first
/// error the task met.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockFailure {
    pub shock: usize,
    pub error: LPError,
}

impl std::fmt::Display for ShockFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shock {} failed: {}", self.shock, self.error)
    }
}

#[cfg(feature = "python-bindings")]
impl From<LPError> for PyErr {
    fn from(err: LPError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Singular fits gain horizon/response context; other errors pass through.
    fn from_fit_maps_singular_to_design_error() {
        let singular = LPError::from_fit(InferenceError::SingularMatrix { dim: 3 }, 4, 1, Some(0));
        assert_eq!(singular, LPError::SingularDesign { horizon: 4, response: 1, regime: Some(0) });

        let other = LPError::from_fit(InferenceError::MissingInstruments, 0, 0, None);
        assert_eq!(other, LPError::Inference(InferenceError::MissingInstruments));
    }

    #[test]
    // Purpose
    // -------
    // Display messages embed their payloads.
    fn display_embeds_payload() {
        let msg = LPError::InsufficientData { available: 5, required: 6, reason: "lags" }.to_string();
        assert!(msg.contains('5') && msg.contains('6'));

        let regime = LPError::SingularDesign { horizon: 2, response: 0, regime: Some(1) }.to_string();
        assert!(regime.contains("regime 2"));

        let failure = ShockFailure { shock: 3, error: LPError::EmptyData }.to_string();
        assert!(failure.starts_with("shock 3 failed"));
    }
}
