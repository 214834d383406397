//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the central error type used by the
//! least-squares fits, the HAC covariance builders, and the small dense
//! linear-algebra helpers that bridge `ndarray` and `nalgebra`. An alias
//! `InferenceResult<T>` standardizes the return type across inference code.

/// Unified error type for inference routines.
///
/// Covers rank and conditioning failures of design matrices, shape mismatches
/// between response, regressors and instruments, and degenerate estimates.
/// Provides readable diagnostics through `Display`; higher layers wrap it into
/// their own domain errors via `From`.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Linear algebra ----
    /// A Gram matrix is not positive definite (collinear or empty columns).
    SingularMatrix {
        dim: usize,
    },

    /// Operand shapes do not line up.
    DimensionMismatch {
        expected: usize,
        actual: usize,
        what: &'static str,
    },

    // ---- Sample / estimate ----
    /// Fewer observations than regressors.
    InsufficientObservations {
        nobs: usize,
        nregressors: usize,
    },

    /// A coefficient or covariance entry is NaN/±inf.
    NonFiniteEstimate,

    // ---- Instrumental variables ----
    /// 2SLS requested without an instrument matrix.
    MissingInstruments,

    /// Fewer instrument columns than regressors.
    UnderIdentified {
        instruments: usize,
        regressors: usize,
    },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Linear algebra ----
            InferenceError::SingularMatrix { dim } => {
                write!(f, "Inference Error: {dim}x{dim} Gram matrix is singular or ill-conditioned")
            }
            InferenceError::DimensionMismatch { expected, actual, what } => {
                write!(f, "Inference Error: {what} has length {actual}, expected {expected}")
            }

            // ---- Sample / estimate ----
            InferenceError::InsufficientObservations { nobs, nregressors } => write!(
                f,
                "Inference Error: {nobs} observations cannot identify {nregressors} regressors"
            ),
            InferenceError::NonFiniteEstimate => {
                write!(f, "Inference Error: estimate contains non-finite values")
            }

            // ---- Instrumental variables ----
            InferenceError::MissingInstruments => {
                write!(f, "Inference Error: two-stage least squares requires instruments")
            }
            InferenceError::UnderIdentified { instruments, regressors } => write!(
                f,
                "Inference Error: {instruments} instrument columns cannot identify {regressors} regressors"
            ),
        }
    }
}
