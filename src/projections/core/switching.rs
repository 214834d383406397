//! Smooth-transition regime weights.
//!
//! Purpose
//! -------
//! Map a switching series `z` to weights `f(z*) ∈ (0, 1)` with the logistic
//! transition `f(z) = exp(−γz) / (1 + exp(−γz))`. Regime 2 receives `f`,
//! regime 1 receives `1 − f`; design construction applies the weight of
//! `t − 1` to regressors dated `t`.
//!
//! Key behaviors
//! -------------
//! - [`HpSwitch::Raw`] uses `z` as given; [`HpSwitch::Filtered`] uses the
//!   HP-filter cycle of `z`, standardized to zero mean and unit (sample)
//!   standard deviation.
//! - The transition is evaluated without overflow for any finite `γz` and
//!   clamped to `[WEIGHT_FLOOR, 1 − WEIGHT_FLOOR]`, so both regimes keep a
//!   strictly positive weight.
//!
//! Invariants & assumptions
//! ------------------------
//! - `γ > 0` and finite (checked by [`RegimeOptions::new`]).
//! - The switching series is finite; filtering needs at least two
//!   observations and a non-constant cycle.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the γ → 0⁺ limit (weights → ½), extreme `γz` without
//!   overflow, monotonicity, standardization of the filtered input, and the
//!   lag convention.
use crate::projections::{
    core::{
        hp_filter::hp_filter,
        options::{HpSwitch, RegimeOptions},
    },
    errors::{LPError, LPResult},
};
use ndarray::Array1;

/// Smallest weight either regime may receive.
pub const WEIGHT_FLOOR: f64 = 1e-12;

/// Logistic transition `exp(−γz) / (1 + exp(−γz))`, clamped away from 0 and 1.
pub fn transition(z: f64, gamma: f64) -> f64 {
    let a = gamma * z;
    let f = if a > 0.0 {
        let e = (-a).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + a.exp())
    };
    f.clamp(WEIGHT_FLOOR, 1.0 - WEIGHT_FLOOR)
}

/// RegimeWeights — transition weights `f(z*_t)` for every calendar index.
///
/// Fields
/// ------
/// - `values`: `Array1<f64>`
///   `f(z*_t)`; weight of regime 2 at time `t`.
/// - `input`: `Array1<f64>`
///   The transition input `z*` (raw or standardized HP cycle).
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeWeights {
    pub values: Array1<f64>,
    pub input: Array1<f64>,
}

impl RegimeWeights {
    /// Compute the weights of `switching` under `opts`.
    ///
    /// # Errors
    /// - [`LPError::EmptyData`] for an empty switching series.
    /// - [`LPError::NonFiniteData`] for NaN/±inf values.
    /// - [`LPError::InsufficientData`] when filtering fewer than two values.
    /// - [`LPError::InvalidConfig`] when the filtered cycle is constant.
    pub fn new(switching: &Array1<f64>, opts: &RegimeOptions) -> LPResult<RegimeWeights> {
        if switching.is_empty() {
            return Err(LPError::EmptyData);
        }
        if let Some((row, &value)) = switching.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(LPError::NonFiniteData { block: "switching", row, col: 0, value });
        }

        let input = match opts.hp {
            HpSwitch::Raw => switching.clone(),
            HpSwitch::Filtered { lambda } => standardize(&hp_filter(switching, lambda)?.cycle)?,
        };
        let values = input.mapv(|z| transition(z, opts.gamma));
        Ok(RegimeWeights { values, input })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Weight of regime 2 applied to regressors dated `t`, i.e. `f(z*_{t−1})`.
    ///
    /// `t` must be at least 1.
    pub fn lagged(&self, t: usize) -> f64 {
        self.values[t - 1]
    }
}

/// Zero mean, unit sample standard deviation.
fn standardize(series: &Array1<f64>) -> LPResult<Array1<f64>> {
    let n = series.len();
    if n < 2 {
        return Err(LPError::InsufficientData {
            available: n,
            required: 2,
            reason: "standardizing the switching cycle needs two observations",
        });
    }
    let mean = series.sum() / n as f64;
    let var = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = var.sqrt();
    if sd <= f64::EPSILON {
        return Err(LPError::InvalidConfig {
            param: "switching",
            reason: "the filtered switching series has zero variance",
        });
    }
    Ok(series.mapv(|v| (v - mean) / sd))
}
