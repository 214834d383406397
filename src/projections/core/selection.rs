//! Information-criterion lag-order selection.
//!
//! Purpose
//! -------
//! Choose the endogenous lag order of one projection equation at one horizon
//! by minimizing AIC, AICc or BIC over the candidate designs `p = 1..=P`.
//!
//! Key behaviors
//! -------------
//! - Each candidate is fitted by OLS on its own usable sample
//!   (`n = T − start(p) − shift`), so criteria are compared across slightly
//!   different sample lengths.
//! - Candidates whose fit is singular or non-finite, or whose sample is too
//!   short for the criterion, are skipped.
//! - Ties resolve to the smallest lag order.
//!
//! Conventions
//! -----------
//! - `AIC  = n·ln(RSS/n) + 2d`
//! - `AICc = AIC + 2d(d+1)/(n−d−1)`
//! - `BIC  = n·ln(RSS/n) + d·ln(n)`
//!
//! with `d` the number of regressors (deterministic terms included).
use crate::{
    inference::regression::ols,
    projections::{
        core::design::LagMatrix,
        errors::{LPError, LPResult},
    },
};
use std::str::FromStr;

/// Information criterion used to pick the lag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoCriterion {
    /// Bias-corrected Akaike criterion.
    Aicc,
    Aic,
    /// Schwarz/Bayesian criterion.
    Bic,
}

impl InfoCriterion {
    /// Criterion value for a fit with residual sum of squares `rss`, `n`
    /// observations and `d` regressors; `None` when undefined.
    pub fn value(&self, rss: f64, n: usize, d: usize) -> Option<f64> {
        if n < self.min_rows(d) || !rss.is_finite() || rss <= 0.0 {
            return None;
        }
        let nf = n as f64;
        let df = d as f64;
        let fit = nf * (rss / nf).ln();
        let value = match self {
            InfoCriterion::Aic => fit + 2.0 * df,
            InfoCriterion::Aicc => fit + 2.0 * df + 2.0 * df * (df + 1.0) / (nf - df - 1.0),
            InfoCriterion::Bic => fit + df * nf.ln(),
        };
        value.is_finite().then_some(value)
    }

    /// Smallest sample for which the criterion is defined with `d` regressors.
    pub fn min_rows(&self, d: usize) -> usize {
        match self {
            InfoCriterion::Aicc => d + 2,
            InfoCriterion::Aic | InfoCriterion::Bic => d + 1,
        }
    }
}

impl FromStr for InfoCriterion {
    type Err = LPError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "aicc" => Ok(InfoCriterion::Aicc),
            "aic" => Ok(InfoCriterion::Aic),
            "bic" => Ok(InfoCriterion::Bic),
            _ => Err(LPError::InvalidCriterion(name.to_string())),
        }
    }
}

/// LagSelector — criterion search over prebuilt candidate designs.
///
/// `candidates[i]` is the design for lag order `i + 1`. The designs are
/// borrowed read-only and may be shared across worker threads.
#[derive(Debug, Clone, Copy)]
pub struct LagSelector<'a> {
    criterion: InfoCriterion,
    candidates: &'a [LagMatrix],
}

impl<'a> LagSelector<'a> {
    pub fn new(criterion: InfoCriterion, candidates: &'a [LagMatrix]) -> LagSelector<'a> {
        LagSelector { criterion, candidates }
    }

    /// Select the lag order for response column `response` at horizon shift
    /// `shift`; returns the index into the candidate slice.
    ///
    /// # Errors
    /// - [`LPError::InsufficientData`] if no candidate yields a finite
    ///   criterion value.
    pub fn select(&self, response: usize, shift: usize) -> LPResult<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, design) in self.candidates.iter().enumerate() {
            let Ok(view) = design.at_horizon(shift) else {
                continue;
            };
            let Ok(fit) = ols(view.y.column(response), view.x) else {
                continue;
            };
            let Some(value) = self.criterion.value(fit.rss, fit.nobs, fit.nregressors) else {
                continue;
            };
            if best.map_or(true, |(_, current)| value < current) {
                best = Some((idx, value));
            }
        }
        best.map(|(idx, _)| idx).ok_or(LPError::InsufficientData {
            available: self.candidates.first().map_or(0, |d| d.rows_at(shift)),
            required: self.candidates.first().map_or(0, |d| self.criterion.min_rows(d.layout.ncols)),
            reason: "no candidate lag order yields a finite information criterion",
        })
    }
}
