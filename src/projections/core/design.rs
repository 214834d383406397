//! Design matrices for local projections.
//!
//! Purpose
//! -------
//! Turn validated data into row-aligned response and regressor matrices for
//! one endogenous lag order, and slice them per horizon. The same builder
//! serves linear, IV and two-regime models; the column layout is recorded in
//! a [`DesignLayout`] so estimation code never guesses column positions.
//!
//! Key behaviors
//! -------------
//! - [`LagMatrixBuilder::build`] produces a [`LagMatrix`] whose row `i` is
//!   calendar index `start + i`, with `start = max(p, q, s)` (`q` the
//!   exogenous lag order when an exogenous block exists, `s = 1` when regime
//!   weights are applied).
//! - Columns, in order: deterministic terms (constant, `t+1`, `(t+1)²`),
//!   shock columns (IV models), endogenous lags (lag-major, most recent
//!   first; one block per regime), exogenous lags (lag-major),
//!   contemporaneous columns.
//! - In two-regime designs the shock columns and endogenous lag blocks are
//!   multiplied by `1 − f(t−1)` (regime 1) and `f(t−1)` (regime 2).
//! - For two-stage least squares an instrument matrix `Z` is built with the
//!   shock columns replaced by the (identically weighted) instruments.
//! - [`LagMatrix::at_horizon`] returns `Y[shift..]`, `X[..n−shift]`,
//!   `Z[..n−shift]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input blocks are already validated by [`LPData`] / [`ExternalShock`].
//! - `T ≤ p + 1` (or `T ≤ start + 1`) is rejected with
//!   [`LPError::InsufficientData`]; so is a furthest horizon that leaves no
//!   more rows than regressors ([`LagMatrix::require_rows`]).
//! - `p = 0` omits the endogenous blocks entirely.
//!
//! Testing notes
//! -------------
//! - Unit tests check exact cell values for trends and lag ordering, the
//!   `p = 0` layout, exogenous/contemporaneous placement, regime weighting,
//!   the instrument matrix, horizon alignment, and the short-sample errors.
use crate::projections::{
    core::{
        data::{ExternalShock, LPData},
        options::Trend,
        switching::RegimeWeights,
    },
    errors::{LPError, LPResult},
};
use ndarray::{s, Array2, ArrayView2};
use std::ops::Range;

/// Column positions of every block of a design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignLayout {
    /// Number of deterministic columns (constant and trends).
    pub n_deterministic: usize,
    /// Shock columns, one per regime (IV models only).
    pub shock: Option<Range<usize>>,
    /// Endogenous lag block of each regime (`p·K` columns each).
    pub endog: Vec<Range<usize>>,
    pub exog: Range<usize>,
    pub contemp: Range<usize>,
    /// Number of endogenous variables `K`.
    pub nvars: usize,
    /// Endogenous lag order `p`.
    pub lags: usize,
    /// Total number of columns.
    pub ncols: usize,
}

impl DesignLayout {
    /// Columns holding the first lag of every endogenous variable in
    /// `regime` (`None` when `p = 0`).
    pub fn first_lag(&self, regime: usize) -> Option<Range<usize>> {
        if self.lags == 0 {
            return None;
        }
        self.endog.get(regime).map(|block| block.start..block.start + self.nvars)
    }

    /// Column of the shock regressor for `regime`.
    pub fn shock_column(&self, regime: usize) -> Option<usize> {
        self.shock.as_ref().and_then(|cols| {
            let col = cols.start + regime;
            (col < cols.end).then_some(col)
        })
    }

    /// All shock columns (instrumented under 2SLS).
    pub fn shock_columns(&self) -> Vec<usize> {
        self.shock.clone().map(|cols| cols.collect()).unwrap_or_default()
    }
}

/// LagMatrix — response, regressors and optional instruments for one lag order.
#[derive(Debug, Clone, PartialEq)]
pub struct LagMatrix {
    /// `n×K` responses; row `i` is calendar index `start + i`.
    pub y: Array2<f64>,
    /// `n×d` regressors, row-aligned with `y`.
    pub x: Array2<f64>,
    /// `n×m` instruments for two-stage least squares.
    pub z: Option<Array2<f64>>,
    /// Calendar index of the first row.
    pub start: usize,
    pub layout: DesignLayout,
}

/// Row-aligned slices of a [`LagMatrix`] for one horizon shift.
#[derive(Debug, Clone, Copy)]
pub struct HorizonView<'a> {
    pub y: ArrayView2<'a, f64>,
    pub x: ArrayView2<'a, f64>,
    pub z: Option<ArrayView2<'a, f64>>,
}

impl LagMatrix {
    /// Number of usable rows `n`.
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Responses led by `shift` with the matching regressor rows:
    /// `Y[shift..]`, `X[..n−shift]`.
    ///
    /// # Errors
    /// - [`LPError::InsufficientData`] if `shift ≥ n`.
    pub fn at_horizon(&self, shift: usize) -> LPResult<HorizonView<'_>> {
        let n = self.nrows();
        if shift >= n {
            return Err(LPError::InsufficientData {
                available: n,
                required: shift + 1,
                reason: "horizon shift exceeds the usable sample",
            });
        }
        Ok(HorizonView {
            y: self.y.slice(s![shift.., ..]),
            x: self.x.slice(s![..n - shift, ..]),
            z: self.z.as_ref().map(|z| z.slice(s![..n - shift, ..])),
        })
    }

    /// Usable rows at horizon shift `shift`.
    pub fn rows_at(&self, shift: usize) -> usize {
        self.nrows().saturating_sub(shift)
    }

    /// Ensure that shift `max_shift` still leaves more rows than regressors.
    pub fn require_rows(&self, max_shift: usize) -> LPResult<()> {
        let available = self.rows_at(max_shift);
        let needed = self.layout.ncols.max(self.z.as_ref().map_or(0, |z| z.ncols())) + 1;
        if available < needed {
            return Err(LPError::InsufficientData {
                available,
                required: needed,
                reason: "the furthest horizon leaves too few rows for the regressors",
            });
        }
        Ok(())
    }
}

/// LagMatrixBuilder — builds [`LagMatrix`] values for any lag order.
///
/// The builder borrows the data, shock and regime weights; each
/// [`LagMatrixBuilder::build`] call allocates fresh matrices.
#[derive(Debug, Clone, Copy)]
pub struct LagMatrixBuilder<'a> {
    data: &'a LPData,
    trend: Trend,
    exog_lags: usize,
    shock: Option<&'a ExternalShock>,
    two_stage: bool,
    weights: Option<&'a RegimeWeights>,
}

impl<'a> LagMatrixBuilder<'a> {
    pub fn new(data: &'a LPData, trend: Trend, exog_lags: usize) -> LagMatrixBuilder<'a> {
        LagMatrixBuilder { data, trend, exog_lags, shock: None, two_stage: false, weights: None }
    }

    /// Add the external shock as a contemporaneous regressor; with
    /// `two_stage` also build the instrument matrix.
    pub fn with_shock(mut self, shock: &'a ExternalShock, two_stage: bool) -> LagMatrixBuilder<'a> {
        self.shock = Some(shock);
        self.two_stage = two_stage;
        self
    }

    /// Split shock and endogenous lag columns into two weighted regimes.
    pub fn with_regimes(mut self, weights: &'a RegimeWeights) -> LagMatrixBuilder<'a> {
        self.weights = Some(weights);
        self
    }

    /// Build the design for endogenous lag order `lags`.
    ///
    /// # Errors
    /// - [`LPError::InsufficientData`] if `T ≤ lags + 1` or `T ≤ start + 1`.
    /// - [`LPError::InvalidConfig`] if two-stage least squares is requested
    ///   without instruments.
    /// - [`LPError::LengthMismatch`] if the regime weights are not aligned
    ///   with the data.
    pub fn build(&self, lags: usize) -> LPResult<LagMatrix> {
        let data = self.data;
        let nobs = data.nobs();
        let nvars = data.nvars();
        if nobs <= lags + 1 {
            return Err(LPError::InsufficientData {
                available: nobs,
                required: lags + 2,
                reason: "the lag order leaves fewer than two usable observations",
            });
        }
        if let Some(weights) = self.weights {
            if weights.len() != nobs {
                return Err(LPError::LengthMismatch {
                    block: "regime weights",
                    expected: nobs,
                    actual: weights.len(),
                });
            }
        }

        let exog_cols = data.exog.as_ref().map_or(0, |e| e.ncols());
        let exog_lags = if exog_cols > 0 { self.exog_lags } else { 0 };
        let contemp_cols = data.contemp.as_ref().map_or(0, |c| c.ncols());
        let regimes = if self.weights.is_some() { 2 } else { 1 };
        let offset = if self.weights.is_some() { 1 } else { 0 };
        let start = lags.max(exog_lags).max(offset);
        if nobs <= start + 1 {
            return Err(LPError::InsufficientData {
                available: nobs,
                required: start + 2,
                reason: "exogenous lags leave fewer than two usable observations",
            });
        }

        let instruments = match (self.shock, self.two_stage) {
            (Some(shock), true) => Some(shock.instruments.as_ref().ok_or(LPError::InvalidConfig {
                param: "instruments",
                reason: "two-stage least squares requires instruments",
            })?),
            _ => None,
        };

        // ---- Layout ----
        let n_det = self.trend.n_terms();
        let mut next = n_det;
        let shock = self.shock.map(|_| {
            let cols = next..next + regimes;
            next += regimes;
            cols
        });
        let endog: Vec<Range<usize>> = (0..regimes)
            .map(|_| {
                let cols = next..next + lags * nvars;
                next += lags * nvars;
                cols
            })
            .collect();
        let exog = next..next + exog_lags * exog_cols;
        next = exog.end;
        let contemp = next..next + contemp_cols;
        let ncols = contemp.end;
        let layout = DesignLayout {
            n_deterministic: n_det,
            shock,
            endog,
            exog,
            contemp,
            nvars,
            lags,
            ncols,
        };

        // ---- Fill ----
        let n = nobs - start;
        let mut x = Array2::<f64>::zeros((n, ncols));
        for i in 0..n {
            let t = start + i;
            let regime_factors = self.regime_factors(t);
            let mut row = x.row_mut(i);

            let trend_value = (t + 1) as f64;
            row[0] = 1.0;
            if n_det > 1 {
                row[1] = trend_value;
            }
            if n_det > 2 {
                row[2] = trend_value * trend_value;
            }

            if let (Some(cols), Some(shock)) = (&layout.shock, self.shock) {
                for (r, col) in cols.clone().enumerate() {
                    row[col] = shock.shock[t] * regime_factors[r];
                }
            }

            for (r, block) in layout.endog.iter().enumerate() {
                for lag in 1..=lags {
                    for k in 0..nvars {
                        row[block.start + (lag - 1) * nvars + k] =
                            data.endog[[t - lag, k]] * regime_factors[r];
                    }
                }
            }

            if let Some(exog_data) = &data.exog {
                for lag in 1..=exog_lags {
                    for m in 0..exog_cols {
                        row[layout.exog.start + (lag - 1) * exog_cols + m] = exog_data[[t - lag, m]];
                    }
                }
            }

            if let Some(contemp_data) = &data.contemp {
                for c in 0..contemp_cols {
                    row[layout.contemp.start + c] = contemp_data[[t, c]];
                }
            }
        }

        let z = instruments.map(|instr| self.instrument_matrix(&x, &layout, instr, start));
        let y = data.endog.slice(s![start.., ..]).to_owned();

        Ok(LagMatrix { y, x, z, start, layout })
    }

    /// `[1 − f(t−1), f(t−1)]` in two-regime designs, `[1, _]` otherwise.
    fn regime_factors(&self, t: usize) -> [f64; 2] {
        match self.weights {
            Some(weights) => {
                let f = weights.lagged(t);
                [1.0 - f, f]
            }
            None => [1.0, 1.0],
        }
    }

    /// `X` with its shock columns replaced by the weighted instrument columns.
    fn instrument_matrix(
        &self, x: &Array2<f64>, layout: &DesignLayout, instruments: &Array2<f64>, start: usize,
    ) -> Array2<f64> {
        let shock_cols = layout.shock.clone().unwrap_or(0..0);
        let regimes = shock_cols.len();
        let n_instr = instruments.ncols();
        let n = x.nrows();
        let width = layout.ncols - regimes + regimes * n_instr;
        let mut z = Array2::<f64>::zeros((n, width));

        for i in 0..n {
            let t = start + i;
            let factors = self.regime_factors(t);
            let mut col = 0;
            for j in 0..shock_cols.start {
                z[[i, col]] = x[[i, j]];
                col += 1;
            }
            for factor in factors.iter().take(regimes) {
                for q in 0..n_instr {
                    z[[i, col]] = instruments[[t, q]] * factor;
                    col += 1;
                }
            }
            for j in shock_cols.end..layout.ncols {
                z[[i, col]] = x[[i, j]];
                col += 1;
            }
        }
        z
    }
}
